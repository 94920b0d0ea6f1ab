//! Shared test utilities

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use lanwake_gateway::devices::{ActionDispatcher, DeviceRegistry, parse_devices};
use lanwake_gateway::net::{
    MacAddress, ProbeError, ProbeResponse, ReachabilityProber, WakeError, WakeSender,
};
use lanwake_gateway::{DbPool, db};

/// Registry used by the scenarios: one device, one user holding `wol`
pub const OFFICE_PC: &str = r#"{
    "list": [
        {
            "id": "d1",
            "name": "Office PC",
            "network": { "macAddress": "AA:BB:CC:DD:EE:FF", "ipAddress": "10.0.0.5" },
            "permittedUsers": [ { "id": "u1", "permissions": { "wol": true } } ]
        }
    ]
}"#;

/// Set up an in-memory test database
#[must_use]
pub fn setup_test_db() -> DbPool {
    db::init_memory().expect("failed to init test db")
}

/// Wake sender that records calls and can be told to fail
#[derive(Default)]
pub struct FakeWaker {
    pub fail: bool,
    pub calls: Mutex<Vec<(MacAddress, String)>>,
}

impl FakeWaker {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl WakeSender for FakeWaker {
    async fn send_wake(&self, mac: &MacAddress, target: &str) -> Result<(), WakeError> {
        self.calls.lock().unwrap().push((*mac, target.to_string()));
        if self.fail {
            return Err(WakeError::Send {
                target: target.to_string(),
                source: std::io::Error::other("network unreachable"),
            });
        }
        Ok(())
    }
}

/// Prober that answers alive for every host and records calls
#[derive(Default)]
pub struct FakeProber {
    pub calls: Mutex<Vec<String>>,
}

impl FakeProber {
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ReachabilityProber for FakeProber {
    async fn probe(&self, host: &str) -> Result<ProbeResponse, ProbeError> {
        self.calls.lock().unwrap().push(host.to_string());
        Ok(ProbeResponse {
            host: host.to_string(),
            alive: true,
            time: Some(Duration::from_millis(2)),
        })
    }
}

/// Build a dispatcher over a JSON registry with the given fakes
pub fn dispatcher(
    devices_json: &str,
    waker: Arc<FakeWaker>,
    prober: Arc<FakeProber>,
) -> ActionDispatcher {
    let devices = parse_devices(devices_json).expect("valid devices");
    ActionDispatcher::new(Arc::new(DeviceRegistry::from_devices(devices)), waker, prober)
}

/// Register a user with the given notification mode
pub fn create_test_user(db: &DbPool, id: &str, mode: db::NotificationMode) -> db::User {
    let users = db::UserRepo::new(db.clone());
    users.find_or_create(id).expect("failed to create test user");
    users
        .set_notifications(id, mode)
        .expect("failed to set notifications");
    users.find(id).expect("lookup").expect("user exists")
}
