//! Wake and probe dispatch
//!
//! Both actions run `lookup -> authorize -> execute`. A failed lookup and a
//! failed authorization produce the same masked result, so a caller cannot
//! tell a missing device from one they may not touch. Each call makes at
//! most one network attempt.

use std::sync::Arc;

use super::policy::is_permitted;
use super::registry::DeviceRegistry;
use super::search::search_devices;
use super::types::{ActionResult, Capabilities, DeviceChoice, ProbeOutcome, WakeReport};
use crate::net::wake::BROADCAST_ADDR;
use crate::net::{ReachabilityProber, WakeSender};

/// Dispatches permission-gated actions against the registry
#[derive(Clone)]
pub struct ActionDispatcher {
    registry: Arc<DeviceRegistry>,
    waker: Arc<dyn WakeSender>,
    prober: Arc<dyn ReachabilityProber>,
}

impl std::fmt::Debug for ActionDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionDispatcher")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl ActionDispatcher {
    /// Create a dispatcher over a registry and a pair of network primitives
    #[must_use]
    pub fn new(
        registry: Arc<DeviceRegistry>,
        waker: Arc<dyn WakeSender>,
        prober: Arc<dyn ReachabilityProber>,
    ) -> Self {
        Self {
            registry,
            waker,
            prober,
        }
    }

    /// The registry this dispatcher reads
    #[must_use]
    pub const fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }

    /// Search the current snapshot on behalf of a user
    #[must_use]
    pub fn search(&self, query: &str, user_id: &str, required: Capabilities) -> Vec<DeviceChoice> {
        search_devices(&self.registry.snapshot(), query, user_id, required)
    }

    /// Send a wake packet to a device
    pub async fn wake(&self, device_id: &str, user_id: &str, required: Capabilities) -> WakeReport {
        let devices = self.registry.snapshot();
        let device = devices.get(device_id);

        if !is_permitted(device, user_id, required) {
            tracing::debug!(device_id, user_id, "wake masked as not found");
            return WakeReport::not_found();
        }
        let Some(device) = device else {
            return WakeReport::not_found();
        };

        let Some(mac) = device.network.mac_address else {
            tracing::warn!(device_id, "wake requested for device without MAC address");
            return WakeReport::for_device(ActionResult::ActionFailed, device);
        };
        let target = device.network.ip_address.as_deref().unwrap_or(BROADCAST_ADDR);

        match self.waker.send_wake(&mac, target).await {
            Ok(()) => {
                tracing::info!(device_id, user_id, %mac, target, "wake packet sent");
                WakeReport::for_device(ActionResult::Success, device)
            }
            Err(e) => {
                tracing::warn!(device_id, user_id, error = %e, "wake failed");
                WakeReport::for_device(ActionResult::ActionFailed, device)
            }
        }
    }

    /// Probe a device's reachability
    pub async fn probe(&self, device_id: &str, user_id: &str, required: Capabilities) -> ProbeOutcome {
        let devices = self.registry.snapshot();
        let device = devices.get(device_id);

        if !is_permitted(device, user_id, required) {
            tracing::debug!(device_id, user_id, "probe masked as not found");
            return ProbeOutcome::DeviceNotFound;
        }
        let Some(device) = device else {
            return ProbeOutcome::DeviceNotFound;
        };

        let Some(ip) = device.network.ip_address.as_deref() else {
            tracing::warn!(device_id, "probe requested for device without IP address");
            return ProbeOutcome::ActionFailed {
                device: device.name.clone(),
            };
        };

        match self.prober.probe(ip).await {
            Ok(response) => {
                tracing::info!(device_id, user_id, alive = response.alive, "probe completed");
                ProbeOutcome::Reply(response)
            }
            Err(e) => {
                tracing::warn!(device_id, user_id, error = %e, "probe failed");
                ProbeOutcome::Error(e)
            }
        }
    }
}
