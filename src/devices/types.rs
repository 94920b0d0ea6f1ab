//! Device registry types

use serde::{Deserialize, Serialize};

use crate::net::{MacAddress, ProbeError, ProbeResponse};

/// Named capability flags a user may hold for a device
///
/// Used both for what a user has been granted and for what a call-site
/// requires. Only flags set in a requirement constrain authorization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Capabilities {
    /// Send Wake-on-LAN packets
    pub wol: bool,
    /// Probe reachability
    pub ping: bool,
}

impl Capabilities {
    /// No capability
    pub const NONE: Self = Self {
        wol: false,
        ping: false,
    };

    /// Wake only
    pub const WAKE: Self = Self {
        wol: true,
        ping: false,
    };

    /// Ping only
    pub const PING: Self = Self {
        wol: false,
        ping: true,
    };

    /// Whether every flag set in `required` is also set here
    #[must_use]
    pub const fn satisfies(self, required: Self) -> bool {
        // Destructured so a new flag cannot be silently skipped
        let Self { wol, ping } = required;
        (!wol || self.wol) && (!ping || self.ping)
    }
}

/// Network addressing for a device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NetworkInfo {
    #[serde(default)]
    pub mac_address: Option<MacAddress>,
    #[serde(default)]
    pub ip_address: Option<String>,
}

/// A user entry in a device's access list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermittedUser {
    pub id: String,
    #[serde(default)]
    pub permissions: Capabilities,
}

/// A device that can be woken or probed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Device {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub network: NetworkInfo,
    #[serde(default)]
    pub permitted_users: Vec<PermittedUser>,
}

impl Device {
    /// Find the access entry for a user
    #[must_use]
    pub fn permitted_user(&self, user_id: &str) -> Option<&PermittedUser> {
        self.permitted_users.iter().find(|u| u.id == user_id)
    }
}

/// Ordered, read-only device collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Devices {
    pub list: Vec<Device>,
}

impl Devices {
    /// Wrap a device list
    #[must_use]
    pub const fn new(list: Vec<Device>) -> Self {
        Self { list }
    }

    /// Look up a device by ID
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Device> {
        self.list.iter().find(|d| d.id == id)
    }

    /// Iterate in registry order
    pub fn iter(&self) -> std::slice::Iter<'_, Device> {
        self.list.iter()
    }

    /// Number of devices
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether there are no devices
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

/// A search hit, shaped for pickers and autocomplete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceChoice {
    /// Display name
    pub name: String,
    /// Device ID
    pub value: String,
}

/// Outcome of a dispatched action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionResult {
    /// The action was carried out
    Success,
    /// No such device, or the caller may not act on it
    DeviceNotFound,
    /// Reserved. Authorization failures are reported as `DeviceNotFound` so
    /// callers cannot probe for device existence; nothing produces this.
    PermissionDenied,
    /// An authorized action failed to execute
    ActionFailed,
}

/// Result of a wake request
///
/// `device` and `mac` are only filled in for callers that passed
/// authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WakeReport {
    pub result: ActionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
}

impl WakeReport {
    /// The masked report for unknown or unauthorized devices
    #[must_use]
    pub const fn not_found() -> Self {
        Self {
            result: ActionResult::DeviceNotFound,
            device: None,
            mac: None,
        }
    }

    pub(crate) fn for_device(result: ActionResult, device: &Device) -> Self {
        Self {
            result,
            device: Some(device.name.clone()),
            mac: device.network.mac_address.map(|m| m.to_string()),
        }
    }
}

/// Result of a probe request
///
/// Completed probes and transport errors are passed through from the
/// prober as-is.
#[derive(Debug)]
pub enum ProbeOutcome {
    /// The prober ran and reported reachability
    Reply(ProbeResponse),
    /// The prober failed at the transport level
    Error(ProbeError),
    /// Authorized, but the device has no IP address to probe
    ActionFailed { device: String },
    /// No such device, or the caller may not act on it
    DeviceNotFound,
}

impl ProbeOutcome {
    /// Whether this is the masked not-found outcome
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::DeviceNotFound)
    }
}
