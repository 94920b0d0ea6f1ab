//! Device registry and permission-gated actions
//!
//! Devices are loaded once into an immutable snapshot. Users hold a
//! capability set per device; searches and actions only ever reveal
//! devices the requesting user may act on.

pub mod dispatch;
pub mod policy;
pub mod registry;
pub mod search;
pub mod types;

pub use dispatch::ActionDispatcher;
pub use policy::is_permitted;
pub use registry::{DeviceRegistry, SharedRegistry, parse_devices, read_devices_file};
pub use search::search_devices;
pub use types::{
    ActionResult, Capabilities, Device, DeviceChoice, Devices, NetworkInfo, PermittedUser,
    ProbeOutcome, WakeReport,
};
