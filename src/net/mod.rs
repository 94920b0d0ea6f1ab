//! Network primitives used by the action dispatcher
//!
//! Both primitives sit behind a trait so the dispatcher can be driven by
//! in-memory fakes in tests.

pub mod mac;
pub mod probe;
pub mod wake;

pub use mac::MacAddress;
pub use probe::{ProbeError, ProbeResponse, ReachabilityProber, SystemPinger};
pub use wake::{UdpWakeSender, WakeError, WakeSender, magic_packet};
