//! Lanwake Gateway - permission-gated Wake-on-LAN and ping for chat users
//!
//! This library provides:
//! - A device registry with per-user capabilities (`wol`, `ping`)
//! - Device search, wake and probe that never reveal devices a user may not touch
//! - A chat command router and Discord transport
//! - Opt-in user alerts behind an HTTP endpoint
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │   Discord (DMs, /wake, /ping)  │  HTTP /alert │
//! └───────────────┬──────────────────────┬───────┘
//!                 │                      │
//! ┌───────────────▼──────────┐  ┌────────▼───────┐
//! │      CommandRouter       │  │    Notifier    │
//! └───────────────┬──────────┘  └────────┬───────┘
//!                 │                      │
//! ┌───────────────▼──────────┐  ┌────────▼───────┐
//! │ ActionDispatcher/search  │  │ UserRepo (db)  │
//! │  policy · registry · net │  └────────────────┘
//! └──────────────────────────┘
//! ```

pub mod api;
pub mod channels;
pub mod commands;
pub mod config;
pub mod daemon;
pub mod db;
pub mod devices;
pub mod error;
pub mod net;
pub mod notify;

pub use commands::{Command, CommandRouter};
pub use config::Config;
pub use daemon::Daemon;
pub use db::{DbConn, DbPool};
pub use devices::{
    ActionDispatcher, ActionResult, Capabilities, Device, DeviceChoice, DeviceRegistry, Devices,
    ProbeOutcome, WakeReport,
};
pub use error::{Error, Result};
pub use notify::{AlertResponse, MessageSink, Notifier};
