//! Chat transports
//!
//! Each transport implements `Channel` for lifecycle and feeds incoming
//! commands to the shared [`crate::commands::CommandRouter`].

mod discord;

use async_trait::async_trait;

pub use discord::{DiscordChannel, DiscordSink};

use crate::Result;

/// Trait for chat transport adapters
#[async_trait]
pub trait Channel: Send + Sync {
    /// Get the channel name
    fn name(&self) -> &'static str;

    /// Connect to the channel
    async fn connect(&mut self) -> Result<()>;

    /// Disconnect from the channel
    async fn disconnect(&mut self) -> Result<()>;

    /// Check if connected
    fn is_connected(&self) -> bool;
}
