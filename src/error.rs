//! Error types for the lanwake gateway

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the lanwake gateway
///
/// These cover the I/O plumbing around the device core. The dispatch paths
/// themselves never return this type; their failures are values of
/// [`crate::devices::ActionResult`] or [`crate::devices::ProbeOutcome`].
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Devices file could not be loaded
    #[error("device registry error: {0}")]
    Registry(String),

    /// Invalid MAC address
    #[error("invalid MAC address: {0}")]
    InvalidMac(String),

    /// Channel error
    #[error("channel error: {0}")]
    Channel(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// `SQLite` error
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),
}
