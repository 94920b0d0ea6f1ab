//! User alerts gated on notification preferences

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::db::{NotificationMode, UserRepo};

/// Text delivered to a user when alerted
pub const ALERT_TEXT: &str = "You have been alerted";

/// Delivers a direct message to a user
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Send `content` to `user_id` privately
    async fn send_direct(&self, user_id: &str, content: &str) -> Result<()>;
}

/// Sink that only records alerts in the log, for runs without a chat transport
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl MessageSink for LogSink {
    async fn send_direct(&self, user_id: &str, content: &str) -> Result<()> {
        tracing::info!(user_id, content, "alert (no chat transport configured)");
        Ok(())
    }
}

/// Outcome of an alert request, shaped for the HTTP front door
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertResponse {
    pub message: &'static str,
    pub status: u16,
}

impl AlertResponse {
    const fn new(message: &'static str, status: u16) -> Self {
        Self { message, status }
    }
}

/// Sends alerts to users who asked for them
#[derive(Clone)]
pub struct Notifier {
    users: UserRepo,
    sink: Arc<dyn MessageSink>,
}

impl Notifier {
    /// Create a notifier over the user store and a delivery sink
    #[must_use]
    pub fn new(users: UserRepo, sink: Arc<dyn MessageSink>) -> Self {
        Self { users, sink }
    }

    /// Alert a user according to their notification mode
    ///
    /// A `Once` preference is consumed by a successful delivery.
    pub async fn send_alert(&self, user_id: &str) -> AlertResponse {
        match self.try_send_alert(user_id).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(user_id, error = %e, "alert failed");
                AlertResponse::new("An error occurred", 500)
            }
        }
    }

    async fn try_send_alert(&self, user_id: &str) -> Result<AlertResponse> {
        let Some(user) = self.users.find(user_id)? else {
            tracing::debug!(user_id, "alert for unknown user");
            return Ok(AlertResponse::new("User not found", 404));
        };

        if user.notifications == NotificationMode::Off {
            return Ok(AlertResponse::new("User has notifications disabled", 200));
        }

        self.sink.send_direct(user_id, ALERT_TEXT).await?;

        if user.notifications == NotificationMode::Once {
            self.users.set_notifications(user_id, NotificationMode::Off)?;
        }

        tracing::info!(user_id, mode = ?user.notifications, "alert sent");
        Ok(AlertResponse::new("Alert sent", 200))
    }
}
