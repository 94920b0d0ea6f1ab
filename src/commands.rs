//! Chat command router
//!
//! Transport-agnostic handling of `!command` messages. Transports hand in
//! the sender's ID and the raw text and send back whatever reply comes out.

use std::fmt::Write as _;

use crate::db::{NotificationMode, UserRepo};
use crate::devices::{ActionDispatcher, ActionResult, Capabilities, ProbeOutcome, WakeReport};

/// Prefix marking a message as a command
pub const COMMAND_PREFIX: char = '!';

/// Reply used whenever the device is unknown or off-limits
pub const DEVICE_NOT_FOUND: &str = "Device not found";

const HELP_TEXT: &str = "\
**Available commands**
- `!ping` - pong
- `!help` - this message
- `!lmk` - get messaged next time you join
- `!always` - get messaged every time you join
- `!cancel` - cancel `!lmk` or `!always`
- `!devices [name]` - list your devices
- `!wake <device id>` - send a wake packet
- `!probe <device id>` - check whether a device is online";

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ping,
    Help,
    Lmk,
    Always,
    Cancel,
    Devices(String),
    Wake(String),
    Probe(String),
    Unknown(String),
}

impl Command {
    /// Parse a chat message; `None` when it is not a command
    ///
    /// The command word is case-insensitive, arguments keep their case.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let body = text.trim().strip_prefix(COMMAND_PREFIX)?;
        let mut parts = body.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default().to_lowercase();
        let arg = parts.next().unwrap_or_default().trim().to_string();

        Some(match name.as_str() {
            "ping" => Self::Ping,
            "help" => Self::Help,
            "lmk" => Self::Lmk,
            "always" => Self::Always,
            "cancel" => Self::Cancel,
            "devices" => Self::Devices(arg),
            "wake" => Self::Wake(arg),
            "probe" => Self::Probe(arg),
            _ => Self::Unknown(name),
        })
    }
}

/// Routes chat commands to the user store and device dispatcher
#[derive(Clone)]
pub struct CommandRouter {
    users: UserRepo,
    dispatcher: ActionDispatcher,
}

impl CommandRouter {
    /// Create a router
    #[must_use]
    pub const fn new(users: UserRepo, dispatcher: ActionDispatcher) -> Self {
        Self { users, dispatcher }
    }

    /// Device dispatcher used by this router
    #[must_use]
    pub const fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    /// Handle a message from `user_id`, returning the reply if it was a command
    pub async fn handle(&self, user_id: &str, text: &str) -> Option<String> {
        let command = Command::parse(text)?;
        tracing::info!(user_id, ?command, "command received");

        match self.execute(user_id, command).await {
            Ok(reply) => Some(reply),
            Err(e) => {
                tracing::error!(user_id, error = %e, "command failed");
                Some("An error occurred".to_string())
            }
        }
    }

    async fn execute(&self, user_id: &str, command: Command) -> crate::Result<String> {
        self.users.find_or_create(user_id)?;

        let reply = match command {
            Command::Ping => "pong".to_string(),
            Command::Help => HELP_TEXT.to_string(),
            Command::Lmk => {
                self.users.set_notifications(user_id, NotificationMode::Once)?;
                "You will be messaged next time you join".to_string()
            }
            Command::Always => {
                self.users.set_notifications(user_id, NotificationMode::Always)?;
                "You will be messaged every time you join".to_string()
            }
            Command::Cancel => {
                self.users.set_notifications(user_id, NotificationMode::Off)?;
                "You will no longer be messaged when you join".to_string()
            }
            Command::Devices(query) => {
                format_device_list(&self.dispatcher.search(&query, user_id, Capabilities::NONE))
            }
            Command::Wake(device_id) if device_id.is_empty() => "Usage: `!wake <device id>`".to_string(),
            Command::Wake(device_id) => format_wake(
                &self
                    .dispatcher
                    .wake(&device_id, user_id, Capabilities::WAKE)
                    .await,
            ),
            Command::Probe(device_id) if device_id.is_empty() => {
                "Usage: `!probe <device id>`".to_string()
            }
            Command::Probe(device_id) => format_probe(
                &device_id,
                &self
                    .dispatcher
                    .probe(&device_id, user_id, Capabilities::PING)
                    .await,
            ),
            Command::Unknown(_) => "Invalid command, use !help for a list of commands".to_string(),
        };

        Ok(reply)
    }
}

/// Render search hits as a chat list
#[must_use]
pub fn format_device_list(choices: &[crate::devices::DeviceChoice]) -> String {
    if choices.is_empty() {
        return "No devices found".to_string();
    }

    let mut out = String::from("**Your devices**");
    for choice in choices {
        let _ = write!(out, "\n- {} (`{}`)", choice.name, choice.value);
    }
    out
}

/// Render a wake report as a chat reply
#[must_use]
pub fn format_wake(report: &WakeReport) -> String {
    let device = report.device.as_deref().unwrap_or("device");
    match report.result {
        ActionResult::Success => match &report.mac {
            Some(mac) => format!("Sent wake packet to {device} ({mac})"),
            None => format!("Sent wake packet to {device}"),
        },
        ActionResult::ActionFailed => format!("Failed to wake {device}"),
        ActionResult::DeviceNotFound | ActionResult::PermissionDenied => DEVICE_NOT_FOUND.to_string(),
    }
}

/// Render a probe outcome as a chat reply
#[must_use]
pub fn format_probe(device_id: &str, outcome: &ProbeOutcome) -> String {
    match outcome {
        ProbeOutcome::Reply(r) if r.alive => match r.time {
            Some(t) => format!("{device_id} is online ({:.1} ms)", t.as_secs_f64() * 1000.0),
            None => format!("{device_id} is online"),
        },
        ProbeOutcome::Reply(_) => format!("{device_id} is offline"),
        ProbeOutcome::Error(e) => format!("Could not probe {device_id}: {e}"),
        ProbeOutcome::ActionFailed { device } => format!("{device} has no IP address configured"),
        ProbeOutcome::DeviceNotFound => DEVICE_NOT_FOUND.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::net::{ProbeError, ProbeResponse};

    #[test]
    fn parses_commands_case_insensitively() {
        assert_eq!(Command::parse("!PING"), Some(Command::Ping));
        assert_eq!(Command::parse("  !Help  "), Some(Command::Help));
        assert_eq!(
            Command::parse("!wake Office-PC"),
            Some(Command::Wake("Office-PC".to_string()))
        );
        assert_eq!(Command::parse("!devices"), Some(Command::Devices(String::new())));
        assert_eq!(
            Command::parse("!dance now"),
            Some(Command::Unknown("dance".to_string()))
        );
    }

    #[test]
    fn ignores_plain_messages() {
        assert_eq!(Command::parse("hello"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn wake_reply_masks_not_found() {
        assert_eq!(format_wake(&WakeReport::not_found()), DEVICE_NOT_FOUND);
    }

    #[test]
    fn wake_reply_names_device() {
        let report = WakeReport {
            result: ActionResult::Success,
            device: Some("Office PC".to_string()),
            mac: Some("AA:BB:CC:DD:EE:FF".to_string()),
        };
        assert_eq!(format_wake(&report), "Sent wake packet to Office PC (AA:BB:CC:DD:EE:FF)");
    }

    #[test]
    fn probe_replies() {
        let online = ProbeOutcome::Reply(ProbeResponse {
            host: "10.0.0.5".to_string(),
            alive: true,
            time: Some(Duration::from_millis(12)),
        });
        assert_eq!(format_probe("d1", &online), "d1 is online (12.0 ms)");

        let offline = ProbeOutcome::Reply(ProbeResponse {
            host: "10.0.0.5".to_string(),
            alive: false,
            time: None,
        });
        assert_eq!(format_probe("d1", &offline), "d1 is offline");

        let err = ProbeOutcome::Error(ProbeError::InvalidHost("-x".to_string()));
        assert!(format_probe("d1", &err).starts_with("Could not probe d1"));

        assert_eq!(format_probe("d1", &ProbeOutcome::DeviceNotFound), DEVICE_NOT_FOUND);
    }

    #[test]
    fn empty_device_list() {
        assert_eq!(format_device_list(&[]), "No devices found");
    }
}
