//! Reachability probe backed by the system `ping` binary

use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use thiserror::Error;
use tokio::process::Command;

/// Default time to wait for an echo reply
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Extra time granted to the `ping` process beyond its own deadline
const PROCESS_GRACE: Duration = Duration::from_secs(1);

static LATENCY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"time\s*[=<]\s*([0-9]+(?:\.[0-9]+)?)\s*ms").expect("valid regex")
});

/// Result of a completed probe
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResponse {
    /// Host that was probed
    pub host: String,
    /// Whether an echo reply was received
    pub alive: bool,
    /// Round-trip time, when reported
    pub time: Option<Duration>,
}

/// Transport-level probe failure
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Host string is not something we will hand to `ping`
    #[error("invalid host: {0}")]
    InvalidHost(String),

    /// The `ping` process could not be started
    #[error("failed to run ping: {0}")]
    Spawn(#[source] std::io::Error),

    /// The `ping` process did not finish in time
    #[error("ping timed out after {0:?}")]
    Timeout(Duration),
}

/// Checks whether a host is reachable
#[async_trait]
pub trait ReachabilityProber: Send + Sync {
    /// Probe `host` once
    async fn probe(&self, host: &str) -> Result<ProbeResponse, ProbeError>;
}

/// Probes by running the platform `ping` once
#[derive(Debug, Clone, Copy)]
pub struct SystemPinger {
    timeout: Duration,
}

impl Default for SystemPinger {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

impl SystemPinger {
    /// Create a pinger with the given reply timeout
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Reply timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl ReachabilityProber for SystemPinger {
    async fn probe(&self, host: &str) -> Result<ProbeResponse, ProbeError> {
        validate_host(host)?;

        let mut cmd = Command::new("ping");
        cmd.args(ping_args(host, self.timeout))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let deadline = self.timeout + PROCESS_GRACE;
        let output = tokio::time::timeout(deadline, cmd.output())
            .await
            .map_err(|_| ProbeError::Timeout(deadline))?
            .map_err(ProbeError::Spawn)?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let alive = reply_received(output.status.success(), &stdout, cfg!(target_os = "windows"));
        let time = if alive { parse_latency(&stdout) } else { None };

        tracing::debug!(host, alive, ?time, "probe finished");

        Ok(ProbeResponse {
            host: host.to_string(),
            alive,
            time,
        })
    }
}

/// Reject anything that could be read as a `ping` option or is not a plain
/// host name or address
fn validate_host(host: &str) -> Result<(), ProbeError> {
    let valid = !host.is_empty()
        && !host.starts_with('-')
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | ':' | '-' | '_' | '%'));

    if valid {
        Ok(())
    } else {
        Err(ProbeError::InvalidHost(host.to_string()))
    }
}

/// Arguments for a single echo request on this platform
fn ping_args(host: &str, timeout: Duration) -> Vec<String> {
    if cfg!(target_os = "windows") {
        vec![
            "-n".to_string(),
            "1".to_string(),
            "-w".to_string(),
            timeout.as_millis().to_string(),
            host.to_string(),
        ]
    } else if cfg!(target_os = "macos") {
        // BSD ping takes -W in milliseconds
        vec![
            "-c".to_string(),
            "1".to_string(),
            "-W".to_string(),
            timeout.as_millis().to_string(),
            host.to_string(),
        ]
    } else {
        let secs = timeout.as_secs().max(1);
        vec![
            "-c".to_string(),
            "1".to_string(),
            "-W".to_string(),
            secs.to_string(),
            host.to_string(),
        ]
    }
}

/// Whether `ping` saw an echo reply
///
/// Windows `ping` exits 0 on "Destination host unreachable", so there the
/// output must also show a reply line.
fn reply_received(success: bool, stdout: &str, windows: bool) -> bool {
    if !success {
        return false;
    }
    !windows || stdout.contains("TTL=") || LATENCY_REGEX.is_match(stdout)
}

/// Extract the round-trip time from `ping` output
///
/// Handles `time=12.3 ms` (unix) and `time<1ms` / `time=4ms` (Windows).
#[must_use]
pub fn parse_latency(output: &str) -> Option<Duration> {
    let caps = LATENCY_REGEX.captures(output)?;
    let millis: f64 = caps.get(1)?.as_str().parse().ok()?;
    Some(Duration::from_secs_f64(millis / 1000.0))
}
