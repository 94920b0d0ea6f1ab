//! Wake-on-LAN magic packet sender

use async_trait::async_trait;
use thiserror::Error;
use tokio::net::UdpSocket;

use super::MacAddress;

/// Length of a magic packet: 6 sync bytes plus 16 copies of the MAC
pub const MAGIC_PACKET_LEN: usize = 102;

/// Conventional discard port used for Wake-on-LAN
pub const DEFAULT_WAKE_PORT: u16 = 9;

/// Limited broadcast address, used when a device has no IP configured
pub const BROADCAST_ADDR: &str = "255.255.255.255";

/// Failure sending a wake packet
#[derive(Debug, Error)]
pub enum WakeError {
    /// Could not open a local socket
    #[error("failed to bind socket: {0}")]
    Bind(#[source] std::io::Error),

    /// Could not enable broadcast on the socket
    #[error("failed to enable broadcast: {0}")]
    Broadcast(#[source] std::io::Error),

    /// Transmission failed
    #[error("failed to send magic packet to {target}: {source}")]
    Send {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// The OS accepted fewer bytes than the packet length
    #[error("short write: {0} of {MAGIC_PACKET_LEN} bytes sent")]
    ShortWrite(usize),
}

/// Sends a single wake packet and reports the outcome
#[async_trait]
pub trait WakeSender: Send + Sync {
    /// Send one magic packet for `mac` to `target` (IP address or hostname)
    async fn send_wake(&self, mac: &MacAddress, target: &str) -> Result<(), WakeError>;
}

/// Build the magic packet for a MAC address
#[must_use]
pub fn magic_packet(mac: &MacAddress) -> [u8; MAGIC_PACKET_LEN] {
    let mut packet = [0xFF; MAGIC_PACKET_LEN];
    let octets = mac.octets();
    for chunk in packet[6..].chunks_exact_mut(6) {
        chunk.copy_from_slice(&octets);
    }
    packet
}

/// Production sender over a broadcast-enabled UDP socket
#[derive(Debug, Clone, Copy)]
pub struct UdpWakeSender {
    port: u16,
}

impl Default for UdpWakeSender {
    fn default() -> Self {
        Self::new(DEFAULT_WAKE_PORT)
    }
}

impl UdpWakeSender {
    /// Create a sender targeting the given UDP port
    #[must_use]
    pub const fn new(port: u16) -> Self {
        Self { port }
    }
}

#[async_trait]
impl WakeSender for UdpWakeSender {
    async fn send_wake(&self, mac: &MacAddress, target: &str) -> Result<(), WakeError> {
        let bind_addr = if target.contains(':') {
            "[::]:0"
        } else {
            "0.0.0.0:0"
        };

        let socket = UdpSocket::bind(bind_addr).await.map_err(WakeError::Bind)?;
        socket.set_broadcast(true).map_err(WakeError::Broadcast)?;

        let packet = magic_packet(mac);
        let sent = socket
            .send_to(&packet, (target, self.port))
            .await
            .map_err(|source| WakeError::Send {
                target: target.to_string(),
                source,
            })?;

        if sent != MAGIC_PACKET_LEN {
            return Err(WakeError::ShortWrite(sent));
        }

        tracing::debug!(%mac, target, port = self.port, "magic packet sent");
        Ok(())
    }
}
