//! Daemon - the main gateway service
//!
//! Loads the device registry and notification store, connects the chat
//! transport, and serves the HTTP front door until interrupted.

use std::sync::Arc;

use crate::api::ApiServer;
use crate::channels::{Channel, DiscordChannel};
use crate::commands::CommandRouter;
use crate::db::{self, DbPool, UserRepo};
use crate::devices::{ActionDispatcher, DeviceRegistry, SharedRegistry};
use crate::net::{SystemPinger, UdpWakeSender};
use crate::notify::{LogSink, MessageSink, Notifier};
use crate::{Config, Result};

/// Build a dispatcher using the production network primitives
#[must_use]
pub fn dispatcher_for(config: &Config, registry: SharedRegistry) -> ActionDispatcher {
    ActionDispatcher::new(
        registry,
        Arc::new(UdpWakeSender::new(config.wake.port)),
        Arc::new(SystemPinger::new(config.probe.timeout)),
    )
}

/// The lanwake daemon
pub struct Daemon {
    config: Config,
    registry: SharedRegistry,
    db: DbPool,
}

impl Daemon {
    /// Create a new daemon instance
    ///
    /// # Errors
    ///
    /// Returns error if the device registry or database cannot be loaded
    pub fn new(config: Config) -> Result<Self> {
        let registry = Arc::new(DeviceRegistry::load(&config.devices_path)?);

        let db_path = config.db_path();
        let db = db::init(&db_path)?;
        tracing::info!(path = %db_path.display(), "database initialized");

        Ok(Self {
            config,
            registry,
            db,
        })
    }

    /// Run the daemon until interrupted
    ///
    /// # Errors
    ///
    /// Returns error if the daemon encounters a fatal error
    pub async fn run(mut self) -> Result<()> {
        tracing::info!(
            port = self.config.api_server.port,
            devices = self.registry.snapshot().len(),
            "daemon running"
        );

        let users = UserRepo::new(self.db.clone());
        let dispatcher = dispatcher_for(&self.config, self.registry.clone());
        let router = CommandRouter::new(users.clone(), dispatcher);

        let mut discord = self
            .config
            .discord
            .token
            .take()
            .map(|token| DiscordChannel::new(token, router));

        let sink: Arc<dyn MessageSink> = match discord.as_mut() {
            Some(channel) => {
                tracing::info!(channel = channel.name(), "connecting channel");
                channel.connect().await?;
                Arc::new(channel.sink()?)
            }
            None => {
                tracing::warn!("no Discord token configured - alerts will only be logged");
                Arc::new(LogSink)
            }
        };

        #[cfg(unix)]
        spawn_reload_on_hangup(self.registry.clone())?;

        let notifier = Notifier::new(users, sink);
        let api = ApiServer::new(notifier, self.config.api_server.port).spawn();

        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                tracing::info!("shutdown requested");
            }
            result = api => {
                match result {
                    Ok(Ok(())) => tracing::warn!("API server exited"),
                    Ok(Err(e)) => tracing::error!(error = %e, "API server failed"),
                    Err(e) => tracing::error!(error = %e, "API server task panicked"),
                }
            }
        }

        if let Some(channel) = discord.as_mut() {
            if let Err(e) = channel.disconnect().await {
                tracing::warn!(channel = channel.name(), error = %e, "disconnect failed");
            }
        }

        Ok(())
    }
}

/// Swap in a freshly read device snapshot on every SIGHUP
#[cfg(unix)]
fn spawn_reload_on_hangup(registry: SharedRegistry) -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = signal(SignalKind::hangup())?;
    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            if let Err(e) = registry.reload() {
                tracing::warn!(error = %e, "device reload failed, keeping previous snapshot");
            }
        }
    });

    Ok(())
}
