//! Configuration management for the lanwake gateway
//!
//! Values resolve as environment variable > TOML file > default.

pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::net::probe::DEFAULT_PROBE_TIMEOUT;
use crate::net::wake::DEFAULT_WAKE_PORT;
use crate::{Error, Result};

use file::LanwakeConfigFile;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3000;

/// Lanwake gateway configuration
#[derive(Debug)]
pub struct Config {
    /// Path to the devices JSON file
    pub devices_path: PathBuf,

    /// Path to data directory (database)
    pub data_dir: PathBuf,

    /// HTTP API server configuration
    pub api_server: ApiServerConfig,

    /// Reachability probe configuration
    pub probe: ProbeConfig,

    /// Wake packet configuration
    pub wake: WakeConfig,

    /// Discord transport configuration
    pub discord: DiscordConfig,
}

/// HTTP API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Port to listen on
    pub port: u16,
}

/// Reachability probe configuration
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Time to wait for an echo reply
    pub timeout: Duration,
}

/// Wake packet configuration
#[derive(Debug, Clone)]
pub struct WakeConfig {
    /// UDP destination port
    pub port: u16,
}

/// Discord transport configuration
#[derive(Debug, Default)]
pub struct DiscordConfig {
    /// Bot token; the transport is disabled when absent
    pub token: Option<SecretString>,
}

impl Config {
    /// Load configuration from the environment and the standard config file
    ///
    /// # Errors
    ///
    /// Returns error if a value is present but invalid
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();
        let config = Self::resolve(fc, |key| std::env::var(key).ok())?;

        // Ensure data dir exists
        std::fs::create_dir_all(&config.data_dir).ok();

        Ok(config)
    }

    /// Resolve configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if a value is present but invalid
    pub fn resolve<F>(fc: LanwakeConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let devices_path = env("LANWAKE_DEVICES")
            .or(fc.devices.path)
            .map(PathBuf::from)
            .or_else(|| file::config_dir().map(|d| d.join("devices.json")))
            .unwrap_or_else(|| PathBuf::from("devices.json"));

        // Data directory (~/.local/share/omni/lanwake on Linux)
        let data_dir = env("LANWAKE_DATA_DIR")
            .or(fc.server.data_dir)
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                directories::BaseDirs::new().map_or_else(
                    || PathBuf::from("."),
                    |d| d.data_dir().join("omni").join("lanwake"),
                )
            });

        let port_var = ["LANWAKE_PORT", "PORT"]
            .into_iter()
            .find_map(|key| env(key).map(|raw| (key, raw)));
        let port = match port_var {
            Some((key, raw)) => parse_env(key, &raw)?,
            None => fc.server.port.unwrap_or(DEFAULT_PORT),
        };

        let probe_timeout = match env("LANWAKE_PROBE_TIMEOUT") {
            Some(raw) => Duration::from_secs(parse_env("LANWAKE_PROBE_TIMEOUT", &raw)?),
            None => fc
                .probe
                .timeout_secs
                .map_or(DEFAULT_PROBE_TIMEOUT, Duration::from_secs),
        };
        if probe_timeout.is_zero() {
            return Err(Error::Config("probe timeout must be positive".to_string()));
        }

        let wake_port = match env("LANWAKE_WAKE_PORT") {
            Some(raw) => parse_env("LANWAKE_WAKE_PORT", &raw)?,
            None => fc.wake.port.unwrap_or(DEFAULT_WAKE_PORT),
        };

        let discord_enabled = fc.discord.enabled.unwrap_or(true);
        let token = env("DISCORD_TOKEN")
            .or(fc.discord.token)
            .filter(|t| discord_enabled && !t.is_empty())
            .map(SecretString::from);

        Ok(Self {
            devices_path,
            data_dir,
            api_server: ApiServerConfig { port },
            probe: ProbeConfig {
                timeout: probe_timeout,
            },
            wake: WakeConfig { port: wake_port },
            discord: DiscordConfig { token },
        })
    }

    /// Path of the notification database
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("lanwake.db")
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("invalid value for {key}: '{raw}'")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply() {
        let config = Config::resolve(LanwakeConfigFile::default(), env(&[])).unwrap();
        assert_eq!(config.api_server.port, DEFAULT_PORT);
        assert_eq!(config.probe.timeout, DEFAULT_PROBE_TIMEOUT);
        assert_eq!(config.wake.port, DEFAULT_WAKE_PORT);
        assert!(config.discord.token.is_none());
        assert!(config.devices_path.ends_with("devices.json"));
    }

    #[test]
    fn env_overrides_file() {
        let mut fc = LanwakeConfigFile::default();
        fc.server.port = Some(8080);
        fc.devices.path = Some("/from/file.json".to_string());

        let config = Config::resolve(
            fc,
            env(&[("LANWAKE_PORT", "9090"), ("LANWAKE_DEVICES", "/from/env.json")]),
        )
        .unwrap();

        assert_eq!(config.api_server.port, 9090);
        assert_eq!(config.devices_path, PathBuf::from("/from/env.json"));
    }

    #[test]
    fn file_overrides_default() {
        let mut fc = LanwakeConfigFile::default();
        fc.probe.timeout_secs = Some(7);
        fc.wake.port = Some(7);

        let config = Config::resolve(fc, env(&[])).unwrap();
        assert_eq!(config.probe.timeout, Duration::from_secs(7));
        assert_eq!(config.wake.port, 7);
    }

    #[test]
    fn invalid_env_is_error() {
        let err = Config::resolve(LanwakeConfigFile::default(), env(&[("PORT", "http")]));
        assert!(err.is_err());
    }

    #[test]
    fn port_error_names_supplying_variable() {
        let err = Config::resolve(LanwakeConfigFile::default(), env(&[("PORT", "http")]))
            .unwrap_err()
            .to_string();
        assert!(err.contains("invalid value for PORT"), "{err}");

        let err = Config::resolve(
            LanwakeConfigFile::default(),
            env(&[("LANWAKE_PORT", "x"), ("PORT", "8080")]),
        )
        .unwrap_err()
        .to_string();
        assert!(err.contains("invalid value for LANWAKE_PORT"), "{err}");
    }

    #[test]
    fn generic_port_used_when_specific_absent() {
        let config = Config::resolve(LanwakeConfigFile::default(), env(&[("PORT", "8181")])).unwrap();
        assert_eq!(config.api_server.port, 8181);
    }

    #[test]
    fn zero_probe_timeout_is_error() {
        let err = Config::resolve(
            LanwakeConfigFile::default(),
            env(&[("LANWAKE_PROBE_TIMEOUT", "0")]),
        );
        assert!(err.is_err());
    }

    #[test]
    fn discord_token_from_env_unless_disabled() {
        let config =
            Config::resolve(LanwakeConfigFile::default(), env(&[("DISCORD_TOKEN", "abc")])).unwrap();
        assert_eq!(
            config.discord.token.as_ref().map(|t| t.expose_secret().to_string()),
            Some("abc".to_string())
        );

        let mut fc = LanwakeConfigFile::default();
        fc.discord.enabled = Some(false);
        let config = Config::resolve(fc, env(&[("DISCORD_TOKEN", "abc")])).unwrap();
        assert!(config.discord.token.is_none());
    }
}
