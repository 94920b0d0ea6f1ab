//! TOML configuration file loading
//!
//! Supports `~/.config/omni/lanwake/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct LanwakeConfigFile {
    /// Device registry location
    #[serde(default)]
    pub devices: DevicesFileConfig,

    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Reachability probe settings
    #[serde(default)]
    pub probe: ProbeFileConfig,

    /// Wake packet settings
    #[serde(default)]
    pub wake: WakeFileConfig,

    /// Discord transport
    #[serde(default)]
    pub discord: DiscordFileConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct DevicesFileConfig {
    /// Path to the devices JSON file
    pub path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// API server port
    pub port: Option<u16>,

    /// Data directory override
    pub data_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProbeFileConfig {
    /// Seconds to wait for an echo reply
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WakeFileConfig {
    /// UDP port magic packets are sent to
    pub port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DiscordFileConfig {
    pub enabled: Option<bool>,
    pub token: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `LanwakeConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> LanwakeConfigFile {
    let Some(path) = config_file_path() else {
        return LanwakeConfigFile::default();
    };

    load_config_file_from(&path)
}

/// Load a TOML config file from an explicit path, falling back to defaults
pub fn load_config_file_from(path: &Path) -> LanwakeConfigFile {
    if !path.exists() {
        return LanwakeConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                LanwakeConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            LanwakeConfigFile::default()
        }
    }
}

/// Return the config directory: `~/.config/omni/lanwake`
pub fn config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("omni").join("lanwake"))
}

/// Return the config file path: `~/.config/omni/lanwake/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}
