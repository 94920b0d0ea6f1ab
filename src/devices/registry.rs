//! Device registry loaded from a JSON file

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use super::types::{Device, Devices};
use crate::{Error, Result};

/// Shared handle to the registry
pub type SharedRegistry = Arc<DeviceRegistry>;

/// Holds the current device snapshot
///
/// Readers take an `Arc` of the snapshot and never see a partial update.
/// A reload builds a new snapshot and swaps it in whole.
#[derive(Debug)]
pub struct DeviceRegistry {
    path: Option<PathBuf>,
    snapshot: RwLock<Arc<Devices>>,
}

impl DeviceRegistry {
    /// Load the registry from a devices file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not a valid device list
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let devices = read_devices_file(path)?;

        tracing::info!(path = %path.display(), count = devices.len(), "device registry loaded");

        Ok(Self {
            path: Some(path.to_path_buf()),
            snapshot: RwLock::new(Arc::new(devices)),
        })
    }

    /// Build a registry from an in-memory device list
    #[must_use]
    pub fn from_devices(devices: Devices) -> Self {
        Self {
            path: None,
            snapshot: RwLock::new(Arc::new(devices)),
        }
    }

    /// Path the registry was loaded from, if any
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current device snapshot
    #[must_use]
    pub fn snapshot(&self) -> Arc<Devices> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap in a new snapshot
    pub fn replace(&self, devices: Devices) {
        let next = Arc::new(devices);
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Re-read the devices file and swap the snapshot
    ///
    /// On failure the current snapshot is kept.
    ///
    /// # Errors
    ///
    /// Returns error if the registry has no backing file or the file is invalid
    pub fn reload(&self) -> Result<usize> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| Error::Registry("registry has no backing file".to_string()))?;

        let devices = read_devices_file(path)?;
        let count = devices.len();
        self.replace(devices);

        tracing::info!(path = %path.display(), count, "device registry reloaded");
        Ok(count)
    }
}

/// Read and validate a devices file
///
/// # Errors
///
/// Returns error if the file cannot be read or parsed
pub fn read_devices_file(path: &Path) -> Result<Devices> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Registry(format!("failed to read {}: {e}", path.display())))?;
    parse_devices(&content)
}

/// Parse and validate a devices document
///
/// # Errors
///
/// Returns error on malformed JSON, unknown permission names, invalid MAC
/// addresses or duplicate device IDs
pub fn parse_devices(json: &str) -> Result<Devices> {
    let invalid = |e: serde_json::Error| Error::Registry(format!("invalid devices file: {e}"));

    // Both `{ "list": [...] }` and a bare array are accepted
    let list = if json.trim_start().starts_with('[') {
        serde_json::from_str::<Vec<Device>>(json).map_err(invalid)?
    } else {
        serde_json::from_str::<Devices>(json).map_err(invalid)?.list
    };

    let mut seen = HashSet::new();
    for device in &list {
        if !seen.insert(device.id.as_str()) {
            return Err(Error::Registry(format!("duplicate device id '{}'", device.id)));
        }
    }

    Ok(Devices::new(list))
}
