//! Settings persistence for the contacts CLI
//!
//! Display settings, the last-used tab and the last export folder live in
//! `settings.toml` inside the data directory. The file is re-read on every
//! snapshot so edits made while a session runs are seen on the next resume.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use contacts_core::{ConfigSnapshot, SettingsError, SettingsStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CliError, Result};

pub const SETTINGS_FILE_NAME: &str = "settings.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredSettings {
    pub last_export_path: Option<PathBuf>,
    pub display: ConfigSnapshot,
}

impl StoredSettings {
    /// Load settings from file; a missing file yields defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            CliError::StatePersistence(format!("Failed to read settings file: {}", e))
        })?;

        toml::from_str(&contents).map_err(|e| {
            CliError::StatePersistence(format!("Failed to parse settings file: {}", e))
        })
    }

    /// Save settings to file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents).map_err(|e| {
            CliError::StatePersistence(format!("Failed to write settings file: {}", e))
        })
    }
}

/// [`SettingsStore`] backed by a TOML file
pub struct TomlSettingsStore {
    path: PathBuf,
    /// Last successfully read contents, used when the file turns unreadable
    cached: Mutex<StoredSettings>,
}

impl TomlSettingsStore {
    pub fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(SETTINGS_FILE_NAME);
        let settings = StoredSettings::load_from_file(&path)?;
        debug!("Loaded settings from {}", path.display());
        Ok(Self {
            path,
            cached: Mutex::new(settings),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> StoredSettings {
        let mut cached = self
            .cached
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match StoredSettings::load_from_file(&self.path) {
            Ok(settings) => *cached = settings,
            Err(e) => warn!("Using cached settings: {}", e),
        }
        cached.clone()
    }

    fn modify(&self, change: impl FnOnce(&mut StoredSettings)) -> std::result::Result<(), SettingsError> {
        let mut settings = self.read();
        change(&mut settings);
        settings.save_to_file(&self.path).map_err(|e| SettingsError::Write {
            reason: e.to_string(),
        })?;
        *self
            .cached
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = settings;
        Ok(())
    }
}

impl SettingsStore for TomlSettingsStore {
    fn snapshot(&self) -> ConfigSnapshot {
        self.read().display
    }

    fn set_last_used_tab(&self, index: usize) -> std::result::Result<(), SettingsError> {
        self.modify(|settings| settings.display.last_used_tab_index = index)
    }

    fn last_export_path(&self) -> Option<PathBuf> {
        self.read().last_export_path
    }

    fn set_last_export_path(&self, path: &Path) -> std::result::Result<(), SettingsError> {
        self.modify(|settings| settings.last_export_path = Some(path.to_path_buf()))
    }
}
