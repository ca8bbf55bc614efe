//! Contacts CLI Configuration
//!
//! Loads `contacts.toml`, which describes the host platform the browser runs
//! on: whether a system document picker exists, which permissions are granted,
//! where import scratch files go and whether imports need confirmation.
//! Every section falls back to its `Default` impl when omitted.

use std::path::{Path, PathBuf};

use contacts_core::{Capabilities, Permission};
use contacts_runtime::RefreshConfig;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};

/// Subdirectory of the platform data directory used by default
pub const DATA_DIR_NAME: &str = "contacts";

// ----------------------------------------------------------------------------
// Application Configuration
// ----------------------------------------------------------------------------

/// Complete configuration for the contacts CLI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub platform: PlatformConfig,
    pub permissions: PermissionsConfig,
    pub import: ImportConfig,
    pub refresh: RefreshSection,
    pub storage: StorageConfig,
}

/// Capabilities of the simulated host platform
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Route import and export through a system document picker
    pub picker_capable: bool,
}

/// Permissions the simulated user grants when asked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionsConfig {
    pub granted: Vec<Permission>,
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self {
            granted: vec![
                Permission::ReadContacts,
                Permission::WriteContacts,
                Permission::GetAccounts,
                Permission::ReadStorage,
                Permission::WriteStorage,
            ],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Apply imports without asking for confirmation
    pub auto_confirm: bool,
    /// Directory for materialized content references; system temp dir if unset
    pub temp_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshSection {
    pub event_buffer_size: usize,
}

impl Default for RefreshSection {
    fn default() -> Self {
        Self {
            event_buffer_size: RefreshConfig::default().event_buffer_size,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the platform data directory
    pub data_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load and validate configuration from a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.refresh.event_buffer_size == 0 {
            return Err(CliError::Config(
                "refresh.event_buffer_size must be greater than zero".to_string(),
            ));
        }
        if let Some(dir) = &self.import.temp_dir {
            if dir.as_os_str().is_empty() {
                return Err(CliError::Config("import.temp_dir must not be empty".to_string()));
            }
        }
        Ok(())
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            document_picker: self.platform.picker_capable,
        }
    }

    pub fn refresh_config(&self) -> RefreshConfig {
        RefreshConfig {
            event_buffer_size: self.refresh.event_buffer_size,
        }
    }

    /// Data directory: explicit override, then the platform data directory
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.storage.data_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(DATA_DIR_NAME))
            .ok_or_else(|| CliError::Config("No platform data directory available".to_string()))
    }
}
