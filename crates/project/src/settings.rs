use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Errors reading or writing persisted bridge settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to access settings file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// User-level settings passed into every formatter operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeSettings {
    /// Formatter executable, resolved through `PATH` when not absolute
    pub executable_path: PathBuf,
    /// Config file used when the project has none of its own
    pub config_path: Option<PathBuf>,
    pub formatting_enabled: bool,
    /// Kill formatter runs after this many milliseconds, 0 to wait forever
    pub timeout_ms: u64,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            executable_path: PathBuf::from("uncrustify"),
            config_path: None,
            formatting_enabled: true,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl BridgeSettings {
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        toml::from_str(content).map_err(|e| {
            error!("Failed to parse settings: {}", e);
            SettingsError::Parse(e)
        })
    }

    pub fn to_toml_string(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

/// Persistence for [`BridgeSettings`]
pub trait SettingsStore {
    fn load(&self) -> Result<BridgeSettings, SettingsError>;
    fn save(&self, settings: &BridgeSettings) -> Result<(), SettingsError>;
}

/// Settings kept in a TOML file; a missing file reads as the defaults
#[derive(Debug, Clone)]
pub struct TomlSettingsStore {
    path: PathBuf,
}

impl TomlSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SettingsError {
        SettingsError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SettingsStore for TomlSettingsStore {
    fn load(&self) -> Result<BridgeSettings, SettingsError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => BridgeSettings::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", self.path.display());
                Ok(BridgeSettings::default())
            }
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, settings: &BridgeSettings) -> Result<(), SettingsError> {
        let content = settings.to_toml_string()?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        std::fs::write(&self.path, content).map_err(|e| self.io_error(e))
    }
}
