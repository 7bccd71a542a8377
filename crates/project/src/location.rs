//! Picks the config file a formatting run uses.
//!
//! First match wins: `uncrustify.cfg` in the project root, then the
//! configured path, then a file generated from the current style settings.

use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::{debug, trace};
use uncrustify_bridge_style::{export, LossyConversion, StyleSettings};

use crate::settings::BridgeSettings;

/// Well-known config file name in a project root
pub const PROJECT_CONFIG_FILE: &str = "uncrustify.cfg";

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Failed to write generated config file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug)]
pub enum ConfigLocation {
    Project(PathBuf),
    Explicit(PathBuf),
    /// Exported from style settings; deleted when dropped
    Generated(TempPath),
}

impl ConfigLocation {
    pub fn path(&self) -> &Path {
        match self {
            Self::Project(path) | Self::Explicit(path) => path,
            Self::Generated(path) => path,
        }
    }

    pub const fn is_generated(&self) -> bool {
        matches!(self, Self::Generated(_))
    }
}

/// The config chosen for one run, with any clamps the export needed
#[derive(Debug)]
pub struct ResolvedConfig {
    pub location: ConfigLocation,
    pub warnings: Vec<LossyConversion>,
}

impl ResolvedConfig {
    pub fn path(&self) -> &Path {
        self.location.path()
    }
}

/// Find an existing config file without generating one
pub fn locate_config(root: Option<&Path>, settings: &BridgeSettings) -> Option<ConfigLocation> {
    if let Some(root) = root {
        let candidate = root.join(PROJECT_CONFIG_FILE);
        if candidate.is_file() {
            debug!("Using project config {}", candidate.display());
            return Some(ConfigLocation::Project(candidate));
        }
        trace!("No {} in {}", PROJECT_CONFIG_FILE, root.display());
    }

    let explicit = settings
        .config_path
        .as_ref()
        .filter(|path| !path.as_os_str().is_empty())?;
    if explicit.is_file() {
        debug!("Using configured config {}", explicit.display());
        Some(ConfigLocation::Explicit(explicit.clone()))
    } else {
        debug!("Configured config {} does not exist", explicit.display());
        None
    }
}

/// Locate a config file, generating one from `style` if none exists
pub fn resolve_config(
    root: Option<&Path>,
    settings: &BridgeSettings,
    style: &StyleSettings,
) -> Result<ResolvedConfig, ResolveError> {
    if let Some(location) = locate_config(root, settings) {
        return Ok(ResolvedConfig {
            location,
            warnings: Vec::new(),
        });
    }

    let export = export(style);
    let (file, path) = tempfile::Builder::new()
        .prefix("uncrustify-bridge")
        .suffix(".cfg")
        .tempfile()?
        .into_parts();
    export.config.write_to(file)?.sync_all()?;
    debug!("Generated config {}", path.display());

    Ok(ResolvedConfig {
        location: ConfigLocation::Generated(path),
        warnings: export.warnings,
    })
}
