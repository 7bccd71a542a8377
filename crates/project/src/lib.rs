//! Project-side inputs of a formatting run: persisted settings, config
//! file resolution and file eligibility.

pub mod eligibility;
pub mod location;
pub mod settings;

pub use eligibility::{
    can_format, can_format_language, is_extension_supported, is_language_supported,
};
pub use location::{
    locate_config, resolve_config, ConfigLocation, ResolveError, ResolvedConfig,
    PROJECT_CONFIG_FILE,
};
pub use settings::{BridgeSettings, SettingsError, SettingsStore, TomlSettingsStore};
