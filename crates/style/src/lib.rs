//! Style translation for the uncrustify bridge: the editor's code style
//! snapshot in, the formatter's option file out.

pub mod config_file;
pub mod exporter;
pub mod settings;
pub mod writer;

pub use config_file::{ConfigFile, ConfigOption};
pub use exporter::{export, Export, LossyConversion, SpaceToken, TabMode};
pub use settings::{BlankLineSettings, IndentOptions, SpacingSettings, StyleError, StyleSettings};
pub use writer::{ConfigWriter, OPTION_ASSIGN_ALIGN};
