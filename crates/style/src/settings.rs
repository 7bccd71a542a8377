//! Editor-side code style snapshot consumed by the exporter.
//!
//! The snapshot is grouped the way the editor groups its preferences. Every
//! group except [`IndentOptions`] falls back to the editor's stock values when
//! absent from a TOML snapshot; the indent group is required, so a snapshot
//! without it is rejected at load time instead of reaching the exporter.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors raised while loading a style snapshot from disk
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    #[error("Failed to read style settings from '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid style settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Immutable snapshot of the editor's code style preferences
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyleSettings {
    /// Indentation preferences (required)
    pub indent_options: IndentOptions,
    /// Keep top-level class members flush with the class declaration
    #[serde(default)]
    pub do_not_indent_top_level_class_members: bool,
    /// "Space around X" preferences
    #[serde(default)]
    pub spacing: SpacingSettings,
    /// Blank line counts
    #[serde(default)]
    pub blank_lines: BlankLineSettings,
}

impl StyleSettings {
    /// Load a snapshot from a TOML file
    pub fn from_path(path: &Path) -> Result<Self, StyleError> {
        let content = std::fs::read_to_string(path).map_err(|source| StyleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, StyleError> {
        let settings: Self = toml::from_str(content).map_err(|e| {
            tracing::error!("Failed to parse style settings: {}", e);
            e
        })?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndentOptions {
    /// Indentation width in columns
    pub indent_size: u32,
    /// Continuation indent width in columns
    pub continuation_indent_size: u32,
    /// Indent with tab characters instead of spaces
    pub use_tab_character: bool,
    /// Tabs for indentation, spaces for alignment (only meaningful with tabs)
    pub smart_tabs: bool,
    /// Keep indentation on otherwise empty lines
    pub keep_indents_on_empty_lines: bool,
    /// Label indent, 1-based when absolute, relative to the code otherwise
    pub label_indent_size: i32,
    /// Whether `label_indent_size` is an absolute column
    pub label_indent_absolute: bool,
}

impl Default for IndentOptions {
    fn default() -> Self {
        Self {
            indent_size: 4,
            continuation_indent_size: 8,
            use_tab_character: false,
            smart_tabs: false,
            keep_indents_on_empty_lines: false,
            label_indent_size: 0,
            label_indent_absolute: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpacingSettings {
    pub around_assignment_operators: bool,
    pub around_logical_operators: bool,
    pub around_relational_operators: bool,
    pub around_additive_operators: bool,
    pub around_multiplicative_operators: bool,
    /// Covers sign, inversion, address-of, increment/decrement, logical-not and dereference
    pub around_unary_operator: bool,
    pub before_semicolon: bool,
    pub after_semicolon: bool,
    pub within_if_parentheses: bool,
    pub before_if_parentheses: bool,
    pub before_while_parentheses: bool,
    pub within_cast_parentheses: bool,
    pub after_type_cast: bool,
    pub before_method_parentheses: bool,
    pub before_method_lbrace: bool,
    pub before_method_call_parentheses: bool,
    pub within_method_parentheses: bool,
    pub within_parentheses: bool,
    pub within_brackets: bool,
    pub before_if_lbrace: bool,
    pub before_do_lbrace: bool,
    pub before_try_lbrace: bool,
    pub before_catch_keyword: bool,
    pub before_finally_keyword: bool,
    pub before_finally_lbrace: bool,
    pub before_else_keyword: bool,
    pub before_else_lbrace: bool,
    /// Before the `:` of a ternary
    pub before_colon: bool,
    /// After the `:` of a ternary
    pub after_colon: bool,
    /// Before the `?` of a ternary
    pub before_quest: bool,
    /// After the `?` of a ternary
    pub after_quest: bool,
}

impl Default for SpacingSettings {
    fn default() -> Self {
        Self {
            around_assignment_operators: true,
            around_logical_operators: true,
            around_relational_operators: true,
            around_additive_operators: true,
            around_multiplicative_operators: true,
            around_unary_operator: false,
            before_semicolon: false,
            after_semicolon: true,
            within_if_parentheses: false,
            before_if_parentheses: true,
            before_while_parentheses: true,
            within_cast_parentheses: false,
            after_type_cast: true,
            before_method_parentheses: false,
            before_method_lbrace: true,
            before_method_call_parentheses: false,
            within_method_parentheses: false,
            within_parentheses: false,
            within_brackets: false,
            before_if_lbrace: true,
            before_do_lbrace: true,
            before_try_lbrace: true,
            before_catch_keyword: true,
            before_finally_keyword: true,
            before_finally_lbrace: true,
            before_else_keyword: true,
            before_else_lbrace: true,
            before_colon: true,
            after_colon: true,
            before_quest: true,
            after_quest: true,
        }
    }
}

/// Blank line counts. "Keep" values are maxima the editor preserves,
/// the others are minima it inserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlankLineSettings {
    pub keep_in_declarations: u32,
    pub keep_in_code: u32,
    pub keep_between_package_declaration_and_header: u32,
    pub before_package: u32,
    pub before_method_body: u32,
    pub around_class: u32,
}

impl Default for BlankLineSettings {
    fn default() -> Self {
        Self {
            keep_in_declarations: 2,
            keep_in_code: 2,
            keep_between_package_declaration_and_header: 2,
            before_package: 0,
            before_method_body: 0,
            around_class: 1,
        }
    }
}
