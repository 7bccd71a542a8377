//! Translation of [`StyleSettings`] into the formatter's option file.
//!
//! Every rule is applied unconditionally and in a fixed order, so equal
//! snapshots always render to byte-identical files. The editor's model is
//! coarser than the formatter's in places (one unary-operator preference
//! drives six options) and finer in others (relative label indents), which
//! is where the lossy conversions below come from.

use std::fmt;

use tracing::{debug, warn};

use crate::config_file::ConfigFile;
use crate::settings::{BlankLineSettings, IndentOptions, SpacingSettings, StyleSettings};

pub const HEADER_COMMENT: &str = "Generated by uncrustify-bridge from editor code style settings";

/// The formatter's spacing tokens that the editor model can express.
///
/// The formatter also knows `ignore` and `add`; a boolean preference never
/// maps to either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceToken {
    /// Exactly one space
    Force,
    /// No space
    Remove,
}

impl SpaceToken {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Force => "force",
            Self::Remove => "remove",
        }
    }
}

impl From<bool> for SpaceToken {
    fn from(active: bool) -> Self {
        if active {
            Self::Force
        } else {
            Self::Remove
        }
    }
}

impl fmt::Display for SpaceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of the formatter's `indent_with_tabs` option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabMode {
    Spaces = 0,
    Tabs = 1,
    SmartTabs = 2,
}

impl TabMode {
    pub const fn from_flags(use_tabs: bool, smart_tabs: bool) -> Self {
        match (use_tabs, smart_tabs) {
            (false, _) => Self::Spaces,
            (true, false) => Self::Tabs,
            (true, true) => Self::SmartTabs,
        }
    }
}

impl fmt::Display for TabMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// A style value the option file cannot represent and was clamped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LossyConversion {
    pub option: &'static str,
    pub requested: i32,
    pub emitted: i32,
}

impl fmt::Display for LossyConversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' cannot express {}, emitted {} instead",
            self.option, self.requested, self.emitted
        )
    }
}

/// Result of an export: the option file plus every clamp applied on the way
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub config: ConfigFile,
    pub warnings: Vec<LossyConversion>,
}

/// Translate a style snapshot into a complete option file
pub fn export(settings: &StyleSettings) -> Export {
    let mut config = ConfigFile::new();
    let mut warnings = Vec::new();

    config.push_comment(HEADER_COMMENT);
    // Newline style is not exposed as a setting
    config.push("newlines", "lf");

    export_indent(
        &mut config,
        &mut warnings,
        &settings.indent_options,
        settings.do_not_indent_top_level_class_members,
    );
    export_spacing(&mut config, &settings.spacing);
    export_blank_lines(&mut config, &settings.blank_lines);

    for warning in &warnings {
        warn!("Lossy style conversion: {}", warning);
    }
    debug!(
        "Exported {} options ({} lossy)",
        config.options().len(),
        warnings.len()
    );

    Export { config, warnings }
}

fn export_indent(
    config: &mut ConfigFile,
    warnings: &mut Vec<LossyConversion>,
    opts: &IndentOptions,
    do_not_indent_top_level_class_members: bool,
) {
    config.push("indent_class", !do_not_indent_top_level_class_members);
    config.push("indent_columns", opts.indent_size);
    config.push("indent_continue", opts.continuation_indent_size);
    config.push(
        "indent_with_tabs",
        TabMode::from_flags(opts.use_tab_character, opts.smart_tabs),
    );
    config.push("indent_single_newlines", opts.keep_indents_on_empty_lines);

    let label_indent = label_indent(opts);
    if let Some(warning) = label_indent.1 {
        warnings.push(warning);
    }
    config.push("indent_label", label_indent.0);
}

/// Absolute label indents are 1-based in the editor and 0-based in the
/// formatter. Relative indents have no counterpart and collapse to 0.
fn label_indent(opts: &IndentOptions) -> (i32, Option<LossyConversion>) {
    if opts.label_indent_absolute {
        return (opts.label_indent_size - 1, None);
    }

    let clamp = (opts.label_indent_size > 0).then(|| LossyConversion {
        option: "indent_label",
        requested: opts.label_indent_size,
        emitted: 0,
    });
    (0, clamp)
}

fn export_spacing(config: &mut ConfigFile, sp: &SpacingSettings) {
    let mut space = |name: &'static str, active: bool| config.push(name, SpaceToken::from(active));

    space("sp_arith_additive", sp.around_additive_operators);
    // Also drives shift and bitwise operators in the formatter
    space("sp_arith", sp.around_multiplicative_operators);
    space("sp_assign", sp.around_assignment_operators);
    space("sp_bool", sp.around_logical_operators);
    space("sp_compare", sp.around_relational_operators);

    // sign, ~, &, ++/--, !, unary *
    for name in [
        "sp_sign",
        "sp_inv",
        "sp_addr",
        "sp_incdec",
        "sp_not",
        "sp_deref",
    ] {
        space(name, sp.around_unary_operator);
    }

    space("sp_before_semi_for", sp.before_semicolon);
    space("sp_before_semi_for_empty", sp.before_semicolon);
    space("sp_after_semi_for", sp.after_semicolon);
    space("sp_after_semi_for_empty", sp.after_semicolon);

    // sparen covers if, for, switch and while alike
    space("sp_inside_sparen", sp.within_if_parentheses);
    space("sp_before_sparen", sp.before_if_parentheses);
    space("sp_while_paren_open", sp.before_while_parentheses);

    space("sp_inside_paren_cast", sp.within_cast_parentheses);
    space("sp_after_cast", sp.after_type_cast);

    for name in [
        "sp_func_proto_paren",
        "sp_func_proto_paren_empty",
        "sp_func_def_paren",
        "sp_func_def_paren_empty",
    ] {
        space(name, sp.before_method_parentheses);
    }

    space("sp_fparen_brace", sp.before_method_lbrace);
    space("sp_func_call_paren", sp.before_method_call_parentheses);

    space("sp_inside_fparen", sp.within_method_parentheses);
    space("sp_inside_fparens", sp.within_method_parentheses);

    space("sp_inside_paren", sp.within_parentheses);
    space("sp_paren_paren", sp.within_parentheses);

    space("sp_inside_square", sp.within_brackets);
    space("sp_inside_square_empty", false);

    space("sp_sparen_brace", sp.before_if_lbrace);
    space("sp_do_brace_open", sp.before_do_lbrace);
    space("sp_try_brace", sp.before_try_lbrace);

    space("sp_brace_catch", sp.before_catch_keyword);
    space("sp_brace_finally", sp.before_finally_keyword);
    space("sp_finally_brace", sp.before_finally_lbrace);
    space("sp_brace_else", sp.before_else_keyword);
    space("sp_else_brace", sp.before_else_lbrace);

    space("sp_cond_colon_before", sp.before_colon);
    space("sp_cond_colon_after", sp.after_colon);
    space("sp_cond_question_before", sp.before_quest);
    space("sp_cond_question_after", sp.after_quest);
}

/// The formatter counts newlines, the editor counts blank lines: `n` blank
/// lines are `n + 1` newlines.
fn export_blank_lines(config: &mut ConfigFile, bl: &BlankLineSettings) {
    config.push("nl_start_of_file", bl.before_package);

    let max_kept = bl
        .keep_in_declarations
        .max(bl.keep_in_code)
        .max(bl.keep_between_package_declaration_and_header);
    config.push("nl_max", newline_count(max_kept));

    config.push("nl_max_blank_in_func", newline_count(bl.keep_in_code));
    config.push("nl_inside_empty_func", newline_count(bl.keep_in_code));

    for name in [
        "nl_before_func_body_def",
        "nl_before_func_class_def",
        "nl_before_func_class_proto",
        "nl_before_func_body_proto",
    ] {
        config.push(name, newline_count(bl.before_method_body));
    }

    config.push("nl_before_class", newline_count(bl.around_class));
    config.push("nl_after_class", newline_count(bl.around_class));
}

/// Newlines needed to leave `blank_lines` empty lines, saturating at `u32::MAX`
const fn newline_count(blank_lines: u32) -> u32 {
    blank_lines.saturating_add(1)
}
