use pretty_assertions::assert_eq;
use proptest::prelude::*;
use uncrustify_bridge_style::{
    export, BlankLineSettings, IndentOptions, SpacingSettings, StyleSettings, OPTION_ASSIGN_ALIGN,
};

const UNARY_OPTIONS: [&str; 6] = [
    "sp_sign",
    "sp_inv",
    "sp_addr",
    "sp_incdec",
    "sp_not",
    "sp_deref",
];

fn settings_with_spacing(spacing: SpacingSettings) -> StyleSettings {
    StyleSettings {
        spacing,
        ..Default::default()
    }
}

#[test]
fn test_unary_preference_fans_out_to_six_options() {
    for (active, token) in [(true, "force"), (false, "remove")] {
        let settings = settings_with_spacing(SpacingSettings {
            around_unary_operator: active,
            ..Default::default()
        });
        let config = export(&settings).config;
        for name in UNARY_OPTIONS {
            assert_eq!(config.get(name), Some(token), "option {name}");
        }
    }
}

#[test]
fn test_nl_max_is_largest_keep_count_plus_one() {
    let settings = StyleSettings {
        blank_lines: BlankLineSettings {
            keep_in_declarations: 2,
            keep_in_code: 5,
            keep_between_package_declaration_and_header: 1,
            ..Default::default()
        },
        ..Default::default()
    };
    let config = export(&settings).config;
    assert_eq!(config.get("nl_max"), Some("6"));
    assert_eq!(config.get("nl_max_blank_in_func"), Some("6"));
    assert_eq!(config.get("nl_inside_empty_func"), Some("6"));
}

#[test]
fn test_blank_line_counts_saturate_at_u32_max() {
    let settings = StyleSettings {
        blank_lines: BlankLineSettings {
            keep_in_code: u32::MAX,
            before_method_body: u32::MAX,
            around_class: u32::MAX,
            ..Default::default()
        },
        ..Default::default()
    };
    let config = export(&settings).config;
    let max = u32::MAX.to_string();
    for name in [
        "nl_max",
        "nl_max_blank_in_func",
        "nl_inside_empty_func",
        "nl_before_func_body_def",
        "nl_before_class",
        "nl_after_class",
    ] {
        assert_eq!(config.get(name), Some(max.as_str()), "option {name}");
    }
}

#[test]
fn test_indentation_options() {
    let settings = StyleSettings {
        indent_options: IndentOptions {
            indent_size: 3,
            continuation_indent_size: 6,
            use_tab_character: true,
            smart_tabs: true,
            keep_indents_on_empty_lines: true,
            label_indent_size: 3,
            label_indent_absolute: true,
        },
        do_not_indent_top_level_class_members: true,
        ..Default::default()
    };
    let export = export(&settings);
    let config = &export.config;

    assert_eq!(config.get("indent_class"), Some("false"));
    assert_eq!(config.get("indent_columns"), Some("3"));
    assert_eq!(config.get("indent_continue"), Some("6"));
    assert_eq!(config.get("indent_with_tabs"), Some("2"));
    assert_eq!(config.get("indent_single_newlines"), Some("true"));
    assert_eq!(config.get("indent_label"), Some("2"));
    assert!(export.warnings.is_empty());
}

#[test]
fn test_relative_label_indent_reports_warning() {
    let settings = StyleSettings {
        indent_options: IndentOptions {
            label_indent_size: 5,
            label_indent_absolute: false,
            ..Default::default()
        },
        ..Default::default()
    };
    let export = export(&settings);
    assert_eq!(export.config.get("indent_label"), Some("0"));
    assert_eq!(export.warnings.len(), 1);
    assert_eq!(export.warnings[0].requested, 5);
    assert_eq!(
        export.warnings[0].to_string(),
        "'indent_label' cannot express 5, emitted 0 instead"
    );
}

#[test]
fn test_newline_style_is_always_lf() {
    let config = export(&StyleSettings::default()).config;
    assert_eq!(config.options()[0].name, "newlines");
    assert_eq!(config.get("newlines"), Some("lf"));
}

#[test]
fn test_default_export_layout() {
    let export = export(&StyleSettings::default());
    let names: Vec<&str> = export.config.options().iter().map(|o| o.name).collect();

    assert_eq!(names.len(), 61);
    assert_eq!(
        &names[..8],
        &[
            "newlines",
            "indent_class",
            "indent_columns",
            "indent_continue",
            "indent_with_tabs",
            "indent_single_newlines",
            "indent_label",
            "sp_arith_additive",
        ]
    );
    assert_eq!(names.last(), Some(&"nl_after_class"));

    let rendered = export.config.render();
    assert!(rendered.starts_with(
        "# Generated by uncrustify-bridge from editor code style settings\nnewlines"
    ));
    for line in rendered.lines().filter(|l| !l.is_empty() && !l.starts_with('#')) {
        assert_eq!(line.find('='), Some(OPTION_ASSIGN_ALIGN), "misaligned: {line}");
    }
    // Spacing never falls back to the formatter's third state
    assert!(!rendered.contains("ignore"));
}

#[test]
fn test_assignment_spacing_is_forced() {
    let settings = StyleSettings::from_toml_str(
        r#"
        [indent_options]
        indent_size = 4
        use_tab_character = false

        [spacing]
        around_assignment_operators = true
        "#,
    )
    .unwrap();
    let config = export(&settings).config;
    assert_eq!(config.get("sp_assign"), Some("force"));
    assert_eq!(config.get("indent_columns"), Some("4"));
    assert_eq!(config.get("indent_with_tabs"), Some("0"));
}

fn spacing_strategy() -> impl Strategy<Value = SpacingSettings> {
    prop::collection::vec(any::<bool>(), 31).prop_map(|b| SpacingSettings {
        around_assignment_operators: b[0],
        around_logical_operators: b[1],
        around_relational_operators: b[2],
        around_additive_operators: b[3],
        around_multiplicative_operators: b[4],
        around_unary_operator: b[5],
        before_semicolon: b[6],
        after_semicolon: b[7],
        within_if_parentheses: b[8],
        before_if_parentheses: b[9],
        before_while_parentheses: b[10],
        within_cast_parentheses: b[11],
        after_type_cast: b[12],
        before_method_parentheses: b[13],
        before_method_lbrace: b[14],
        before_method_call_parentheses: b[15],
        within_method_parentheses: b[16],
        within_parentheses: b[17],
        within_brackets: b[18],
        before_if_lbrace: b[19],
        before_do_lbrace: b[20],
        before_try_lbrace: b[21],
        before_catch_keyword: b[22],
        before_finally_keyword: b[23],
        before_finally_lbrace: b[24],
        before_else_keyword: b[25],
        before_else_lbrace: b[26],
        before_colon: b[27],
        after_colon: b[28],
        before_quest: b[29],
        after_quest: b[30],
    })
}

fn indent_strategy() -> impl Strategy<Value = IndentOptions> {
    (
        0u32..16,
        0u32..16,
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        -8i32..8,
        any::<bool>(),
    )
        .prop_map(
            |(indent, continuation, tabs, smart, keep, label, absolute)| IndentOptions {
                indent_size: indent,
                continuation_indent_size: continuation,
                use_tab_character: tabs,
                smart_tabs: smart,
                keep_indents_on_empty_lines: keep,
                label_indent_size: label,
                label_indent_absolute: absolute,
            },
        )
}

fn blank_lines_strategy() -> impl Strategy<Value = BlankLineSettings> {
    prop::collection::vec(0u32..10, 6).prop_map(|n| BlankLineSettings {
        keep_in_declarations: n[0],
        keep_in_code: n[1],
        keep_between_package_declaration_and_header: n[2],
        before_package: n[3],
        before_method_body: n[4],
        around_class: n[5],
    })
}

fn settings_strategy() -> impl Strategy<Value = StyleSettings> {
    (
        indent_strategy(),
        any::<bool>(),
        spacing_strategy(),
        blank_lines_strategy(),
    )
        .prop_map(|(indent_options, top_level, spacing, blank_lines)| StyleSettings {
            indent_options,
            do_not_indent_top_level_class_members: top_level,
            spacing,
            blank_lines,
        })
}

proptest! {
    #[test]
    fn prop_export_is_deterministic(settings in settings_strategy()) {
        let first = export(&settings).config.render();
        let second = export(&settings.clone()).config.render();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_option_order_is_independent_of_values(settings in settings_strategy()) {
        let reference: Vec<&str> = export(&StyleSettings::default())
            .config
            .options()
            .iter()
            .map(|o| o.name)
            .collect();
        let names: Vec<&str> = export(&settings).config.options().iter().map(|o| o.name).collect();
        prop_assert_eq!(names, reference);
    }

    #[test]
    fn prop_warning_only_for_positive_relative_label(settings in settings_strategy()) {
        let opts = &settings.indent_options;
        let expected = !opts.label_indent_absolute && opts.label_indent_size > 0;
        prop_assert_eq!(!export(&settings).warnings.is_empty(), expected);
    }
}
