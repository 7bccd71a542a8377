use std::path::Path;

use crate::settings::BridgeSettings;

/// File extensions the formatter recognizes, compared case-sensitively
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "c", "cpp", "d", "cs", "vala", "java", "pawn", "p", "sma", "inl", "h", "cxx", "hpp", "hxx",
    "cc", "cp", "C", "CPP", "c++", "di", "m", "mm", "sqc", "es",
];

/// Editor language IDs the formatter handles, compared case-insensitively
pub const SUPPORTED_LANGUAGES: &[&str] = &["C", "CPP", "D", "CS", "JAVA", "PAWN", "OC", "OC+", "VALA"];

pub fn is_extension_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
}

pub fn is_language_supported(language_id: &str) -> bool {
    SUPPORTED_LANGUAGES
        .iter()
        .any(|id| id.eq_ignore_ascii_case(language_id))
}

/// Whether a formatting request for `path` should reach the formatter
pub fn can_format(settings: &BridgeSettings, path: &Path) -> bool {
    settings.formatting_enabled && is_extension_supported(path)
}

/// Same as [`can_format`], for a document identified by its editor language ID
pub fn can_format_language(settings: &BridgeSettings, language_id: &str) -> bool {
    settings.formatting_enabled && is_language_supported(language_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extensions() {
        for name in ["main.c", "lib.hpp", "Main.java", "x.C", "y.c++", "dir.d/file.mm"] {
            assert!(is_extension_supported(Path::new(name)), "{name}");
        }
        for name in ["main.rs", "Makefile", "x.Hpp", "notes.txt", ".c"] {
            assert!(!is_extension_supported(Path::new(name)), "{name}");
        }
    }

    #[test]
    fn test_language_ids_ignore_case() {
        assert!(is_language_supported("JAVA"));
        assert!(is_language_supported("java"));
        assert!(is_language_supported("oc+"));
        assert!(!is_language_supported("Rust"));
        assert!(!is_language_supported(""));
    }

    #[test]
    fn test_can_format_respects_switch() {
        let mut settings = BridgeSettings::default();
        assert!(can_format(&settings, Path::new("src/main.cpp")));
        assert!(!can_format(&settings, Path::new("src/main.rs")));

        settings.formatting_enabled = false;
        assert!(!can_format(&settings, Path::new("src/main.cpp")));
    }

    #[test]
    fn test_can_format_language_respects_switch() {
        let mut settings = BridgeSettings::default();
        assert!(can_format_language(&settings, "cpp"));
        assert!(!can_format_language(&settings, "python"));

        settings.formatting_enabled = false;
        assert!(!can_format_language(&settings, "cpp"));
    }
}
