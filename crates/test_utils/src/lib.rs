//! Shared helpers for tests that drive a formatter subprocess.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Version line printed by [`FAKE_FORMATTER`] for `--version`
pub const FAKE_VERSION: &str = "Uncrustify-0.73.0_f";

/// Option name that makes [`FAKE_FORMATTER`] reject a config file
pub const REJECTED_OPTION: &str = "bogus_option";

/// A `/bin/sh` stand-in for the formatter.
///
/// * `--version` prints [`FAKE_VERSION`].
/// * `-c <cfg>` must name a readable file without a [`REJECTED_OPTION`]
///   record, otherwise it exits 1 with a diagnostic on stderr.
/// * Otherwise stdin is copied to stdout, normalising the spacing around
///   `=` when the config forces `sp_assign`.
///
/// Arguments of the last invocation are recorded, one per line, in
/// `last_args` next to the script.
pub const FAKE_FORMATTER: &str = r#"#!/bin/sh
printf '%s\n' "$@" > "$(dirname "$0")/last_args"
if [ "$1" = "--version" ]; then
    echo "Uncrustify-0.73.0_f"
    exit 0
fi
cfg=""
while [ $# -gt 0 ]; do
    case "$1" in
        -c) cfg="$2"; shift 2 ;;
        *) shift ;;
    esac
done
if [ ! -r "$cfg" ]; then
    echo "Unable to load the config file '$cfg'" >&2
    exit 1
fi
if grep -q '^bogus_option' "$cfg"; then
    echo "$cfg:1 Unknown option 'bogus_option'" >&2
    exit 1
fi
if grep -q '^sp_assign *= force' "$cfg"; then
    sed 's/ *= */ = /g'
else
    cat
fi
"#;

static REAL_FORMATTER: Lazy<Option<PathBuf>> = Lazy::new(|| {
    std::env::var_os("UNCRUSTIFY_PATH")
        .map(PathBuf::from)
        .filter(|path| path.is_file())
});

/// Path of a real formatter executable, taken from `UNCRUSTIFY_PATH`
pub fn real_formatter() -> Option<&'static Path> {
    REAL_FORMATTER.as_deref()
}

/// Install a debug-level subscriber once per test binary
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

/// A test fixture that manages a temporary project directory
#[derive(Debug)]
pub struct Fixture {
    /// The temporary directory that will be cleaned up when dropped
    temp_dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temporary directory");
        Self { temp_dir }
    }

    /// Add a file with the given relative path and content, returning its absolute path
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl AsRef<str>) -> PathBuf {
        let full_path = self.temp_dir.path().join(path.as_ref());

        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        std::fs::write(&full_path, content.as_ref()).expect("Failed to write file");
        full_path
    }

    /// Add an executable shell script
    #[cfg(unix)]
    pub fn add_script(&self, path: impl AsRef<Path>, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let full_path = self.add_file(path, body);
        let mut perms = std::fs::metadata(&full_path)
            .expect("Failed to stat script")
            .permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&full_path, perms).expect("Failed to make script executable");
        full_path
    }

    /// Install [`FAKE_FORMATTER`] under `bin/uncrustify`
    #[cfg(unix)]
    pub fn add_fake_formatter(&self) -> PathBuf {
        self.add_script("bin/uncrustify", FAKE_FORMATTER)
    }

    /// Arguments the fake formatter received on its last run
    pub fn last_formatter_args(&self) -> Vec<String> {
        self.read_file("bin/last_args")
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn root_path(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }

    pub fn path(&self, path: impl AsRef<Path>) -> PathBuf {
        self.temp_dir.path().join(path.as_ref())
    }

    pub fn read_file(&self, path: impl AsRef<Path>) -> String {
        std::fs::read_to_string(self.path(path)).expect("Failed to read file")
    }

    pub fn file_exists(&self, path: impl AsRef<Path>) -> bool {
        self.path(path).exists()
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
