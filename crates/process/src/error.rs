use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Result type for process operations
pub type Result<T> = std::result::Result<T, ProcessError>;

/// Failures of a supervised formatter run.
///
/// A nonzero exit code is not an error: it is reported through
/// [`crate::ProcessResult::exit_code`].
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Executable path is empty")]
    EmptyExecutable,

    #[error("Process session was already started")]
    AlreadyStarted,

    #[error("Failed to launch '{}': {source}", executable.display())]
    Spawn {
        executable: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write input to the process: {0}")]
    InputWrite(#[source] io::Error),

    #[error("Failed to capture process output: {0}")]
    Capture(#[source] io::Error),

    #[error("Failed to wait for the process: {0}")]
    Wait(#[source] io::Error),

    #[error("Process did not finish within {0:?}")]
    TimedOut(Duration),
}

impl ProcessError {
    /// Whether the executable never ran
    pub const fn is_spawn_failure(&self) -> bool {
        matches!(self, Self::Spawn { .. } | Self::EmptyExecutable)
    }
}
