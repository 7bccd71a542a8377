use std::fmt;
use std::path::Path;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::ProcessError;
use crate::request::{ProcessRequest, ProcessResult};
use crate::session::ProcessOutcome;
use crate::supersede::SupersedingSlot;

static VERSION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Uncrustify(_d)?-(\d+)\.(\d+)\.(\d+)(_[a-z])?").expect("version pattern is valid")
});

/// Version string reported by the formatter, e.g. `Uncrustify_d-0.73.0_f`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    /// The full matched text
    pub full: String,
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    /// Debug build (`_d` after the product name)
    pub debug: bool,
    pub suffix: Option<char>,
}

impl VersionInfo {
    /// Find the first version string in `output`
    pub fn parse(output: &str) -> Option<Self> {
        let captures = VERSION_PATTERN.captures(output)?;
        let number = |i: usize| captures.get(i)?.as_str().parse::<u32>().ok();

        Some(Self {
            full: captures.get(0)?.as_str().to_string(),
            major: number(2)?,
            minor: number(3)?,
            patch: number(4)?,
            debug: captures.get(1).is_some(),
            suffix: captures
                .get(5)
                .and_then(|m| m.as_str().strip_prefix('_'))
                .and_then(|s| s.chars().next()),
        })
    }

    /// `major.minor.patch`
    pub fn version(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

/// Why a path is not a usable formatter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidExecutable {
    SpawnFailed(String),
    /// The run failed for a reason other than launching
    ProcessFailed(String),
    NonZeroExit { exit_code: i32 },
    UnrecognizedVersion { output: String },
}

impl fmt::Display for InvalidExecutable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpawnFailed(reason) => write!(f, "cannot be launched: {reason}"),
            Self::ProcessFailed(reason) => write!(f, "failed: {reason}"),
            Self::NonZeroExit { exit_code } => write!(f, "exited with code {exit_code}"),
            Self::UnrecognizedVersion { output } => {
                write!(f, "unrecognized version output {:?}", output.trim())
            }
        }
    }
}

impl From<ProcessError> for InvalidExecutable {
    fn from(err: ProcessError) -> Self {
        if err.is_spawn_failure() {
            Self::SpawnFailed(err.to_string())
        } else {
            Self::ProcessFailed(err.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutableStatus {
    Valid(VersionInfo),
    Invalid(InvalidExecutable),
    /// Superseded by a later verification
    Cancelled,
}

impl ExecutableStatus {
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// Checks that a path points at the formatter by asking for its version
#[derive(Debug, Default)]
pub struct ExecutableProbe {
    slot: SupersedingSlot,
    timeout: Option<Duration>,
}

impl ExecutableProbe {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            slot: SupersedingSlot::new(),
            timeout,
        }
    }

    pub fn request(path: &Path) -> ProcessRequest {
        ProcessRequest::new(path).arg("--version")
    }

    /// Valid only for exit code 0 together with a recognizable version
    pub fn interpret(result: &ProcessResult) -> Result<VersionInfo, InvalidExecutable> {
        if !result.success() {
            return Err(InvalidExecutable::NonZeroExit {
                exit_code: result.exit_code,
            });
        }
        VersionInfo::parse(&result.stdout).ok_or_else(|| InvalidExecutable::UnrecognizedVersion {
            output: result.stdout.clone(),
        })
    }

    /// Verify `path`, cancelling any verification still in flight
    pub async fn verify(&self, path: &Path) -> ExecutableStatus {
        let request = Self::request(path).timeout(self.timeout);
        let status = match self.slot.run(request).await {
            Ok(ProcessOutcome::Exited(result)) => match Self::interpret(&result) {
                Ok(version) => ExecutableStatus::Valid(version),
                Err(invalid) => ExecutableStatus::Invalid(invalid),
            },
            Ok(ProcessOutcome::Cancelled) => ExecutableStatus::Cancelled,
            Err(err) => ExecutableStatus::Invalid(err.into()),
        };

        match &status {
            ExecutableStatus::Valid(version) => {
                debug!("{} is {}", path.display(), version)
            }
            ExecutableStatus::Invalid(reason) => {
                warn!("{} is not a usable formatter: {}", path.display(), reason)
            }
            ExecutableStatus::Cancelled => debug!("Verification of {} superseded", path.display()),
        }
        status
    }

    pub fn cancel(&self) -> bool {
        self.slot.cancel()
    }
}
