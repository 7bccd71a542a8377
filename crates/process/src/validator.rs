use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::Result;
use crate::request::{ProcessRequest, ProcessResult};
use crate::session::ProcessOutcome;
use crate::supersede::SupersedingSlot;

/// Language the dry run parses [`VALIDATION_SNIPPET`] as
pub const VALIDATION_LANGUAGE: &str = "JAVA";

pub const VALIDATION_SNIPPET: &str =
    r#"public class Uncrustify {public static void main(String args[]){System.out.println("Hello Uncrustify!");}}"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigStatus {
    Valid,
    /// The formatter rejected the config; `output` is its stderr, unmodified
    Invalid { output: String },
    /// Superseded by a later validation
    Cancelled,
}

impl ConfigStatus {
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Validates a config file with a single dry run over a fixed snippet
#[derive(Debug, Default)]
pub struct ConfigValidator {
    slot: SupersedingSlot,
    timeout: Option<Duration>,
}

impl ConfigValidator {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            slot: SupersedingSlot::new(),
            timeout,
        }
    }

    pub fn request(executable: &Path, config: &Path) -> ProcessRequest {
        ProcessRequest::new(executable)
            .arg("-c")
            .arg(config)
            .args(["-l", VALIDATION_LANGUAGE])
            .input(VALIDATION_SNIPPET)
    }

    pub fn interpret(result: ProcessResult) -> ConfigStatus {
        if result.success() {
            ConfigStatus::Valid
        } else {
            ConfigStatus::Invalid {
                output: result.stderr,
            }
        }
    }

    /// Dry-run `config`, cancelling any validation still in flight
    pub async fn verify(&self, executable: &Path, config: &Path) -> Result<ConfigStatus> {
        let request = Self::request(executable, config).timeout(self.timeout);
        let status = match self.slot.run(request).await? {
            ProcessOutcome::Exited(result) => Self::interpret(result),
            ProcessOutcome::Cancelled => ConfigStatus::Cancelled,
        };

        match &status {
            ConfigStatus::Valid => debug!("{} accepted", config.display()),
            ConfigStatus::Invalid { output } => {
                warn!("{} rejected by the formatter", config.display());
                debug!("Formatter diagnostics: {}", output);
            }
            ConfigStatus::Cancelled => debug!("Validation of {} superseded", config.display()),
        }
        Ok(status)
    }

    pub fn cancel(&self) -> bool {
        self.slot.cancel()
    }
}
