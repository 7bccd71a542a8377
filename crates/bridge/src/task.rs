//! One formatting run: pick a config file, pipe the document through the
//! formatter and turn the exit status into an outcome.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, info, warn};
use uncrustify_bridge_process::{ProcessOutcome, ProcessRequest, ProcessSession};
use uncrustify_bridge_project::{resolve_config, BridgeSettings};
use uncrustify_bridge_style::StyleSettings;

/// Title shown with every [`FormattingError`]
pub const ERROR_TITLE: &str = "Uncrustify formatting failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    ResolvingConfig,
    Formatting,
    Completed,
    Failed,
    Cancelled,
}

/// Why a run failed. The formatter's stderr is logged, never carried here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormattingError {
    /// The formatter could not be run at all
    #[error("Uncrustify could not be run: {reason}")]
    GeneralException { reason: String },

    #[error("Uncrustify exited with code {exit_code}")]
    NonZeroExit { exit_code: i32 },
}

impl FormattingError {
    fn general(err: impl fmt::Display) -> Self {
        Self::GeneralException {
            reason: err.to_string(),
        }
    }

    pub const fn title(&self) -> &'static str {
        ERROR_TITLE
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormattingOutcome {
    /// Formatter stdout, verbatim
    Completed(String),
    Failed(FormattingError),
    Cancelled,
}

/// A document handed to the formatter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattingRequest {
    /// Passed as `--assume` so the formatter picks the language
    pub file_name: PathBuf,
    pub text: String,
    /// Directory searched for a project `uncrustify.cfg`
    pub project_root: Option<PathBuf>,
}

impl FormattingRequest {
    pub fn new(file_name: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            text: text.into(),
            project_root: None,
        }
    }

    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }
}

#[derive(Debug)]
pub struct FormattingTask {
    request: FormattingRequest,
    settings: BridgeSettings,
    style: StyleSettings,
    state: Mutex<TaskState>,
    session: ProcessSession,
    superseded: AtomicBool,
}

impl FormattingTask {
    pub fn new(request: FormattingRequest, settings: BridgeSettings, style: StyleSettings) -> Self {
        Self {
            request,
            settings,
            style,
            state: Mutex::new(TaskState::Idle),
            session: ProcessSession::new(),
            superseded: AtomicBool::new(false),
        }
    }

    pub fn request(&self) -> &FormattingRequest {
        &self.request
    }

    pub fn state(&self) -> TaskState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: TaskState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Moves `Idle` to `ResolvingConfig`; false if the task already ran
    fn begin(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != TaskState::Idle {
            return false;
        }
        *state = TaskState::ResolvingConfig;
        true
    }

    /// Kill the formatter if it is running. A no-op returning false before
    /// the process has started.
    pub fn cancel(&self) -> bool {
        self.session.cancel()
    }

    /// Cancel, and make sure a process that has not started yet never does
    pub(crate) fn supersede(&self) -> bool {
        self.superseded.store(true, Ordering::SeqCst);
        self.session.cancel()
    }

    fn is_superseded(&self) -> bool {
        self.superseded.load(Ordering::SeqCst)
    }

    /// Format the document. Runs at most once; later calls fail.
    pub async fn run(&self) -> FormattingOutcome {
        if !self.begin() {
            warn!("Task for {} has already run", self.request.file_name.display());
            return FormattingOutcome::Failed(FormattingError::general("task has already run"));
        }
        info!("Running Uncrustify on {}", self.request.file_name.display());

        let config = match resolve_config(
            self.request.project_root.as_deref(),
            &self.settings,
            &self.style,
        ) {
            Ok(config) => config,
            Err(err) => return self.finish(FormattingOutcome::Failed(FormattingError::general(err))),
        };

        if self.is_superseded() {
            return self.finish(FormattingOutcome::Cancelled);
        }

        self.set_state(TaskState::Formatting);
        let request = ProcessRequest::new(&self.settings.executable_path)
            .arg("-c")
            .arg(config.path())
            .arg("--assume")
            .arg(&self.request.file_name)
            .input(self.request.text.as_str())
            .timeout(self.settings.timeout());

        let completion = match self.session.start(request) {
            Ok(completion) => completion,
            Err(err) => return self.finish(FormattingOutcome::Failed(FormattingError::general(err))),
        };
        if self.is_superseded() {
            self.session.cancel();
        }

        let outcome = match completion.wait().await {
            Ok(ProcessOutcome::Exited(result)) if result.success() => {
                FormattingOutcome::Completed(result.stdout)
            }
            Ok(ProcessOutcome::Exited(result)) => {
                warn!("Uncrustify exit code: {}", result.exit_code);
                debug!("{}", result.stderr);
                FormattingOutcome::Failed(FormattingError::NonZeroExit {
                    exit_code: result.exit_code,
                })
            }
            Ok(ProcessOutcome::Cancelled) => FormattingOutcome::Cancelled,
            Err(err) => FormattingOutcome::Failed(FormattingError::general(err)),
        };

        // A generated config is deleted here
        drop(config);
        self.finish(outcome)
    }

    fn finish(&self, outcome: FormattingOutcome) -> FormattingOutcome {
        let state = match &outcome {
            FormattingOutcome::Completed(_) => TaskState::Completed,
            FormattingOutcome::Failed(err) => {
                warn!("Uncrustify service failed: {}", err);
                TaskState::Failed
            }
            FormattingOutcome::Cancelled => TaskState::Cancelled,
        };
        self.set_state(state);
        outcome
    }
}
