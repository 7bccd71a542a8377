//! Supervised formatter subprocesses: the generic [`ProcessSession`] and the
//! verification workflows built on it.

pub mod error;
pub mod probe;
pub mod request;
pub mod session;
pub mod supersede;
pub mod validator;

pub use error::{ProcessError, Result};
pub use probe::{ExecutableProbe, ExecutableStatus, InvalidExecutable, VersionInfo};
pub use request::{ProcessRequest, ProcessResult};
pub use session::{CancelHandle, Completion, ProcessOutcome, ProcessSession, SessionState};
pub use supersede::SupersedingSlot;
pub use validator::{ConfigStatus, ConfigValidator, VALIDATION_LANGUAGE, VALIDATION_SNIPPET};
