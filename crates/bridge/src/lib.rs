//! Formats documents with Uncrustify, driven by editor code style settings.

pub mod service;
pub mod task;

pub use service::FormattingService;
pub use task::{
    FormattingError, FormattingOutcome, FormattingRequest, FormattingTask, TaskState, ERROR_TITLE,
};
pub use uncrustify_bridge_process as process;
pub use uncrustify_bridge_project as project;
pub use uncrustify_bridge_style as style;
