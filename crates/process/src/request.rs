use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ProcessError, Result};

/// A single formatter invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRequest {
    pub(crate) executable: PathBuf,
    pub(crate) args: Vec<OsString>,
    pub(crate) input: Option<String>,
    pub(crate) timeout: Option<Duration>,
}

impl ProcessRequest {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            args: Vec::new(),
            input: None,
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Text piped to stdin; the pipe is closed once it is written
    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Kill the process if it is still running after `timeout`
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn executable(&self) -> &PathBuf {
        &self.executable
    }

    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    pub fn input_text(&self) -> Option<&str> {
        self.input.as_deref()
    }

    pub const fn timeout_duration(&self) -> Option<Duration> {
        self.timeout
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.executable.as_os_str().is_empty() {
            return Err(ProcessError::EmptyExecutable);
        }
        Ok(())
    }
}

/// Terminal result of a process that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    /// Exit code, `-1` when the process was killed by a signal
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessResult {
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_argument_order() {
        let request = ProcessRequest::new("uncrustify")
            .arg("-c")
            .arg("a.cfg")
            .args(["--assume", "main.c"])
            .input("int x;");

        let args: Vec<_> = request
            .arguments()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, ["-c", "a.cfg", "--assume", "main.c"]);
        assert_eq!(request.input_text(), Some("int x;"));
        assert_eq!(request.timeout_duration(), None);
    }

    #[test]
    fn test_empty_executable_is_rejected() {
        assert!(matches!(
            ProcessRequest::new("").validate(),
            Err(ProcessError::EmptyExecutable)
        ));
        assert!(ProcessRequest::new("uncrustify").validate().is_ok());
    }
}
