//! Supervised formatter subprocess.
//!
//! A [`ProcessSession`] runs at most one process. Output is drained by
//! dedicated tasks while the process runs, and the terminal outcome is
//! handed to the caller through a oneshot channel, so it is delivered at
//! most once no matter how cancellation and exit race.

use std::io;
use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{oneshot, Notify};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, trace, warn};

use crate::error::{ProcessError, Result};
use crate::request::{ProcessRequest, ProcessResult};

/// Lifecycle of a [`ProcessSession`]. `Terminated` and `Cancelled` are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    /// The process has been spawned and has not been reaped yet
    Started,
    Terminated,
    Cancelled,
}

impl SessionState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Terminated | Self::Cancelled)
    }
}

/// How a started session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Exited(ProcessResult),
    /// The process was killed by [`ProcessSession::cancel`]; its output was discarded
    Cancelled,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<SessionState>,
    cancel: Notify,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move `Started` to `next`; false if the session left `Started` already
    fn finish(&self, next: SessionState) -> bool {
        let mut state = self.state();
        if *state == SessionState::Started {
            *state = next;
            true
        } else {
            false
        }
    }

    fn cancel(&self) -> bool {
        if self.finish(SessionState::Cancelled) {
            // Stores a permit if the supervisor is not waiting yet
            self.cancel.notify_one();
            true
        } else {
            false
        }
    }
}

/// A cloneable handle that can cancel a session from anywhere
#[derive(Debug, Clone)]
pub struct CancelHandle {
    shared: Arc<Shared>,
}

impl CancelHandle {
    /// Kill the process if it is alive. Returns true at most once.
    pub fn cancel(&self) -> bool {
        self.shared.cancel()
    }

    pub fn state(&self) -> SessionState {
        *self.shared.state()
    }
}

/// Pending terminal outcome of a started session
#[derive(Debug)]
pub struct Completion {
    receiver: oneshot::Receiver<Result<ProcessResult>>,
}

impl Completion {
    pub async fn wait(self) -> Result<ProcessOutcome> {
        match self.receiver.await {
            Ok(result) => result.map(ProcessOutcome::Exited),
            // The supervisor drops the sender without sending only on cancel
            Err(_) => Ok(ProcessOutcome::Cancelled),
        }
    }
}

/// Supervised run of a single formatter process.
///
/// Must be started from within a tokio runtime.
#[derive(Debug)]
pub struct ProcessSession {
    shared: Arc<Shared>,
}

impl ProcessSession {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(SessionState::Created),
                cancel: Notify::new(),
            }),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.shared.state()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Kill the process if it is alive.
    ///
    /// Returns false before [`start`](Self::start) and once the session has
    /// reached a terminal state.
    pub fn cancel(&self) -> bool {
        self.shared.cancel()
    }

    /// Spawn the process and begin supervising it.
    ///
    /// A launch failure moves the session to `Terminated`.
    pub fn start(&self, request: ProcessRequest) -> Result<Completion> {
        request.validate()?;

        let mut state = self.shared.state();
        if *state != SessionState::Created {
            return Err(ProcessError::AlreadyStarted);
        }

        let ProcessRequest {
            executable,
            args,
            input,
            timeout,
        } = request;

        debug!("Spawning {} {:?}", executable.display(), args);
        let mut command = Command::new(&executable);
        command
            .args(&args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match command.spawn() {
            Ok(child) => child,
            Err(source) => {
                *state = SessionState::Terminated;
                return Err(ProcessError::Spawn { executable, source });
            }
        };
        *state = SessionState::Started;
        drop(state);

        let (sender, receiver) = oneshot::channel();
        tokio::spawn(supervise(
            child,
            input,
            timeout,
            Arc::clone(&self.shared),
            sender,
        ));

        Ok(Completion { receiver })
    }
}

impl Default for ProcessSession {
    fn default() -> Self {
        Self::new()
    }
}

async fn supervise(
    mut child: Child,
    input: Option<String>,
    timeout: Option<Duration>,
    shared: Arc<Shared>,
    sender: oneshot::Sender<Result<ProcessResult>>,
) {
    let pid = child.id();
    let stdout = tokio::spawn(capture(child.stdout.take()));
    let stderr = tokio::spawn(capture(child.stderr.take()));
    let writer = tokio::spawn(write_input(child.stdin.take(), input));
    let io_tasks = [
        stdout.abort_handle(),
        stderr.abort_handle(),
        writer.abort_handle(),
    ];

    let deadline = async {
        match timeout {
            Some(duration) => tokio::time::sleep(duration).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    let status = tokio::select! {
        _ = shared.cancel.notified() => {
            debug!("Cancelling process {:?}", pid);
            kill(&mut child).await;
            abort_all(&io_tasks);
            return;
        }
        _ = &mut deadline => {
            kill(&mut child).await;
            abort_all(&io_tasks);
            deliver_timeout(&shared, sender, pid, timeout);
            return;
        }
        status = child.wait() => status,
    };

    // A descendant can keep the pipes open after the process exits
    let result = tokio::select! {
        _ = shared.cancel.notified() => {
            debug!("Cancelled process {:?} while draining its output", pid);
            abort_all(&io_tasks);
            return;
        }
        _ = &mut deadline => {
            abort_all(&io_tasks);
            deliver_timeout(&shared, sender, pid, timeout);
            return;
        }
        result = collect(status, stdout, stderr, writer) => result,
    };

    if !shared.finish(SessionState::Terminated) {
        trace!("Discarding output of cancelled process {:?}", pid);
        return;
    }
    if let Ok(result) = &result {
        debug!("Process {:?} exited with code {}", pid, result.exit_code);
    }
    // The caller may have stopped waiting
    let _ = sender.send(result);
}

fn deliver_timeout(
    shared: &Shared,
    sender: oneshot::Sender<Result<ProcessResult>>,
    pid: Option<u32>,
    timeout: Option<Duration>,
) {
    let duration = timeout.unwrap_or_default();
    warn!("Process {:?} timed out after {:?}", pid, duration);
    if shared.finish(SessionState::Terminated) {
        let _ = sender.send(Err(ProcessError::TimedOut(duration)));
    }
}

fn abort_all(tasks: &[AbortHandle]) {
    for task in tasks {
        task.abort();
    }
}

async fn collect(
    status: io::Result<std::process::ExitStatus>,
    stdout: JoinHandle<io::Result<Vec<u8>>>,
    stderr: JoinHandle<io::Result<Vec<u8>>>,
    writer: JoinHandle<io::Result<()>>,
) -> Result<ProcessResult> {
    let status = status.map_err(ProcessError::Wait)?;

    match join(writer).await {
        Ok(()) => {}
        // The formatter may exit before reading all of its input
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
            debug!("Process closed its input early: {}", err);
        }
        Err(err) => return Err(ProcessError::InputWrite(err)),
    }

    let stdout = join(stdout).await.map_err(ProcessError::Capture)?;
    let stderr = join(stderr).await.map_err(ProcessError::Capture)?;

    Ok(ProcessResult {
        exit_code: status.code().unwrap_or(-1),
        stdout: decode("stdout", stdout),
        stderr: decode("stderr", stderr),
    })
}

/// UTF-8 text of a captured stream, with invalid sequences replaced
fn decode(stream: &str, bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            debug!(
                "Process {} is not valid UTF-8 after byte {}, replacing invalid sequences",
                stream,
                err.utf8_error().valid_up_to()
            );
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    }
}

async fn join<T>(handle: JoinHandle<io::Result<T>>) -> io::Result<T> {
    handle.await.map_err(io::Error::other)?
}

async fn capture<R: AsyncRead + Unpin>(stream: Option<R>) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    if let Some(mut stream) = stream {
        stream.read_to_end(&mut buffer).await?;
    }
    Ok(buffer)
}

/// Write `input` and close the pipe so the formatter sees end of input
async fn write_input(stdin: Option<ChildStdin>, input: Option<String>) -> io::Result<()> {
    let (Some(mut stdin), Some(input)) = (stdin, input) else {
        return Ok(());
    };
    stdin.write_all(input.as_bytes()).await?;
    stdin.flush().await?;
    drop(stdin);
    Ok(())
}

async fn kill(child: &mut Child) {
    if let Err(err) = child.kill().await {
        debug!("Failed to kill process: {}", err);
    }
}
