use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::error::Result;
use crate::request::ProcessRequest;
use crate::session::{CancelHandle, ProcessOutcome, ProcessSession};

/// Holds the single in-flight session of a logical task.
///
/// Running a request through the slot cancels the one before it, so a
/// stale verification never outlives the edit that replaced it.
#[derive(Debug, Default)]
pub struct SupersedingSlot {
    current: Mutex<Option<(u64, CancelHandle)>>,
    next_id: AtomicU64,
}

impl SupersedingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `request` to completion unless a later call supersedes it
    pub async fn run(&self, request: ProcessRequest) -> Result<ProcessOutcome> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let session = ProcessSession::new();

        let completion = {
            let mut current = self.current();
            if let Some((previous, handle)) = current.take() {
                if handle.cancel() {
                    debug!("Request {} superseded by {}", previous, id);
                }
            }
            let completion = session.start(request)?;
            *current = Some((id, session.cancel_handle()));
            completion
        };

        let outcome = completion.wait().await;

        let mut current = self.current();
        if matches!(current.as_ref(), Some((owner, _)) if *owner == id) {
            *current = None;
        }
        outcome
    }

    /// Cancel the in-flight request, if any
    pub fn cancel(&self) -> bool {
        self.current()
            .take()
            .is_some_and(|(_, handle)| handle.cancel())
    }

    pub fn is_busy(&self) -> bool {
        self.current().is_some()
    }

    fn current(&self) -> MutexGuard<'_, Option<(u64, CancelHandle)>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
