use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;
use uncrustify_bridge_project::{can_format, can_format_language, BridgeSettings};
use uncrustify_bridge_style::StyleSettings;

use crate::task::{FormattingOutcome, FormattingRequest, FormattingTask};

/// Formats documents, keeping at most one live run per document.
///
/// A new request for a document supersedes the one in flight: the old
/// process is killed and its caller sees [`FormattingOutcome::Cancelled`].
#[derive(Debug)]
pub struct FormattingService {
    settings: BridgeSettings,
    style: StyleSettings,
    /// In-flight task per document, tagged with its request id
    in_flight: DashMap<PathBuf, (u64, Arc<FormattingTask>)>,
    next_id: AtomicU64,
}

impl FormattingService {
    pub fn new(settings: BridgeSettings, style: StyleSettings) -> Self {
        Self {
            settings,
            style,
            in_flight: DashMap::new(),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    pub fn can_format(&self, path: &Path) -> bool {
        can_format(&self.settings, path)
    }

    pub fn can_format_language(&self, language_id: &str) -> bool {
        can_format_language(&self.settings, language_id)
    }

    pub async fn format(&self, request: FormattingRequest) -> FormattingOutcome {
        let key = request.file_name.clone();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let task = Arc::new(FormattingTask::new(
            request,
            self.settings.clone(),
            self.style.clone(),
        ));

        if let Some((previous, stale)) = self.in_flight.insert(key.clone(), (id, Arc::clone(&task))) {
            debug!("Request {} for {} superseded by {}", previous, key.display(), id);
            stale.supersede();
        }

        let outcome = task.run().await;

        // Gone or replaced means a later request or `cancel` made this one stale
        if self
            .in_flight
            .remove_if(&key, |_, (owner, _)| *owner == id)
            .is_none()
        {
            debug!("Discarding stale result {} for {}", id, key.display());
            return FormattingOutcome::Cancelled;
        }
        outcome
    }

    /// Cancel the run in flight for `path`, if any
    pub fn cancel(&self, path: &Path) -> bool {
        self.in_flight
            .remove(path)
            .is_some_and(|(_, (_, task))| task.supersede())
    }

    /// Number of documents with a run in flight
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}
