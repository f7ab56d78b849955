//! Authoritative local copies of server-owned entities.
//!
//! Each store keeps its state inside a `tokio::sync::watch` channel. Every
//! change is applied with a single `send_modify`, so subscribers only ever
//! observe complete snapshots, never a half-replaced collection.
//!
//! Store operations never return errors. Failures from the remote service
//! are logged and folded into user-facing error flags.

mod boards;
mod issues;
mod selection;

pub use boards::{BoardStore, BoardsState};
pub use issues::{IssueStore, IssuesState};
pub use selection::Selection;

use tracing::warn;

use crate::error::TrackerError;

pub const BOARDS_LOAD_FAILED: &str = "Failed to load boards";
pub const ISSUES_LOAD_FAILED: &str = "Failed to load issues";
pub const ISSUE_CREATE_FAILED: &str = "Failed to create issue";
pub const ISSUE_UPDATE_FAILED: &str = "Failed to update issue";
pub const USERS_LOAD_FAILED: &str = "Failed to load users";

/// A fetched collection with its load flags.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: Vec<T>,
    pending: usize,
    error: Option<String>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            pending: 0,
            error: None,
        }
    }
}

impl<T> Collection<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// True while at least one fetch is in flight. Overlapping fetches form
    /// one busy period.
    pub fn loading(&self) -> bool {
        self.pending > 0
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn begin_load(&mut self) {
        self.pending += 1;
        self.error = None;
    }

    /// Apply a fetch result. A failed fetch keeps the previous items.
    fn finish_load(&mut self, result: Result<Vec<T>, TrackerError>, failure_message: &str) {
        self.pending = self.pending.saturating_sub(1);
        match result {
            Ok(items) => {
                self.items = items;
                self.error = None;
            }
            Err(e) => {
                warn!(kind = %e.kind(), error = %e, "{failure_message}");
                self.error = Some(failure_message.to_string());
            }
        }
    }

    fn items_mut(&mut self) -> &mut Vec<T> {
        &mut self.items
    }

    fn dismiss_error(&mut self) {
        self.error = None;
    }
}

/// Busy and error flags of one kind of write (create or update).
#[derive(Debug, Clone, Default)]
pub struct MutationState {
    pending: usize,
    error: Option<String>,
}

impl MutationState {
    pub fn loading(&self) -> bool {
        self.pending > 0
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn begin(&mut self) {
        self.pending += 1;
        self.error = None;
    }

    fn succeed(&mut self) {
        self.pending = self.pending.saturating_sub(1);
        self.error = None;
    }

    fn fail(&mut self, error: &TrackerError, failure_message: &str) {
        self.pending = self.pending.saturating_sub(1);
        warn!(kind = %error.kind(), error = %error, "{failure_message}");
        self.error = Some(failure_message.to_string());
    }
}
