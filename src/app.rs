//! Presentation-facing surface: read accessors and intent dispatchers.

use std::sync::Arc;

use tracing::debug;

use crate::client::TrackerApi;
use crate::drag::{handle_drag, DragGesture, DragOutcome};
use crate::error::Result;
use crate::filter::{group_by_status, FilterCriteria, IssueFilter, Lanes};
use crate::store::{BoardStore, IssueStore, Selection};
use crate::types::{BoardName, Issue, IssueId};
use crate::workflow::{FormMode, IssueComposer, IssueDraft};

/// One instance per session. Stores are shared by `Arc` so that views and
/// workflows read the same authoritative copies.
pub struct Tracker {
    boards: Arc<BoardStore>,
    issues: Arc<IssueStore>,
    filter: IssueFilter,
    composer: IssueComposer,
}

impl Tracker {
    pub fn new(api: Arc<dyn TrackerApi>) -> Self {
        let boards = Arc::new(BoardStore::new(api.clone()));
        let issues = Arc::new(IssueStore::new(api.clone()));
        let filter = IssueFilter::new(api.clone());
        let composer = IssueComposer::new(api, boards.clone(), issues.clone());
        Self {
            boards,
            issues,
            filter,
            composer,
        }
    }

    pub fn boards(&self) -> &BoardStore {
        &self.boards
    }

    pub fn issues(&self) -> &IssueStore {
        &self.issues
    }

    pub fn filter(&self) -> &IssueFilter {
        &self.filter
    }

    pub fn composer(&self) -> &IssueComposer {
        &self.composer
    }

    pub fn composer_mut(&mut self) -> &mut IssueComposer {
        &mut self.composer
    }

    /// Fetch boards and issues side by side.
    pub async fn refresh(&self) {
        tokio::join!(self.boards.fetch_boards(), self.issues.fetch_issues());
    }

    pub fn filtered_issues(&self) -> Vec<Issue> {
        self.filter.apply(&self.issues.issues())
    }

    pub fn lanes(&self) -> Lanes {
        group_by_status(&self.filtered_issues())
    }

    /// Lanes of a single board, ignoring the active filter.
    pub fn board_lanes(&self, board_id: i64) -> Lanes {
        group_by_status(&self.issues.issues_for_board(board_id))
    }

    pub fn board_name(&self, issue: &Issue) -> BoardName {
        self.boards.board_name(issue.board_id)
    }

    pub fn selection(&self) -> Selection {
        self.issues.selection()
    }

    pub fn selected_issue(&self) -> Option<Issue> {
        self.issues.selected_issue()
    }

    pub fn open_view(&self, id: IssueId) {
        self.issues.open_dialog(id);
    }

    /// Open `id` in edit mode and seed the edit form from it.
    pub async fn open_edit(&mut self, id: IssueId) -> Result<()> {
        self.issues.open_edit_dialog(id);
        if let Err(e) = self.composer.begin_edit(id).await {
            self.issues.close_dialog();
            return Err(e);
        }
        Ok(())
    }

    /// Switch the open dialog from view to edit. Like `open_edit`, the dialog
    /// is closed when the form cannot be seeded.
    pub async fn switch_to_edit(&mut self) -> Result<()> {
        if !self.issues.switch_to_edit() {
            return Ok(());
        }
        let Some(id) = self.issues.selection().open_issue_id() else {
            return Ok(());
        };
        if self.composer.is_editing(id) {
            return Ok(());
        }
        if let Err(e) = self.composer.begin_edit(id).await {
            self.issues.close_dialog();
            return Err(e);
        }
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.composer.cancel_edit();
        self.issues.cancel_edit();
    }

    pub fn close(&mut self) {
        self.composer.close();
        self.issues.close_dialog();
    }

    pub async fn set_filter(&self, criteria: FilterCriteria) {
        debug!(?criteria, "filter changed");
        self.filter.set_filter(criteria).await;
    }

    pub async fn begin_create(&mut self) {
        self.composer.begin_create().await;
    }

    pub async fn submit_create(&mut self, draft: IssueDraft) -> Result<IssueId> {
        if self.composer.mode() != &FormMode::Creating {
            self.composer.begin_create().await;
        }
        *self.composer.draft_mut() = draft;
        self.composer.submit_create().await
    }

    /// Save `draft` over issue `id`. On success the dialog returns to view
    /// mode.
    pub async fn submit_edit(&mut self, id: IssueId, draft: IssueDraft) -> Result<()> {
        if !self.composer.is_editing(id) {
            self.composer.begin_edit(id).await?;
        }
        *self.composer.draft_mut() = draft;
        self.composer.submit_edit().await?;
        self.issues.finish_edit();
        self.filter.refresh_assignee().await;
        Ok(())
    }

    /// Move a card between lanes of the current filtered view.
    pub async fn drag_issue(&self, gesture: DragGesture) -> DragOutcome {
        let view = self.lanes();
        handle_drag(&self.issues, &view, &gesture).await
    }
}
