//! Create and edit forms for issues.
//!
//! The composer loads the reference data a form needs (users, boards),
//! validates the draft against it and submits through the issue store.
//! Validation failures are reported before anything is sent.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::client::TrackerApi;
use crate::error::{Result, TrackerError};
use crate::store::{BoardStore, IssueStore, ISSUE_CREATE_FAILED, ISSUE_UPDATE_FAILED, USERS_LOAD_FAILED};
use crate::types::{Board, Issue, IssueId, IssuePatch, IssueStatus, NewIssue, Priority, User};

/// Form values as typed by the user. Ids are kept as text until submit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueDraft {
    pub title: String,
    pub description: String,
    pub priority: Option<Priority>,
    /// Only used when editing; new issues always start in the backlog.
    pub status: Option<IssueStatus>,
    pub assignee_id: String,
    pub board_id: String,
}

impl IssueDraft {
    pub fn from_issue(issue: &Issue) -> Self {
        Self {
            title: issue.title.clone(),
            description: issue.description.clone(),
            priority: Some(issue.priority),
            status: Some(issue.status),
            assignee_id: issue.assignee.id.to_string(),
            board_id: issue.board_id.to_string(),
        }
    }

    fn checked_text(field: &'static str, value: &str) -> Result<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(TrackerError::validation(field, "must not be empty"));
        }
        Ok(trimmed.to_string())
    }

    fn checked_priority(&self) -> Result<Priority> {
        self.priority
            .ok_or_else(|| TrackerError::validation("priority", "must be selected"))
    }

    /// Check the draft for a create. Users and boards are only consulted when
    /// loaded; an empty list means the reference is not known yet.
    pub fn to_new_issue(&self, users: &[User], boards: &[Board]) -> Result<NewIssue> {
        let title = Self::checked_text("title", &self.title)?;
        let description = Self::checked_text("description", &self.description)?;
        let priority = self.checked_priority()?;
        let assignee_id = parse_id("assigneeId", &self.assignee_id)?;
        let board_id = parse_id("boardId", &self.board_id)?;

        check_assignee(users, assignee_id)?;
        if !boards.is_empty() && !boards.iter().any(|b| b.id == board_id) {
            return Err(TrackerError::validation(
                "boardId",
                format!("no board with id {board_id}"),
            ));
        }

        Ok(NewIssue {
            title,
            description,
            priority,
            assignee_id,
            board_id,
        })
    }

    /// Check the draft for an edit. The patch always carries every field and
    /// the description is sent as typed, empty or not. An issue cannot move
    /// to another board, so a board id other than `board_id` is refused.
    pub fn to_patch(&self, users: &[User], board_id: i64) -> Result<IssuePatch> {
        let title = Self::checked_text("title", &self.title)?;
        let description = self.description.clone();
        let priority = self.checked_priority()?;
        let status = self
            .status
            .ok_or_else(|| TrackerError::validation("status", "must be selected"))?;
        let assignee_id = parse_id("assigneeId", &self.assignee_id)?;
        check_assignee(users, assignee_id)?;
        if self.board_id.trim() != board_id.to_string() {
            return Err(TrackerError::validation(
                "boardId",
                format!("cannot be changed when editing (issue is on board {board_id})"),
            ));
        }

        Ok(IssuePatch {
            title,
            description,
            priority,
            status,
            assignee_id,
        })
    }
}

fn parse_id(field: &'static str, raw: &str) -> Result<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(TrackerError::validation(field, "must be selected"));
    }
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(TrackerError::validation(
            field,
            format!("expected a positive integer, got {raw:?}"),
        )),
    }
}

fn check_assignee(users: &[User], assignee_id: i64) -> Result<()> {
    if !users.is_empty() && !users.iter().any(|u| u.id == assignee_id) {
        return Err(TrackerError::validation(
            "assigneeId",
            format!("no user with id {assignee_id}"),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    Closed,
    Creating,
    Editing { id: IssueId, pristine: IssueDraft },
}

/// User roster cached for the open form.
#[derive(Debug, Clone, Default)]
pub struct UserList {
    pub users: Vec<User>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct IssueComposer {
    api: Arc<dyn TrackerApi>,
    boards: Arc<BoardStore>,
    issues: Arc<IssueStore>,
    mode: FormMode,
    draft: IssueDraft,
    users: UserList,
    error: Option<String>,
}

impl IssueComposer {
    pub fn new(api: Arc<dyn TrackerApi>, boards: Arc<BoardStore>, issues: Arc<IssueStore>) -> Self {
        Self {
            api,
            boards,
            issues,
            mode: FormMode::Closed,
            draft: IssueDraft::default(),
            users: UserList::default(),
            error: None,
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn draft(&self) -> &IssueDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut IssueDraft {
        &mut self.draft
    }

    pub fn users(&self) -> &UserList {
        &self.users
    }

    /// Last validation or submission error of the open form.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_editing(&self, id: IssueId) -> bool {
        matches!(&self.mode, FormMode::Editing { id: editing, .. } if *editing == id)
    }

    async fn fetch_users(api: &dyn TrackerApi) -> Result<Vec<User>> {
        api.list_users().await
    }

    fn apply_users(&mut self, result: Result<Vec<User>>) {
        self.users.loading = false;
        match result {
            Ok(users) => {
                debug!(count = users.len(), "users loaded");
                self.users.users = users;
                self.users.error = None;
            }
            Err(e) => {
                warn!(kind = %e.kind(), error = %e, "{USERS_LOAD_FAILED}");
                self.users.error = Some(USERS_LOAD_FAILED.to_string());
            }
        }
    }

    /// Open a blank create form and load users and boards side by side. One
    /// list failing to load does not hold up the other.
    pub async fn begin_create(&mut self) {
        self.mode = FormMode::Creating;
        self.draft = IssueDraft::default();
        self.error = None;
        self.users.loading = true;

        let (users, ()) = tokio::join!(
            Self::fetch_users(self.api.as_ref()),
            self.boards.fetch_boards()
        );
        self.apply_users(users);
    }

    pub async fn submit_create(&mut self) -> Result<IssueId> {
        if self.mode != FormMode::Creating {
            return Err(TrackerError::validation("form", "no create form is open"));
        }

        let input = self
            .draft
            .to_new_issue(&self.users.users, &self.boards.boards())
            .inspect_err(|e| self.error = Some(e.to_string()))?;

        match self.issues.create_issue(&input).await {
            Some(id) => {
                self.close();
                Ok(id)
            }
            None => {
                let message = self
                    .issues
                    .create_error()
                    .unwrap_or_else(|| ISSUE_CREATE_FAILED.to_string());
                self.error = Some(message.clone());
                Err(TrackerError::Rejected(message))
            }
        }
    }

    /// Open an edit form seeded from the cached issue and refresh the user
    /// roster.
    pub async fn begin_edit(&mut self, id: IssueId) -> Result<()> {
        let issue = self.issues.issue(id).ok_or(TrackerError::IssueNotFound(id))?;
        let draft = IssueDraft::from_issue(&issue);
        self.mode = FormMode::Editing {
            id,
            pristine: draft.clone(),
        };
        self.draft = draft;
        self.error = None;
        self.users.loading = true;

        let users = Self::fetch_users(self.api.as_ref()).await;
        self.apply_users(users);
        Ok(())
    }

    pub async fn submit_edit(&mut self) -> Result<IssueId> {
        let FormMode::Editing { id, .. } = self.mode else {
            return Err(TrackerError::validation("form", "no edit form is open"));
        };

        let board_id = self
            .issues
            .issue(id)
            .map(|issue| issue.board_id)
            .ok_or(TrackerError::IssueNotFound(id))?;
        let patch = self
            .draft
            .to_patch(&self.users.users, board_id)
            .inspect_err(|e| self.error = Some(e.to_string()))?;

        if self.issues.update_issue(id, &patch).await {
            self.close();
            Ok(id)
        } else {
            let message = self
                .issues
                .update_error()
                .unwrap_or_else(|| ISSUE_UPDATE_FAILED.to_string());
            self.error = Some(message.clone());
            Err(TrackerError::Rejected(message))
        }
    }

    /// Drop unsaved edits. The store is never touched.
    pub fn cancel_edit(&mut self) {
        if let FormMode::Editing { pristine, .. } = &self.mode {
            self.draft = pristine.clone();
        }
        self.close();
    }

    pub fn close(&mut self) {
        self.mode = FormMode::Closed;
        self.error = None;
    }
}
