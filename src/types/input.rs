use serde::Serialize;

use super::{Assignee, Issue, IssueId, IssueStatus, Priority};

/// Payload for creating an issue. The server puts new issues in the backlog.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub assignee_id: i64,
    pub board_id: i64,
}

/// Full replacement of the mutable fields of an existing issue.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IssuePatch {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: IssueStatus,
    pub assignee_id: i64,
}

impl IssuePatch {
    /// Patch that reproduces the current mutable fields of `issue`.
    pub fn from_issue(issue: &Issue) -> Self {
        Self {
            title: issue.title.clone(),
            description: issue.description.clone(),
            priority: issue.priority,
            status: issue.status,
            assignee_id: issue.assignee.id,
        }
    }

    pub fn with_status(mut self, status: IssueStatus) -> Self {
        self.status = status;
        self
    }

    /// Merge onto `issue` field by field. Board fields are not part of the
    /// patch and stay as fetched. The assignee snapshot is kept when the id is
    /// unchanged; otherwise only the id is known locally.
    pub fn apply_to(&self, issue: &mut Issue) {
        issue.title.clone_from(&self.title);
        issue.description.clone_from(&self.description);
        issue.priority = self.priority;
        issue.status = self.status;
        if issue.assignee.id != self.assignee_id {
            issue.assignee = Assignee::unresolved(self.assignee_id);
        }
    }

    pub fn changes_assignee(&self, issue: &Issue) -> bool {
        issue.assignee.id != self.assignee_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedIssue {
    pub id: IssueId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateAck {
    pub message: String,
}
