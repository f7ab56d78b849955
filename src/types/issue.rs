use std::fmt;

use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use super::Priority;

pub type IssueId = i64;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: IssueId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: IssueStatus,
    pub priority: Priority,
    pub board_id: i64,
    #[serde(default)]
    pub board_name: String,
    pub assignee: Assignee,
}

/// Snapshot of the user an issue was assigned to when it was fetched.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Assignee {
    pub id: i64,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub avatar_url: String,
}

impl Assignee {
    /// Placeholder for an assignee known only by id.
    pub fn unresolved(id: i64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            "-"
        } else {
            &self.full_name
        }
    }
}

/// Workflow status. Each value is also a board lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum, Serialize, Deserialize)]
pub enum IssueStatus {
    Backlog,
    InProgress,
    Done,
}

impl IssueStatus {
    /// Lane order on a board.
    pub const ALL: [IssueStatus; 3] = [IssueStatus::Backlog, IssueStatus::InProgress, IssueStatus::Done];

    pub fn label(self) -> &'static str {
        match self {
            IssueStatus::Backlog => "Backlog",
            IssueStatus::InProgress => "In Progress",
            IssueStatus::Done => "Done",
        }
    }

    pub fn colored(self) -> String {
        let label = self.label();
        match self {
            IssueStatus::Backlog => label.bright_black().to_string(),
            IssueStatus::InProgress => label.blue().to_string(),
            IssueStatus::Done => label.green().to_string(),
        }
    }

    pub fn lane_index(self) -> usize {
        match self {
            IssueStatus::Backlog => 0,
            IssueStatus::InProgress => 1,
            IssueStatus::Done => 2,
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
