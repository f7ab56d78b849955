mod board;
mod input;
mod issue;
mod priority;
mod user;

pub use board::{Board, BoardName};
pub use input::{CreatedIssue, IssuePatch, NewIssue, UpdateAck};
pub use issue::{Assignee, Issue, IssueId, IssueStatus};
pub use priority::Priority;
pub use user::User;
