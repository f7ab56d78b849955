//! Filtered and grouped views over the issue collection.
//!
//! The views are derived on every read from the current issues and criteria
//! and are never stored, so they cannot drift from their inputs. The only
//! state kept here is the criteria and the resolved assignee scope, which
//! comes from the server instead of the embedded assignee snapshot.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::client::TrackerApi;
use crate::types::{Issue, IssueId, IssueStatus};

pub const ASSIGNEE_LOOKUP_FAILED: &str = "Failed to load the assignee's issues";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    pub status: Option<IssueStatus>,
    pub board_id: Option<i64>,
    pub title_query: String,
    pub assignee_id: Option<i64>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Issue ids assigned to the selected assignee, as known so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AssigneeScope {
    /// No assignee selected.
    #[default]
    Any,
    /// Lookup in flight; the assignee filter is not applied yet.
    Pending(i64),
    Resolved {
        assignee_id: i64,
        issue_ids: HashSet<IssueId>,
    },
    /// Lookup failed; the assignee filter is not applied.
    Unavailable(i64),
}

impl AssigneeScope {
    fn admits(&self, assignee_id: i64, issue: &Issue) -> bool {
        match self {
            AssigneeScope::Resolved {
                assignee_id: resolved,
                issue_ids,
            } if *resolved == assignee_id => issue_ids.contains(&issue.id),
            _ => true,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, AssigneeScope::Pending(_))
    }
}

fn matches(issue: &Issue, criteria: &FilterCriteria, query: &str, scope: &AssigneeScope) -> bool {
    if criteria.status.is_some_and(|s| s != issue.status) {
        return false;
    }
    if criteria.board_id.is_some_and(|b| b != issue.board_id) {
        return false;
    }
    if !query.is_empty() && !issue.title.to_lowercase().contains(query) {
        return false;
    }
    match criteria.assignee_id {
        Some(assignee_id) => scope.admits(assignee_id, issue),
        None => true,
    }
}

/// Apply `criteria` to `issues`, keeping collection order.
pub fn filter_issues(
    issues: &[Issue],
    criteria: &FilterCriteria,
    scope: &AssigneeScope,
) -> Vec<Issue> {
    let query = criteria.title_query.to_lowercase();
    issues
        .iter()
        .filter(|issue| matches(issue, criteria, &query, scope))
        .cloned()
        .collect()
}

/// Issues split into the status lanes of a board, each in collection order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Lanes {
    lanes: [Vec<Issue>; 3],
}

impl Lanes {
    pub fn lane(&self, status: IssueStatus) -> &[Issue] {
        &self.lanes[status.lane_index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (IssueStatus, &[Issue])> + '_ {
        IssueStatus::ALL
            .into_iter()
            .map(move |status| (status, self.lane(status)))
    }

    pub fn find(&self, id: IssueId) -> Option<&Issue> {
        self.lanes.iter().flatten().find(|i| i.id == id)
    }

    pub fn len(&self) -> usize {
        self.lanes.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn group_by_status(issues: &[Issue]) -> Lanes {
    let mut lanes = Lanes::default();
    for issue in issues {
        lanes.lanes[issue.status.lane_index()].push(issue.clone());
    }
    lanes
}

#[derive(Debug, Clone, Default)]
pub struct FilterState {
    pub criteria: FilterCriteria,
    pub scope: AssigneeScope,
    pub error: Option<String>,
    generation: u64,
}

impl FilterState {
    pub fn apply(&self, issues: &[Issue]) -> Vec<Issue> {
        filter_issues(issues, &self.criteria, &self.scope)
    }
}

/// Active filter criteria plus the server-side assignee lookup they need.
pub struct IssueFilter {
    api: Arc<dyn TrackerApi>,
    state: watch::Sender<FilterState>,
}

impl IssueFilter {
    pub fn new(api: Arc<dyn TrackerApi>) -> Self {
        let (state, _) = watch::channel(FilterState::default());
        Self { api, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<FilterState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> FilterState {
        self.state.borrow().clone()
    }

    pub fn criteria(&self) -> FilterCriteria {
        self.state.borrow().criteria.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn apply(&self, issues: &[Issue]) -> Vec<Issue> {
        self.state.borrow().apply(issues)
    }

    /// Replace the criteria. A changed assignee drops the previous lookup and
    /// resolves the new one; until it completes the view is not filtered by
    /// assignee. A lookup that completes after the assignee changed again is
    /// discarded.
    pub async fn set_filter(&self, criteria: FilterCriteria) {
        let mut lookup = None;
        self.state.send_modify(|s| {
            if s.criteria.assignee_id != criteria.assignee_id {
                s.generation += 1;
                s.error = None;
                s.scope = match criteria.assignee_id {
                    Some(id) => {
                        lookup = Some((id, s.generation));
                        AssigneeScope::Pending(id)
                    }
                    None => AssigneeScope::Any,
                };
            }
            s.criteria = criteria;
        });

        if let Some((assignee_id, generation)) = lookup {
            self.resolve_assignee(assignee_id, generation).await;
        }
    }

    /// Re-run the lookup for the current assignee, e.g. after reassignments.
    pub async fn refresh_assignee(&self) {
        let mut lookup = None;
        self.state.send_modify(|s| {
            if let Some(id) = s.criteria.assignee_id {
                s.generation += 1;
                lookup = Some((id, s.generation));
            }
        });

        if let Some((assignee_id, generation)) = lookup {
            self.resolve_assignee(assignee_id, generation).await;
        }
    }

    async fn resolve_assignee(&self, assignee_id: i64, generation: u64) {
        debug!(assignee_id, "resolving assignee issues");
        let result = self.api.get_user_issue_ids(assignee_id).await;

        self.state.send_modify(|s| {
            if s.generation != generation {
                debug!(assignee_id, "discarding stale assignee lookup");
                return;
            }
            match result {
                Ok(ids) => {
                    s.scope = AssigneeScope::Resolved {
                        assignee_id,
                        issue_ids: ids.into_iter().collect(),
                    };
                    s.error = None;
                }
                Err(e) => {
                    warn!(kind = %e.kind(), error = %e, assignee_id, "{ASSIGNEE_LOOKUP_FAILED}");
                    s.scope = AssigneeScope::Unavailable(assignee_id);
                    s.error = Some(ASSIGNEE_LOOKUP_FAILED.to_string());
                }
            }
        });
    }
}
