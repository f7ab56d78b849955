use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use super::{
    Collection, MutationState, Selection, ISSUES_LOAD_FAILED, ISSUE_CREATE_FAILED,
    ISSUE_UPDATE_FAILED,
};
use crate::client::TrackerApi;
use crate::error::Result;
use crate::types::{Issue, IssueId, IssuePatch, NewIssue};

#[derive(Debug, Clone, Default)]
pub struct IssuesState {
    pub list: Collection<Issue>,
    pub selection: Selection,
    pub create: MutationState,
    pub update: MutationState,
}

impl IssuesState {
    pub fn issues(&self) -> &[Issue] {
        self.list.items()
    }

    pub fn issue(&self, id: IssueId) -> Option<&Issue> {
        self.issues().iter().find(|i| i.id == id)
    }

    /// The issue behind the open dialog, if it is loaded.
    pub fn selected_issue(&self) -> Option<&Issue> {
        self.selection.open_issue_id().and_then(|id| self.issue(id))
    }

    pub fn is_edit_mode(&self) -> bool {
        self.selection.is_edit_mode()
    }

    pub fn issues_for_board(&self, board_id: i64) -> Vec<Issue> {
        self.issues()
            .iter()
            .filter(|i| i.board_id == board_id)
            .cloned()
            .collect()
    }
}

/// Local issue collection plus the dialog selection that indexes into it.
///
/// Writes reconcile differently: a create re-fetches the whole collection
/// (the server fills in `boardName` and the assignee snapshot), while an
/// update patches the cached issue in place once the server accepted it.
///
/// Nothing here orders concurrent operations. Overlapping fetches each replace
/// the whole collection, so the last one to complete wins. Two updates of the
/// same issue are applied in completion order, so the later response wins even
/// if it was sent first. A fetch and an update racing on one issue resolve
/// the same way. Callers that need ordering await one operation before
/// starting the next.
pub struct IssueStore {
    api: Arc<dyn TrackerApi>,
    state: watch::Sender<IssuesState>,
}

impl IssueStore {
    pub fn new(api: Arc<dyn TrackerApi>) -> Self {
        let (state, _) = watch::channel(IssuesState::default());
        Self { api, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<IssuesState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> IssuesState {
        self.state.borrow().clone()
    }

    pub fn issues(&self) -> Vec<Issue> {
        self.state.borrow().issues().to_vec()
    }

    pub fn issue(&self, id: IssueId) -> Option<Issue> {
        self.state.borrow().issue(id).cloned()
    }

    pub fn issues_for_board(&self, board_id: i64) -> Vec<Issue> {
        self.state.borrow().issues_for_board(board_id)
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().list.loading()
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().list.error().map(String::from)
    }

    pub fn create_loading(&self) -> bool {
        self.state.borrow().create.loading()
    }

    pub fn create_error(&self) -> Option<String> {
        self.state.borrow().create.error().map(String::from)
    }

    pub fn update_loading(&self) -> bool {
        self.state.borrow().update.loading()
    }

    pub fn update_error(&self) -> Option<String> {
        self.state.borrow().update.error().map(String::from)
    }

    pub fn dismiss_errors(&self) {
        self.state.send_modify(|s| {
            s.list.dismiss_error();
            s.create.error = None;
            s.update.error = None;
        });
    }

    /// Replace the local issues with a full remote fetch. An open dialog whose
    /// issue is gone afterwards is closed.
    pub async fn fetch_issues(&self) {
        debug!("fetching issues");
        self.state.send_modify(|s| s.list.begin_load());

        let result = self.api.list_issues().await;
        if let Ok(issues) = &result {
            debug!(count = issues.len(), "issues fetched");
        }

        self.state.send_modify(|s| {
            s.list.finish_load(result, ISSUES_LOAD_FAILED);
            let IssuesState {
                list, selection, ..
            } = s;
            selection.retain(|id| list.items().iter().any(|i| i.id == id));
        });
    }

    /// Fetch one issue and upsert it into the collection. Nothing changes
    /// locally when the server has no such issue.
    pub async fn load_issue(&self, id: IssueId) -> Result<Issue> {
        let issue = self.api.get_issue(id).await?;
        self.state.send_modify(|s| {
            let items = s.list.items_mut();
            match items.iter_mut().find(|i| i.id == id) {
                Some(cached) => *cached = issue.clone(),
                None => items.push(issue.clone()),
            }
        });
        Ok(issue)
    }

    /// Create an issue and re-sync the collection. Returns the new id, or
    /// `None` with `create_error` set when the server refused it.
    pub async fn create_issue(&self, input: &NewIssue) -> Option<IssueId> {
        self.state.send_modify(|s| s.create.begin());

        match self.api.create_issue(input).await {
            Ok(created) => {
                info!(id = created.id, board_id = input.board_id, "issue created");
                self.fetch_issues().await;
                self.state.send_modify(|s| s.create.succeed());
                Some(created.id)
            }
            Err(e) => {
                self.state
                    .send_modify(|s| s.create.fail(&e, ISSUE_CREATE_FAILED));
                None
            }
        }
    }

    /// Submit a full patch and, once accepted, merge it into the cached issue.
    /// On failure the collection is left as it was and `update_error` is set.
    ///
    /// A reassignment leaves only the new assignee id known locally, so the
    /// collection is re-fetched to pick up the server's assignee snapshot.
    pub async fn update_issue(&self, id: IssueId, patch: &IssuePatch) -> bool {
        self.state.send_modify(|s| s.update.begin());

        match self.api.update_issue(id, patch).await {
            Ok(ack) => {
                info!(id, status = %patch.status, message = %ack.message, "issue updated");
                let mut reassigned = false;
                self.state.send_modify(|s| {
                    if let Some(issue) = s.list.items_mut().iter_mut().find(|i| i.id == id) {
                        reassigned = patch.changes_assignee(issue);
                        patch.apply_to(issue);
                    }
                    s.update.succeed();
                });
                if reassigned {
                    debug!(id, "assignee changed, re-fetching issues");
                    self.fetch_issues().await;
                }
                true
            }
            Err(e) => {
                self.state
                    .send_modify(|s| s.update.fail(&e, ISSUE_UPDATE_FAILED));
                false
            }
        }
    }

    pub fn selection(&self) -> Selection {
        self.state.borrow().selection
    }

    pub fn selected_issue(&self) -> Option<Issue> {
        self.state.borrow().selected_issue().cloned()
    }

    pub fn is_edit_mode(&self) -> bool {
        self.state.borrow().is_edit_mode()
    }

    pub fn open_dialog(&self, id: IssueId) {
        self.state.send_modify(|s| s.selection.open_view(id));
    }

    pub fn open_edit_dialog(&self, id: IssueId) {
        self.state.send_modify(|s| s.selection.open_edit(id));
    }

    pub fn switch_to_edit(&self) -> bool {
        let mut switched = false;
        self.state
            .send_modify(|s| switched = s.selection.switch_to_edit());
        switched
    }

    pub fn cancel_edit(&self) {
        self.state.send_modify(|s| s.selection.cancel_edit());
    }

    pub fn finish_edit(&self) {
        self.state.send_modify(|s| s.selection.finish_edit());
    }

    pub fn close_dialog(&self) {
        self.state.send_modify(|s| s.selection.close());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{issue, user, FakeApi, Op};
    use crate::types::{Assignee, IssueStatus, Priority};

    fn store_with(api: &Arc<FakeApi>) -> IssueStore {
        IssueStore::new(api.clone())
    }

    fn new_issue() -> NewIssue {
        NewIssue {
            title: "Write docs".to_string(),
            description: "Document the API".to_string(),
            priority: Priority::High,
            assignee_id: 5,
            board_id: 10,
        }
    }

    #[tokio::test]
    async fn test_fetch_and_lookup() {
        let api = Arc::new(FakeApi::new().with_issues(vec![
            issue(1, "Login", IssueStatus::Backlog, 10),
            issue(2, "Logout", IssueStatus::Done, 11),
        ]));
        let store = store_with(&api);
        store.fetch_issues().await;

        assert_eq!(store.issues().len(), 2);
        assert_eq!(store.issue(2).unwrap().title, "Logout");
        assert_eq!(store.issues_for_board(10).len(), 1);
        assert!(store.issue(3).is_none());
    }

    #[tokio::test]
    async fn test_concurrent_fetches_never_mix_responses() {
        let first = vec![
            issue(1, "A", IssueStatus::Backlog, 10),
            issue(2, "B", IssueStatus::Backlog, 10),
        ];
        let second = vec![issue(3, "C", IssueStatus::Done, 11)];
        let api = Arc::new(FakeApi::new().with_issues(first.clone()));
        let store = store_with(&api);
        let mut rx = store.subscribe();

        let gate_first = api.gate(Op::ListIssues);
        let gate_second = api.gate(Op::ListIssues);

        let second_fetch = async {
            // Starts once the first fetch has read its answer.
            while api.call_count(Op::ListIssues) < 1 {
                tokio::task::yield_now().await;
            }
            api.set_issues(second.clone());
            store.fetch_issues().await;
        };
        let release = async {
            while api.call_count(Op::ListIssues) < 2 {
                tokio::task::yield_now().await;
            }
            gate_second.notify_one();
            while store.issues() != second {
                tokio::task::yield_now().await;
            }
            gate_first.notify_one();
        };
        let observe = async {
            let mut seen = Vec::new();
            while rx.changed().await.is_ok() {
                let items = rx.borrow_and_update().issues().to_vec();
                seen.push(items);
                if !rx.borrow().list.loading() {
                    break;
                }
            }
            seen
        };

        let (_, _, _, seen) = tokio::join!(store.fetch_issues(), second_fetch, release, observe);

        for items in seen {
            assert!(
                items.is_empty() || items == first || items == second,
                "observed a mixed collection: {items:?}"
            );
        }
        // The first fetch completed last.
        assert_eq!(store.issues(), first);
        assert!(!store.loading());
    }

    #[tokio::test]
    async fn test_load_issue_upserts_into_collection() {
        let api = Arc::new(FakeApi::new().with_issues(vec![issue(1, "A", IssueStatus::Backlog, 10)]));
        let store = store_with(&api);

        let loaded = store.load_issue(1).await.unwrap();
        assert_eq!(loaded.title, "A");
        assert_eq!(store.issues().len(), 1);

        store.load_issue(1).await.unwrap();
        assert_eq!(store.issues().len(), 1);

        let missing = store.load_issue(9).await.unwrap_err();
        assert_eq!(missing.kind(), crate::error::ErrorKind::NotFound);
        assert_eq!(store.issues().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_issues_and_sets_error() {
        let api = Arc::new(FakeApi::new().with_issues(vec![issue(1, "A", IssueStatus::Backlog, 10)]));
        let store = store_with(&api);
        store.fetch_issues().await;

        api.fail(Op::ListIssues);
        store.fetch_issues().await;

        assert_eq!(store.issues().len(), 1);
        assert_eq!(store.error().as_deref(), Some(ISSUES_LOAD_FAILED));
    }

    #[tokio::test]
    async fn test_create_then_list_contains_new_issue() {
        let api = Arc::new(FakeApi::new().with_next_id(42).with_users(vec![user(5, "Grace")]));
        let store = store_with(&api);

        let id = store.create_issue(&new_issue()).await;

        assert_eq!(id, Some(42));
        let created = store.issue(42).unwrap();
        assert_eq!(created.status, IssueStatus::Backlog);
        assert_eq!(created.assignee.full_name, "Grace");
        assert_eq!(api.call_count(Op::ListIssues), 1);
        assert!(!store.create_loading());
        assert!(store.create_error().is_none());
    }

    #[tokio::test]
    async fn test_failed_create_keeps_list_and_uses_create_error() {
        let api = Arc::new(FakeApi::new().with_issues(vec![issue(1, "A", IssueStatus::Backlog, 10)]));
        let store = store_with(&api);
        store.fetch_issues().await;
        api.fail(Op::Create);

        let id = store.create_issue(&new_issue()).await;

        assert_eq!(id, None);
        assert_eq!(store.create_error().as_deref(), Some(ISSUE_CREATE_FAILED));
        assert!(store.error().is_none());
        assert_eq!(store.issues().len(), 1);
        assert_eq!(api.call_count(Op::ListIssues), 1);
    }

    #[tokio::test]
    async fn test_update_merges_patch_in_place() {
        let mut original = issue(1, "A", IssueStatus::Backlog, 10);
        original.priority = Priority::Low;
        original.assignee = Assignee {
            id: 5,
            full_name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            avatar_url: "https://example.com/g.png".to_string(),
        };
        let api = Arc::new(FakeApi::new().with_issues(vec![
            issue(0, "Z", IssueStatus::Done, 10),
            original.clone(),
        ]));
        let store = store_with(&api);
        store.fetch_issues().await;

        let patch = IssuePatch {
            title: "B".to_string(),
            description: "d".to_string(),
            priority: Priority::Low,
            status: IssueStatus::InProgress,
            assignee_id: 5,
        };
        assert!(store.update_issue(1, &patch).await);

        let issues = store.issues();
        let updated = &issues[1];
        assert_eq!(updated.id, 1);
        assert_eq!(updated.title, "B");
        assert_eq!(updated.description, "d");
        assert_eq!(updated.status, IssueStatus::InProgress);
        assert_eq!(updated.assignee, original.assignee);
        assert_eq!(updated.board_name, original.board_name);
        // No re-fetch for an in-place update.
        assert_eq!(api.call_count(Op::ListIssues), 1);
    }

    #[tokio::test]
    async fn test_update_with_new_assignee_refetches() {
        let api = Arc::new(
            FakeApi::new()
                .with_issues(vec![issue(1, "A", IssueStatus::Backlog, 10)])
                .with_users(vec![user(5, "Grace"), user(8, "Linus")]),
        );
        let store = store_with(&api);
        store.fetch_issues().await;

        let patch = IssuePatch {
            assignee_id: 8,
            ..IssuePatch::from_issue(&store.issue(1).unwrap())
        };
        assert!(store.update_issue(1, &patch).await);

        assert_eq!(api.call_count(Op::ListIssues), 2);
        assert_eq!(store.issue(1).unwrap().assignee.id, 8);
    }

    #[tokio::test]
    async fn test_failed_update_leaves_collection_untouched() {
        let api = Arc::new(FakeApi::new().with_issues(vec![issue(1, "A", IssueStatus::Backlog, 10)]));
        let store = store_with(&api);
        store.fetch_issues().await;
        let before = store.issues();
        api.fail(Op::Update);

        let patch = IssuePatch::from_issue(&before[0]).with_status(IssueStatus::Done);
        assert!(!store.update_issue(1, &patch).await);

        assert_eq!(store.issues(), before);
        assert_eq!(store.update_error().as_deref(), Some(ISSUE_UPDATE_FAILED));
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn test_overlapping_updates_later_completion_wins() {
        let api = Arc::new(FakeApi::new().with_issues(vec![issue(1, "A", IssueStatus::Backlog, 10)]));
        let store = store_with(&api);
        store.fetch_issues().await;
        let base = IssuePatch::from_issue(&store.issue(1).unwrap());

        let gate_first = api.gate(Op::Update);
        let to_progress = base.clone().with_status(IssueStatus::InProgress);
        let to_done = base.with_status(IssueStatus::Done);

        let later_request = async {
            while api.call_count(Op::Update) < 1 {
                tokio::task::yield_now().await;
            }
            store.update_issue(1, &to_done).await
        };
        let release = async {
            while store.issue(1).map(|i| i.status) != Some(IssueStatus::Done) {
                tokio::task::yield_now().await;
            }
            gate_first.notify_one();
        };
        let (first_ok, second_ok, _) =
            tokio::join!(store.update_issue(1, &to_progress), later_request, release);
        assert!(first_ok && second_ok);

        // The InProgress request was sent first but completed last.
        assert_eq!(store.issue(1).unwrap().status, IssueStatus::InProgress);
        assert!(!store.update_loading());
    }

    #[tokio::test]
    async fn test_refetch_closes_dialog_of_removed_issue() {
        let api = Arc::new(FakeApi::new().with_issues(vec![
            issue(1, "A", IssueStatus::Backlog, 10),
            issue(2, "B", IssueStatus::Backlog, 10),
        ]));
        let store = store_with(&api);
        store.fetch_issues().await;

        store.open_edit_dialog(2);
        assert_eq!(store.selected_issue().unwrap().id, 2);
        assert!(store.is_edit_mode());

        api.set_issues(vec![issue(1, "A", IssueStatus::Backlog, 10)]);
        store.fetch_issues().await;

        assert_eq!(store.selection(), Selection::Closed);
        assert!(store.selected_issue().is_none());
    }

    #[tokio::test]
    async fn test_dialog_transitions() {
        let api = Arc::new(FakeApi::new().with_issues(vec![issue(1, "A", IssueStatus::Backlog, 10)]));
        let store = store_with(&api);
        store.fetch_issues().await;

        store.open_dialog(1);
        assert!(!store.is_edit_mode());
        assert!(store.switch_to_edit());
        assert!(store.is_edit_mode());
        store.cancel_edit();
        assert_eq!(store.selection(), Selection::Viewing(1));
        store.close_dialog();
        assert_eq!(store.selection(), Selection::Closed);
    }
}
