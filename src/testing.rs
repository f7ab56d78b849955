//! In-memory `TrackerApi` used by the unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::client::TrackerApi;
use crate::error::{Result, TrackerError};
use crate::types::{
    Assignee, Board, CreatedIssue, Issue, IssueId, IssuePatch, IssueStatus, NewIssue, Priority,
    UpdateAck, User,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ListBoards,
    ListIssues,
    GetIssue,
    ListUsers,
    UserIssues,
    Create,
    Update,
}

#[derive(Default)]
struct FakeState {
    boards: Vec<Board>,
    issues: Vec<Issue>,
    users: Vec<User>,
    user_tasks: HashMap<i64, Vec<IssueId>>,
    next_id: IssueId,
    failing: HashSet<Op>,
    gates: HashMap<Op, VecDeque<Arc<Notify>>>,
    calls: Vec<Op>,
    updates: Vec<(IssueId, IssuePatch)>,
    creates: Vec<NewIssue>,
}

pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                next_id: 100,
                ..FakeState::default()
            }),
        }
    }

    pub fn with_boards(self, boards: Vec<Board>) -> Self {
        self.state.lock().unwrap().boards = boards;
        self
    }

    pub fn with_issues(self, issues: Vec<Issue>) -> Self {
        self.state.lock().unwrap().issues = issues;
        self
    }

    pub fn with_users(self, users: Vec<User>) -> Self {
        self.state.lock().unwrap().users = users;
        self
    }

    pub fn with_user_tasks(self, user_id: i64, ids: Vec<IssueId>) -> Self {
        self.state.lock().unwrap().user_tasks.insert(user_id, ids);
        self
    }

    pub fn with_next_id(self, id: IssueId) -> Self {
        self.state.lock().unwrap().next_id = id;
        self
    }

    pub fn set_issues(&self, issues: Vec<Issue>) {
        self.state.lock().unwrap().issues = issues;
    }

    pub fn set_boards(&self, boards: Vec<Board>) {
        self.state.lock().unwrap().boards = boards;
    }

    pub fn fail(&self, op: Op) {
        self.state.lock().unwrap().failing.insert(op);
    }

    pub fn recover(&self, op: Op) {
        self.state.lock().unwrap().failing.remove(&op);
    }

    /// Hold the next call of `op` until the returned handle is notified.
    /// The call reads server state before it starts waiting.
    pub fn gate(&self, op: Op) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.state
            .lock()
            .unwrap()
            .gates
            .entry(op)
            .or_default()
            .push_back(notify.clone());
        notify
    }

    pub fn call_count(&self, op: Op) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| **c == op)
            .count()
    }

    pub fn updates(&self) -> Vec<(IssueId, IssuePatch)> {
        self.state.lock().unwrap().updates.clone()
    }

    pub fn creates(&self) -> Vec<NewIssue> {
        self.state.lock().unwrap().creates.clone()
    }

    /// Record the call, then either fail it or compute its answer.
    fn begin<T>(
        &self,
        op: Op,
        answer: impl FnOnce(&mut FakeState) -> Result<T>,
    ) -> (Option<Arc<Notify>>, Result<T>) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(op);
        let gate = state.gates.get_mut(&op).and_then(VecDeque::pop_front);
        let result = if state.failing.contains(&op) {
            Err(TrackerError::ApiError {
                status: 500,
                message: format!("{op:?} failed"),
            })
        } else {
            answer(&mut state)
        };
        (gate, result)
    }

    async fn run<T>(&self, op: Op, answer: impl FnOnce(&mut FakeState) -> Result<T>) -> Result<T> {
        let (gate, result) = self.begin(op, answer);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        result
    }
}

#[async_trait]
impl TrackerApi for FakeApi {
    async fn list_boards(&self) -> Result<Vec<Board>> {
        self.run(Op::ListBoards, |s| Ok(s.boards.clone())).await
    }

    async fn list_issues(&self) -> Result<Vec<Issue>> {
        self.run(Op::ListIssues, |s| Ok(s.issues.clone())).await
    }

    async fn get_issue(&self, id: IssueId) -> Result<Issue> {
        self.run(Op::GetIssue, |s| {
            s.issues
                .iter()
                .find(|i| i.id == id)
                .cloned()
                .ok_or(TrackerError::IssueNotFound(id))
        })
        .await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.run(Op::ListUsers, |s| Ok(s.users.clone())).await
    }

    async fn get_user_issue_ids(&self, user_id: i64) -> Result<Vec<IssueId>> {
        self.run(Op::UserIssues, |s| {
            Ok(s.user_tasks.get(&user_id).cloned().unwrap_or_default())
        })
        .await
    }

    async fn create_issue(&self, input: &NewIssue) -> Result<CreatedIssue> {
        self.run(Op::Create, |s| {
            let id = s.next_id;
            s.next_id += 1;
            let board_name = s
                .boards
                .iter()
                .find(|b| b.id == input.board_id)
                .map(|b| b.name.clone())
                .unwrap_or_default();
            let assignee = s
                .users
                .iter()
                .find(|u| u.id == input.assignee_id)
                .map(|u| Assignee {
                    id: u.id,
                    full_name: u.full_name.clone(),
                    email: u.email.clone(),
                    avatar_url: u.avatar_url.clone(),
                })
                .unwrap_or_else(|| Assignee::unresolved(input.assignee_id));
            s.issues.push(Issue {
                id,
                title: input.title.clone(),
                description: input.description.clone(),
                status: IssueStatus::Backlog,
                priority: input.priority,
                board_id: input.board_id,
                board_name,
                assignee,
            });
            s.creates.push(input.clone());
            Ok(CreatedIssue { id })
        })
        .await
    }

    async fn update_issue(&self, id: IssueId, patch: &IssuePatch) -> Result<UpdateAck> {
        self.run(Op::Update, |s| {
            let issue = s
                .issues
                .iter_mut()
                .find(|i| i.id == id)
                .ok_or(TrackerError::IssueNotFound(id))?;
            patch.apply_to(issue);
            s.updates.push((id, patch.clone()));
            Ok(UpdateAck {
                message: "updated".to_string(),
            })
        })
        .await
    }
}

pub fn board(id: i64, name: &str) -> Board {
    Board {
        id,
        name: name.to_string(),
        description: format!("{name} board"),
        task_count: 0,
    }
}

pub fn user(id: i64, name: &str) -> User {
    User {
        id,
        full_name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        avatar_url: String::new(),
        description: String::new(),
        tasks_count: 0,
        team_id: None,
        team_name: String::new(),
    }
}

pub fn issue(id: IssueId, title: &str, status: IssueStatus, board_id: i64) -> Issue {
    Issue {
        id,
        title: title.to_string(),
        description: format!("{title} description"),
        status,
        priority: Priority::Medium,
        board_id,
        board_name: format!("Board {board_id}"),
        assignee: Assignee {
            id: 5,
            full_name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            avatar_url: String::new(),
        },
    }
}
