use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use super::{Collection, BOARDS_LOAD_FAILED};
use crate::client::TrackerApi;
use crate::types::{Board, BoardName};

#[derive(Debug, Clone, Default)]
pub struct BoardsState {
    pub list: Collection<Board>,
}

impl BoardsState {
    pub fn boards(&self) -> &[Board] {
        self.list.items()
    }

    pub fn loading(&self) -> bool {
        self.list.loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.list.error()
    }

    pub fn board(&self, id: i64) -> Option<&Board> {
        self.boards().iter().find(|b| b.id == id)
    }

    /// Resolve a board name. A board that is not loaded yet is reported as
    /// unknown instead of failing.
    pub fn board_name(&self, id: i64) -> BoardName {
        self.board(id)
            .map(|b| BoardName::Known(b.name.clone()))
            .unwrap_or(BoardName::Unknown(id))
    }
}

/// Read-only cache of the server's boards.
pub struct BoardStore {
    api: Arc<dyn TrackerApi>,
    state: watch::Sender<BoardsState>,
}

impl BoardStore {
    pub fn new(api: Arc<dyn TrackerApi>) -> Self {
        let (state, _) = watch::channel(BoardsState::default());
        Self { api, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<BoardsState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> BoardsState {
        self.state.borrow().clone()
    }

    pub fn boards(&self) -> Vec<Board> {
        self.state.borrow().boards().to_vec()
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading()
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error().map(String::from)
    }

    pub fn board(&self, id: i64) -> Option<Board> {
        self.state.borrow().board(id).cloned()
    }

    pub fn board_name(&self, id: i64) -> BoardName {
        self.state.borrow().board_name(id)
    }

    /// Replace the local boards with a full remote fetch.
    pub async fn fetch_boards(&self) {
        debug!("fetching boards");
        self.state.send_modify(|s| s.list.begin_load());

        let result = self.api.list_boards().await;
        if let Ok(boards) = &result {
            debug!(count = boards.len(), "boards fetched");
        }

        self.state
            .send_modify(|s| s.list.finish_load(result, BOARDS_LOAD_FAILED));
    }

    pub fn dismiss_error(&self) {
        self.state.send_modify(|s| s.list.dismiss_error());
    }
}
