//! Client-side state for a board and issue tracker: reactive stores for
//! boards and issues, the issue dialog state machine, filtering, the
//! create/edit workflow and drag-and-drop between status lanes.

pub mod app;
pub mod client;
pub mod config;
pub mod drag;
pub mod error;
pub mod filter;
pub mod logging;
pub mod responses;
pub mod store;
pub mod types;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use app::Tracker;
pub use client::{HttpTrackerClient, TrackerApi};
pub use error::{ErrorKind, Result, TrackerError};
