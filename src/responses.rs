//! Shared REST response envelopes.

use serde::Deserialize;

/// Most endpoints wrap their payload as `{ "data": ... }`.
#[derive(Deserialize)]
pub struct DataEnvelope<T> {
    pub data: Option<T>,
}

/// Error body returned with non-2xx statuses.
#[derive(Deserialize, Default)]
pub struct ServerError {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub message: String,
}

impl ServerError {
    pub fn into_message(self) -> String {
        match (self.error.is_empty(), self.message.is_empty()) {
            (_, false) => self.message,
            (false, true) => self.error,
            (true, true) => "<empty error body>".to_string(),
        }
    }
}

/// Answer to `POST /tasks/create`.
#[derive(Deserialize)]
pub struct CreatedIssueBody {
    pub id: i64,
}

/// Answer to `PUT /tasks/update/{id}`.
#[derive(Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub message: String,
}

/// Minimal task reference returned by `GET /users/{id}/tasks`.
#[derive(Deserialize)]
pub struct TaskRef {
    pub id: i64,
}
