use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Result, TrackerError};
use crate::responses::{CreatedIssueBody, DataEnvelope, MessageBody, ServerError, TaskRef};
use crate::types::{Board, CreatedIssue, Issue, IssueId, IssuePatch, NewIssue, UpdateAck, User};

/// Remote issue/board/user service consumed by the stores.
///
/// Implementations signal failures through `Err`; the stores are responsible
/// for absorbing them.
#[async_trait]
pub trait TrackerApi: Send + Sync {
    async fn list_boards(&self) -> Result<Vec<Board>>;

    async fn list_issues(&self) -> Result<Vec<Issue>>;

    async fn get_issue(&self, id: IssueId) -> Result<Issue>;

    async fn list_users(&self) -> Result<Vec<User>>;

    /// Ids of the issues currently assigned to `user_id`, in server order.
    async fn get_user_issue_ids(&self, user_id: i64) -> Result<Vec<IssueId>>;

    async fn create_issue(&self, input: &NewIssue) -> Result<CreatedIssue>;

    async fn update_issue(&self, id: IssueId, patch: &IssuePatch) -> Result<UpdateAck>;
}

pub struct HttpTrackerClient {
    http: Client,
    base_url: Url,
}

impl HttpTrackerClient {
    pub fn new(base_url: Url, timeout: std::time::Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| TrackerError::InvalidUrl(format!("{path}: {e}")))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ServerError>(&body)
                .map(ServerError::into_message)
                .unwrap_or(body);
            warn!(status = status.as_u16(), %message, "API request rejected");
            return Err(TrackerError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");
        let envelope: DataEnvelope<T> = self.send(self.http.get(url)).await?;
        envelope.data.ok_or(TrackerError::EmptyResponse)
    }
}

#[async_trait]
impl TrackerApi for HttpTrackerClient {
    async fn list_boards(&self) -> Result<Vec<Board>> {
        // Unlike the other collections, boards are not wrapped in `data`.
        let url = self.endpoint("boards")?;
        debug!(%url, "GET");
        self.send(self.http.get(url)).await
    }

    async fn list_issues(&self) -> Result<Vec<Issue>> {
        self.get_data("tasks").await
    }

    async fn get_issue(&self, id: IssueId) -> Result<Issue> {
        match self.get_data(&format!("tasks/{id}")).await {
            Err(TrackerError::ApiError { status: 404, .. }) => Err(TrackerError::IssueNotFound(id)),
            other => other,
        }
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.get_data("users").await
    }

    async fn get_user_issue_ids(&self, user_id: i64) -> Result<Vec<IssueId>> {
        let tasks: Vec<TaskRef> = self.get_data(&format!("users/{user_id}/tasks")).await?;
        Ok(tasks.into_iter().map(|t| t.id).collect())
    }

    async fn create_issue(&self, input: &NewIssue) -> Result<CreatedIssue> {
        let url = self.endpoint("tasks/create")?;
        debug!(%url, title = %input.title, "POST");
        let envelope: DataEnvelope<CreatedIssueBody> =
            self.send(self.http.post(url).json(input)).await?;
        let body = envelope.data.ok_or(TrackerError::EmptyResponse)?;
        Ok(CreatedIssue { id: body.id })
    }

    async fn update_issue(&self, id: IssueId, patch: &IssuePatch) -> Result<UpdateAck> {
        let url = self.endpoint(&format!("tasks/update/{id}"))?;
        debug!(%url, "PUT");
        let envelope: DataEnvelope<MessageBody> = match self.send(self.http.put(url).json(patch)).await {
            Err(TrackerError::ApiError { status: 404, .. }) => return Err(TrackerError::IssueNotFound(id)),
            other => other?,
        };
        let body = envelope.data.ok_or(TrackerError::EmptyResponse)?;
        Ok(UpdateAck {
            message: body.message,
        })
    }
}
