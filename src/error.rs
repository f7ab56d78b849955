use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Empty response from API")]
    EmptyResponse,

    #[error("Failed to read config file at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Issue not found: {0}")]
    IssueNotFound(i64),

    #[error("Board not found: {0}")]
    BoardNotFound(i64),

    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("{0}")]
    Rejected(String),
}

impl TrackerError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        TrackerError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Classify the error for store-level handling.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrackerError::ApiError { status: 404, .. }
            | TrackerError::IssueNotFound(_)
            | TrackerError::BoardNotFound(_) => ErrorKind::NotFound,
            TrackerError::ApiError { .. }
            | TrackerError::EmptyResponse
            | TrackerError::Rejected(_) => ErrorKind::ServerRejection,
            TrackerError::Http(e) if e.is_decode() => ErrorKind::ServerRejection,
            TrackerError::Validation { .. }
            | TrackerError::InvalidUrl(_)
            | TrackerError::ConfigParse { .. } => ErrorKind::ValidationFailure,
            TrackerError::Http(_)
            | TrackerError::Io(_)
            | TrackerError::ConfigRead { .. }
            | TrackerError::NoConfigDir => ErrorKind::NetworkFailure,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport unreachable or the request never completed.
    NetworkFailure,
    /// Non-2xx answer carrying a server message.
    ServerRejection,
    /// Client-side check failed before any call was made.
    ValidationFailure,
    /// Referenced entity is absent.
    NotFound,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::NetworkFailure => "network failure",
            ErrorKind::ServerRejection => "server rejection",
            ErrorKind::ValidationFailure => "validation failure",
            ErrorKind::NotFound => "not found",
        };
        f.write_str(label)
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
