//! API error types

use reqwest::StatusCode;
use thiserror::Error;

/// The single failure kind of the remote endpoints. Transport errors,
/// non-2xx statuses and undecodable bodies all land here.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    /// HTTP status when the server answered at all
    pub status: Option<StatusCode>,
}

impl ApiError {
    pub fn request_failed(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::RequestFailed,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        let error = ApiError::request_failed(err.to_string());
        match err.status() {
            Some(status) => error.with_status(status),
            None => error,
        }
    }
}

/// Error classification. There is exactly one: callers never retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    RequestFailed,
}
