//! Mapping of request and pooling failures onto HTTP responses.
//!
//! # Design Decisions
//! - Every rejection the service produces is an [`ApiError`]
//! - Client mistakes are 4xx with a short plain-text reason
//! - Unknown groups answer 404 with an empty body

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::pooling::PoolingError;

/// Errors returned by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Body Required")]
    EmptyBody,

    #[error("Content-Type must be \"{0}\"")]
    ContentType(&'static str),

    /// JSON body could not be decoded or failed field validation.
    #[error("Bad Input(JSON) format, {0}")]
    BadJson(String),

    #[error("Multiple values detected, the only valid input is 1 \"ID=X\"")]
    FormMultipleKeys,

    #[error("Invalid key detected, the only valid input is 1 \"ID=X\"")]
    FormInvalidKey,

    #[error("Only one ID is allowed, and it must be an int")]
    FormMultipleIds,

    #[error("ID must be a positive int")]
    FormInvalidId,

    #[error(transparent)]
    Pooling(#[from] PoolingError),

    #[error("Service is shutting down")]
    Unavailable,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Pooling(PoolingError::GroupNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Pooling(PoolingError::DuplicateGroup(_)) => StatusCode::CONFLICT,
            ApiError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Text sent back to the client.
    pub fn body(&self) -> String {
        match self {
            ApiError::Pooling(PoolingError::GroupNotFound(_)) => String::new(),
            ApiError::Pooling(PoolingError::DuplicateGroup(_)) => {
                "Error, group Id already exists".to_string()
            }
            ApiError::Pooling(PoolingError::DuplicateCar(_)) => {
                "Bad Input(JSON) format, cars Ids must be unique".to_string()
            }
            ApiError::Pooling(e) => format!("Bad Input(JSON) format, {e}"),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "Request rejected");
        }
        (status, self.body()).into_response()
    }
}
