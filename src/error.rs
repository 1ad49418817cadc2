use axum::{
    Json,
    extract::{
        multipart::MultipartError,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::storage::StorageError;

/// RepoError
///
/// Failure raised by a `Repository` implementation.
#[derive(Debug, Error)]
pub enum RepoError {
    /// A unique column (slug, setting key) already holds the submitted value.
    #[error("{0} already exists")]
    Duplicate(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// ApiError
///
/// Every failure a handler can answer with. Maps onto the `{ "error": message }`
/// envelope and the matching HTTP status.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required field is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// No valid session: missing, malformed or expired token, or unknown profile.
    #[error("unauthorized")]
    Unauthorized,

    /// The session is valid but its role may not perform the action.
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Repository(#[from] RepoError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// ErrorBody
///
/// The JSON error envelope returned to callers.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Repository(RepoError::Duplicate(_)) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Repository(RepoError::Database(_)) | Self::Storage(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::Validation(err.body_text())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Internal surface: backend messages are logged and returned unredacted.
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
pub type RepoResult<T> = Result<T, RepoError>;
