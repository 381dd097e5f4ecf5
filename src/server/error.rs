use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::db::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("method not allowed")]
    MethodNotAllowed,

    /// A required request field is present but unusable
    #[error("invalid `{field}`: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("unprocessable: {0}")]
    Unprocessable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize, Debug)]
struct ErrorBody {
    success: bool,
    error: u16,
    message: &'static str,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Validation { .. } | ApiError::Unprocessable(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad request",
            ApiError::NotFound(_) => "Not Found",
            ApiError::MethodNotAllowed => "method not allowed",
            ApiError::Validation { .. } | ApiError::Unprocessable(_) => "Unprocessable",
            ApiError::Internal(_) => "Internal Server Error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal(_) => tracing::error!("{self}"),
            _ => tracing::debug!("Client error: {self}"),
        }
        let status = self.status_code();
        let body = ErrorBody {
            success: false,
            error: status.as_u16(),
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            // body parsed, but a field is missing, null or of the wrong type
            JsonRejection::JsonDataError(err) => ApiError::Unprocessable(err.body_text()),
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::NotFound(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Converts persistence failures into the status an endpoint reports for them.
/// Listing endpoints answer 404 for both absence and storage faults, mutating endpoints
/// answer 422. The underlying error is logged either way.
pub trait StoreResultExt<T> {
    fn or_not_found(self) -> Result<T, ApiError>;
    fn or_unprocessable(self) -> Result<T, ApiError>;
}

impl<T, E: Into<StoreError>> StoreResultExt<T> for Result<T, E> {
    fn or_not_found(self) -> Result<T, ApiError> {
        self.map_err(not_found)
    }

    fn or_unprocessable(self) -> Result<T, ApiError> {
        self.map_err(unprocessable)
    }
}

pub fn not_found(err: impl Into<StoreError>) -> ApiError {
    ApiError::NotFound(log_store_error(err.into()).to_string())
}

pub fn unprocessable(err: impl Into<StoreError>) -> ApiError {
    ApiError::Unprocessable(log_store_error(err.into()).to_string())
}

fn log_store_error(err: StoreError) -> StoreError {
    match &err {
        StoreError::NotFound { .. } => tracing::debug!("{err}"),
        StoreError::Storage(source) => tracing::error!("Database error: {source:?}"),
    }
    err
}
