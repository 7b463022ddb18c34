//! HTTP-facing error type.
//!
//! Every error response carries `{"error": "<message>"}`. Store failure
//! details are logged here and replaced by a generic message on the wire.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::repo::RepoError;
use crate::store::StoreError;

pub const CANNOT_PARSE_ID: &str = "cannot parse id";
pub const CANNOT_PARSE_JSON: &str = "cannot parse json";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("todo not found")]
    NotFound,

    #[error("route not found")]
    RouteNotFound,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("store timed out")]
    Timeout,

    #[error("store unavailable")]
    StoreUnavailable,

    #[error("internal store error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(_) => ApiError::NotFound,
            RepoError::Validation(message) => ApiError::BadRequest(message),
            RepoError::Timeout(_) => ApiError::Timeout,
            RepoError::Store(err) => {
                error!(event = "store_error", error = %err);
                match err {
                    StoreError::Unavailable(_) => ApiError::StoreUnavailable,
                    _ => ApiError::Internal,
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
