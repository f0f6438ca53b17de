//! Request-level errors and their HTTP status mapping.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use snowfinder_core::SearchError;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Invalid client input; never reaches storage.
    #[error("{0}")]
    BadRequest(String),

    /// The requested resort does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A storage call exceeded its bounded wait and was cancelled.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// A storage call failed.
    #[error("{0}")]
    Storage(#[from] StoreError),
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::BadRequest(msg) => log::warn!("[snowfinder] rejected request: {}", msg),
            ApiError::NotFound(msg) => log::info!("[snowfinder] not found: {}", msg),
            ApiError::Timeout { .. } | ApiError::Storage(_) => {
                log::error!("[snowfinder] request failed: {}", self)
            }
        }
        (self.status(), self.to_string()).into_response()
    }
}
