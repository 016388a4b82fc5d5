//! Error taxonomy and HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::domain::order::OrderStatus;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing resource, or one the caller is not allowed to know exists.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Malformed or out-of-range request data.
    #[error("{0}")]
    InvalidInput(String),

    /// The operation is not valid in the entity's current state.
    #[error("{0}")]
    InvalidState(&'static str),

    /// Illegal or stale order-status change.
    #[error("cannot transition order from '{from}' to '{to}'")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Lost-update detection on a concurrent write; the caller should retry.
    #[error("concurrent modification detected, retry the request")]
    Conflict,

    /// No usable identity on the request.
    #[error("missing or invalid identity")]
    Unauthorized,

    /// Identity present but lacks the administrative capability.
    #[error("administrator privilege required")]
    Forbidden,

    /// The persistence layer failed.
    #[error("storage failure")]
    Storage(#[source] StoreError),
}

impl Error {
    /// Stable machine-readable kind, kept separate from the human message.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "not_found",
            Error::InvalidInput(_) => "invalid_input",
            Error::InvalidState(_) => "invalid_state",
            Error::InvalidTransition { .. } => "invalid_transition",
            Error::Conflict => "conflict",
            Error::Unauthorized => "unauthorized",
            Error::Forbidden => "forbidden",
            Error::Storage(_) => "storage_failure",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidInput(_) | Error::InvalidState(_) | Error::InvalidTransition { .. } => {
                StatusCode::BAD_REQUEST
            }
            Error::Conflict => StatusCode::CONFLICT,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::VersionConflict => Error::Conflict,
            other => Error::Storage(other),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if let Error::Storage(ref source) = self {
            tracing::error!(error = %source, "storage failure");
        }
        let body = serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
