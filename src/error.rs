//! Error types for the service and HTTP layers.
//!
//! Errors are classified by who can fix them:
//! - Caller: `Validation`, `NotFound`, `Conflict` (message returned verbatim)
//! - Server: `TypeTransition`, `Database`, `Internal` (detail logged, generic body)

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::db::DbError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    /// A company-type change failed after its transaction began.
    #[error("Company type change failed; no changes were applied: {0}")]
    TypeTransition(String),

    #[error("Database error: {0}")]
    Database(DbError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        if err.is_unique_violation() {
            ServiceError::Conflict("Record already exists".to_string())
        } else {
            ServiceError::Database(err)
        }
    }
}

impl ServiceError {
    pub fn not_found(what: &str, id: i64) -> Self {
        ServiceError::NotFound(format!("{what} {id} not found"))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::TypeTransition(_)
            | ServiceError::Database(_)
            | ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand to an API client.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::NotFound(msg)
            | ServiceError::Validation(msg)
            | ServiceError::Conflict(msg) => msg.clone(),
            ServiceError::TypeTransition(_) => {
                "Failed to change company type; no changes were applied".to_string()
            }
            ServiceError::Database(_) | ServiceError::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{self}");
        }
        let body = ErrorBody {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}
