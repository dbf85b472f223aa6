use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::error;

/// Domain errors for task operations. Every variant maps to exactly one HTTP
/// status and one stable machine-readable code on the wire.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Request payload failed validation (missing or empty description).
    #[error("{0}")]
    Validation(String),

    /// No task with the given id exists.
    #[error("no task with id {0}")]
    NotFound(String),

    /// The backing store failed mid-operation.
    #[error(transparent)]
    Store(#[from] sqlx::Error),

    /// The store was never connected (no URL configured, or the startup
    /// connect failed).
    #[error("store is not connected")]
    StoreUnavailable,

    /// No route matched the request path.
    #[error("no route matches {0}")]
    RouteNotFound(String),
}

impl TaskError {
    pub fn status(&self) -> StatusCode {
        match self {
            TaskError::Validation(_) => StatusCode::BAD_REQUEST,
            TaskError::NotFound(_) | TaskError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            TaskError::Store(_) | TaskError::StoreUnavailable => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable code carried in the `error` field of every error body.
    pub fn code(&self) -> &'static str {
        match self {
            TaskError::Validation(_) => "validation_error",
            TaskError::NotFound(_) => "not_found",
            TaskError::Store(_) | TaskError::StoreUnavailable => "store_error",
            TaskError::RouteNotFound(_) => "route_not_found",
        }
    }

    /// Convert into the `(status, body)` pair handlers return.
    ///
    /// Store failures are logged here with full detail; the response body
    /// stays generic unless `debug_errors` is set. Client errors (400/404)
    /// always carry their message since it describes the caller's mistake,
    /// not our internals.
    pub fn into_http(self, debug_errors: bool) -> (StatusCode, Json<Value>) {
        let status = self.status();
        let code = self.code();
        let body = match &self {
            TaskError::Store(_) | TaskError::StoreUnavailable => {
                error!(err = %self, "store operation failed");
                if debug_errors {
                    json!({ "error": code, "message": self.to_string() })
                } else {
                    json!({ "error": code, "message": "internal server error" })
                }
            }
            _ => json!({ "error": code, "message": self.to_string() }),
        };
        (status, Json(body))
    }
}
