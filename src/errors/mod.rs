use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Typed outcome of a WebDAV operation that did not succeed.
///
/// Every variant maps to exactly one status code; handlers never pick codes
/// ad hoc. Store-level failures are wrapped in `Internal` and surface as a
/// bare 500 with no detail leaked to the client.
#[derive(Error, Debug)]
pub enum DavError {
    #[error("resource not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("method not allowed: {0}")]
    NotAllowed(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DavError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DavError::NotFound => StatusCode::NOT_FOUND,
            DavError::Conflict(_) => StatusCode::CONFLICT,
            DavError::NotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            DavError::Forbidden(_) => StatusCode::FORBIDDEN,
            DavError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn user_message(&self) -> String {
        match self {
            DavError::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for DavError {
    fn into_response(self) -> Response {
        if let DavError::Internal(ref e) = self {
            tracing::error!("internal error serving WebDAV request: {:#}", e);
        }
        (self.status_code(), self.user_message()).into_response()
    }
}

impl From<sqlx::Error> for DavError {
    fn from(e: sqlx::Error) -> Self {
        DavError::Internal(e.into())
    }
}

/// Recognize constraint violations raised when a concurrent request won the
/// race for the same name or deleted the parent folder mid-flight. Those are
/// semantic conflicts, not server faults.
pub fn map_store_error(e: anyhow::Error) -> DavError {
    let is_constraint = e
        .downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .map(|db| {
            let msg = db.message();
            msg.contains("FOREIGN KEY constraint") || msg.contains("UNIQUE constraint")
        })
        .unwrap_or(false);

    if is_constraint {
        DavError::Conflict("resource tree changed concurrently".to_string())
    } else {
        DavError::Internal(e)
    }
}
