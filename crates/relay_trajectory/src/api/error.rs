//! HTTP error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use relay_error::{RelayError, RelayErrorKind, StorageErrorKind, ValidationErrorKind};
use serde_json::json;
use tracing::error;

/// Failure classes of the query surface.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum HttpErrorKind {
    /// Missing or malformed request input
    #[display("{}", _0)]
    BadRequest(String),
    /// Requested resource does not exist
    #[display("{} not found", _0)]
    NotFound(String),
    /// Backing store failure; details are logged, not returned
    #[display("{}", _0)]
    Internal(String),
}

/// Query surface error with location tracking.
///
/// Renders as `{"error": "<message>"}` with the matching status code.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("HTTP Error: {} at line {} in {}", kind, line, file)]
pub struct HttpError {
    kind: HttpErrorKind,
    line: u32,
    file: &'static str,
}

impl HttpError {
    /// Create a new HTTP error with caller location tracking.
    #[track_caller]
    pub fn new(kind: HttpErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Bad request from a validation failure.
    #[track_caller]
    pub fn bad_request(kind: ValidationErrorKind) -> Self {
        Self::new(HttpErrorKind::BadRequest(kind.to_string()))
    }

    /// Missing resource.
    #[track_caller]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::new(HttpErrorKind::NotFound(what.into()))
    }

    /// Map an internal failure, logging its details.
    #[track_caller]
    pub fn from_relay(context: &str, err: &RelayError) -> Self {
        match err.kind() {
            RelayErrorKind::Validation(e) => Self::bad_request(e.kind().clone()),
            RelayErrorKind::Storage(e) if matches!(e.kind, StorageErrorKind::InvalidKey(_)) => {
                Self::new(HttpErrorKind::BadRequest(e.kind.to_string()))
            }
            _ => {
                error!(error = %err, "{}", context);
                Self::new(HttpErrorKind::Internal(context.to_string()))
            }
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &HttpErrorKind {
        &self.kind
    }

    /// Status code for this error.
    pub fn status(&self) -> StatusCode {
        match self.kind {
            HttpErrorKind::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpErrorKind::NotFound(_) => StatusCode::NOT_FOUND,
            HttpErrorKind::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.kind.to_string() }))).into_response()
    }
}
