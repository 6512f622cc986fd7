//! Error normalization.
//!
//! Every failure on a request path ends up as a [`GatewayError`], which
//! renders as `{"error": <message>}` with the status of its [`ErrorKind`].
//! The `Display` text is the server-side detail; clients only ever see
//! [`GatewayError::client_message`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Longest backend error excerpt passed on to the client, in characters.
pub const EXCERPT_CHARS: usize = 200;

pub const UNEXPECTED_MESSAGE: &str = "Internal server error";

/// Failure categories, each with a fixed client status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ClientInput,
    BackendRejected,
    BackendUnreachable,
    Integrity,
    Unexpected,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("required multipart field '{field}' is absent or empty")]
    MissingFile { field: &'static str },

    #[error("file {position} has an empty or blank filename")]
    InvalidFilename { position: usize },

    #[error("file {position} has no content")]
    EmptyFile { position: usize },

    #[error("merge needs at least {required} files, got {received}")]
    TooFewFiles { required: usize, received: usize },

    #[error("constraints field is not valid JSON: {0}")]
    InvalidConstraints(String),

    #[error("maxSize must be a positive integer")]
    InvalidTargetSize,

    #[error("multipart body could not be read: {0}")]
    MalformedUpload(String),

    #[error("request body exceeds the configured limit")]
    PayloadTooLarge,

    #[error("backend answered {status}: {excerpt}")]
    BackendRejected { status: StatusCode, excerpt: String },

    #[error("backend unreachable: {0}")]
    BackendUnreachable(String),

    #[error("backend returned {length} bytes, not a multiple of 16")]
    Integrity { length: usize },

    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl GatewayError {
    /// Build a rejection from a backend status and its raw body,
    /// keeping only the first [`EXCERPT_CHARS`] characters.
    pub fn rejected(status: StatusCode, body: &[u8]) -> Self {
        let excerpt = String::from_utf8_lossy(body)
            .chars()
            .take(EXCERPT_CHARS)
            .collect();
        GatewayError::BackendRejected { status, excerpt }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::MissingFile { .. }
            | GatewayError::InvalidFilename { .. }
            | GatewayError::EmptyFile { .. }
            | GatewayError::TooFewFiles { .. }
            | GatewayError::InvalidConstraints(_)
            | GatewayError::InvalidTargetSize
            | GatewayError::MalformedUpload(_)
            | GatewayError::PayloadTooLarge => ErrorKind::ClientInput,
            GatewayError::BackendRejected { .. } => ErrorKind::BackendRejected,
            GatewayError::BackendUnreachable(_) => ErrorKind::BackendUnreachable,
            GatewayError::Integrity { .. } => ErrorKind::Integrity,
            GatewayError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            _ => match self.kind() {
                ErrorKind::ClientInput => StatusCode::BAD_REQUEST,
                ErrorKind::BackendRejected => StatusCode::BAD_GATEWAY,
                ErrorKind::BackendUnreachable => StatusCode::SERVICE_UNAVAILABLE,
                ErrorKind::Integrity | ErrorKind::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Message safe to show the client.
    pub fn client_message(&self) -> String {
        match self {
            GatewayError::MissingFile { field: "files" } => "No files uploaded".to_string(),
            GatewayError::MissingFile { .. } => "No file uploaded".to_string(),
            GatewayError::InvalidFilename { position } => {
                format!("File {} has invalid name", position)
            }
            GatewayError::EmptyFile { position } => format!("File {} is empty", position),
            GatewayError::TooFewFiles { required, .. } => {
                format!("At least {} files are required for merge", required)
            }
            GatewayError::InvalidConstraints(_) => "Invalid constraints JSON".to_string(),
            GatewayError::InvalidTargetSize => "Invalid target_size_kb value".to_string(),
            GatewayError::MalformedUpload(_) => "Malformed multipart body".to_string(),
            GatewayError::PayloadTooLarge => "Uploaded payload too large".to_string(),
            GatewayError::BackendRejected { status, excerpt } => {
                format!("Backend service error ({}): {}", status.as_u16(), excerpt)
            }
            GatewayError::BackendUnreachable(_) => {
                "Connection to backend service failed".to_string()
            }
            GatewayError::Integrity { .. } => "Server returned invalid data format".to_string(),
            GatewayError::Unexpected(_) => UNEXPECTED_MESSAGE.to_string(),
        }
    }
}

/// JSON error response with the given status.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self.kind() {
            ErrorKind::ClientInput => tracing::debug!(status = %status, error = %self, "Rejected upload"),
            ErrorKind::BackendRejected | ErrorKind::BackendUnreachable => {
                tracing::warn!(status = %status, error = %self, "Backend call failed")
            }
            ErrorKind::Integrity | ErrorKind::Unexpected => {
                tracing::error!(status = %status, error = %self, "Request failed")
            }
        }
        json_error(status, self.client_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_statuses() {
        let cases = [
            (GatewayError::MissingFile { field: "file" }, 400),
            (GatewayError::InvalidFilename { position: 2 }, 400),
            (GatewayError::EmptyFile { position: 2 }, 400),
            (
                GatewayError::TooFewFiles {
                    required: 2,
                    received: 1,
                },
                400,
            ),
            (GatewayError::MalformedUpload("eof".into()), 400),
            (GatewayError::InvalidConstraints("eof".into()), 400),
            (GatewayError::InvalidTargetSize, 400),
            (GatewayError::PayloadTooLarge, 413),
            (GatewayError::rejected(StatusCode::NOT_FOUND, b"nope"), 502),
            (GatewayError::BackendUnreachable("refused".into()), 503),
            (GatewayError::Integrity { length: 17 }, 500),
            (GatewayError::Unexpected("boom".into()), 500),
        ];
        for (err, status) in cases {
            assert_eq!(err.status().as_u16(), status, "{err}");
        }
    }

    #[test]
    fn missing_file_message_depends_on_field() {
        assert_eq!(
            GatewayError::MissingFile { field: "file" }.client_message(),
            "No file uploaded"
        );
        assert_eq!(
            GatewayError::MissingFile { field: "files" }.client_message(),
            "No files uploaded"
        );
    }

    #[test]
    fn rejection_excerpt_is_capped_in_characters() {
        let body = "é".repeat(500);
        let err = GatewayError::rejected(StatusCode::INTERNAL_SERVER_ERROR, body.as_bytes());
        let message = err.client_message();
        assert!(message.starts_with("Backend service error (500): "));
        let excerpt = message.trim_start_matches("Backend service error (500): ");
        assert_eq!(excerpt.chars().count(), EXCERPT_CHARS);
    }

    #[test]
    fn unexpected_detail_stays_server_side() {
        let err = GatewayError::Unexpected("secret stack detail".into());
        assert_eq!(err.client_message(), UNEXPECTED_MESSAGE);
        assert!(err.to_string().contains("secret stack detail"));
    }
}
