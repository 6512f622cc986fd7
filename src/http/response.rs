//! Responses produced outside the operation handlers.
//!
//! # Responsibilities
//! - JSON bodies for unknown routes and wrong methods
//! - Last-resort 500 for handler panics, with the detail kept server-side

use std::any::Any;

use axum::http::StatusCode;
use axum::response::Response;

use crate::gateway::error::{json_error, UNEXPECTED_MESSAGE};

pub async fn not_found() -> Response {
    json_error(StatusCode::NOT_FOUND, "Not found")
}

pub async fn method_not_allowed() -> Response {
    json_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

/// Used by the catch-panic layer.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = %detail, "Handler panicked");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, UNEXPECTED_MESSAGE)
}
