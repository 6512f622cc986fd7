//! Response validation and passthrough.

use axum::body::Body;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::Response;

use crate::gateway::dispatch::BackendReply;
use crate::gateway::error::GatewayError;
use crate::gateway::operation::{Operation, OriginalType};

pub const ORIGINAL_CONTENT_TYPE: HeaderName = HeaderName::from_static("x-original-content-type");

/// Block size the image-compression backend emits its output in.
pub const BLOCK_SIZE: usize = 16;

/// Check the backend bytes for `op`.
pub fn verify(op: Operation, body: &[u8]) -> Result<(), GatewayError> {
    if op.requires_block_alignment() && body.len() % BLOCK_SIZE != 0 {
        return Err(GatewayError::Integrity { length: body.len() });
    }
    Ok(())
}

/// Turn a successful backend reply into the client response.
///
/// The body is the backend's bytes unchanged.
pub fn into_response(op: Operation, reply: BackendReply) -> Result<Response, GatewayError> {
    verify(op, &reply.body)?;

    let original = match op.original_type() {
        OriginalType::Fixed(value) => HeaderValue::from_static(value),
        OriginalType::Echo => reply
            .original_content_type
            .as_deref()
            .and_then(|v| HeaderValue::from_str(v).ok())
            .unwrap_or_else(|| HeaderValue::from_static("")),
    };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, op.response_content_type())
        .header(ORIGINAL_CONTENT_TYPE, original);

    if let Some(filename) = op.download_filename() {
        builder = builder.header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        );
    }

    builder
        .body(Body::from(reply.body))
        .map_err(|e| GatewayError::Unexpected(format!("could not build response: {}", e)))
}
