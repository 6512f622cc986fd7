//! Axum handlers, one per operation.
//!
//! Each request runs the same pipeline:
//! ```text
//! Received ──ingest──▶ Validated ──dispatch──▶ Dispatched ──validate──▶ Returned
//!    │                                  │                  │
//!    └──────────────────────────────────┴──────────────────┴──▶ ErrorReturned
//! ```
//! Validation failures never reach `dispatch`.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use serde_json::{json, Value};

use crate::gateway::credential::Credential;
use crate::gateway::error::GatewayError;
use crate::gateway::ingest::ingest;
use crate::gateway::operation::Operation;
use crate::gateway::validate;
use crate::http::server::AppState;

type UploadBody = Result<Multipart, MultipartRejection>;

pub async fn compress(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: UploadBody,
) -> Result<Response, GatewayError> {
    forward(Operation::Compress, &state, &headers, body).await
}

pub async fn image_compress(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: UploadBody,
) -> Result<Response, GatewayError> {
    forward(Operation::ImageCompress, &state, &headers, body).await
}

pub async fn split(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: UploadBody,
) -> Result<Response, GatewayError> {
    forward(Operation::Split, &state, &headers, body).await
}

pub async fn merge(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: UploadBody,
) -> Result<Response, GatewayError> {
    forward(Operation::Merge, &state, &headers, body).await
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn forward(
    op: Operation,
    state: &AppState,
    headers: &HeaderMap,
    body: UploadBody,
) -> Result<Response, GatewayError> {
    tracing::info!(operation = %op, "Received upload");

    // A body that is not multipart carries no files at all.
    let multipart = body.map_err(|rejection| {
        tracing::debug!(operation = %op, error = %rejection, "Request is not multipart");
        GatewayError::MissingFile {
            field: op.file_field(),
        }
    })?;

    let upload = ingest(op, multipart, state.config.merge.min_files).await?;
    tracing::debug!(
        operation = %op,
        files = ?upload.files.iter().map(|f| f.filename.as_str()).collect::<Vec<_>>(),
        target_size_kb = ?upload.constraints.max_size_kb,
        "Upload validated"
    );

    let credential = Credential::from_headers(headers);
    let reply = state.dispatcher.dispatch(op, &upload, &credential).await?;
    drop(upload);

    validate::into_response(op, reply)
}
