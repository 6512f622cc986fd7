//! Backend dispatch.
//!
//! Rebuilds the upload as an outgoing multipart request, sends it to the
//! operation's endpoint exactly once and gates on the reply status.
//!
//! # Design Decisions
//! - One `reqwest::Client` per process; its pool is the only shared state
//! - Every call carries a deadline (merge: `timeouts.merge_secs`)
//! - No retries: transport failures surface immediately as 503

use axum::body::Bytes;
use axum::http::{header, HeaderValue};
use reqwest::multipart::{Form, Part};

use crate::config::{BackendConfig, TimeoutConfig};
use crate::gateway::credential::Credential;
use crate::gateway::error::GatewayError;
use crate::gateway::ingest::{IncomingUpload, Upload};
use crate::gateway::operation::{Operation, GENERIC_BINARY};
use crate::gateway::validate::ORIGINAL_CONTENT_TYPE;
use crate::observability::metrics;

/// Form field carrying the compression target size.
pub const TARGET_SIZE_FIELD: &str = "target_size_kb";

/// A backend reply that passed the status gate.
#[derive(Debug)]
pub struct BackendReply {
    /// The backend's `X-Original-Content-Type`, if it sent one.
    pub original_content_type: Option<String>,
    pub body: Bytes,
}

/// Sends operations to the configured backend.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
    backend: BackendConfig,
    timeouts: TimeoutConfig,
}

impl Dispatcher {
    pub fn new(backend: BackendConfig, timeouts: TimeoutConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeouts.connect())
            .build()?;

        Ok(Self {
            client,
            backend,
            timeouts,
        })
    }

    /// Forward `upload` for `op` and return the backend's successful reply.
    pub async fn dispatch(
        &self,
        op: Operation,
        upload: &IncomingUpload,
        credential: &Credential,
    ) -> Result<BackendReply, GatewayError> {
        let url = self.backend.endpoint(op);
        let mut request = self
            .client
            .post(&url)
            .timeout(self.timeouts.for_operation(op))
            .multipart(build_form(op, upload));

        if op.closes_connection() {
            request = request.header(header::CONNECTION, HeaderValue::from_static("close"));
        }
        request = credential.apply(request);

        tracing::debug!(
            operation = %op,
            url = %url,
            files = upload.files.len(),
            credential_present = credential.is_present(),
            "Dispatching to backend"
        );

        let response = request.send().await.map_err(|e| {
            metrics::record_backend_call(op, "unreachable");
            transport_error(e)
        })?;

        let status = response.status();
        let original_content_type = response
            .headers()
            .get(ORIGINAL_CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(|e| {
            metrics::record_backend_call(op, "unreachable");
            transport_error(e)
        })?;

        tracing::info!(
            operation = %op,
            status = %status,
            content_length = body.len(),
            "Backend responded"
        );

        if !status.is_success() {
            metrics::record_backend_call(op, "rejected");
            return Err(GatewayError::rejected(status, &body));
        }

        metrics::record_backend_call(op, "ok");
        Ok(BackendReply {
            original_content_type,
            body,
        })
    }
}

/// The outgoing multipart body for `op`.
pub fn build_form(op: Operation, upload: &IncomingUpload) -> Form {
    let mut form = Form::new();
    for file in &upload.files {
        form = form.part(op.file_field(), file_part(op, file));
    }
    if let Some(kb) = upload.constraints.max_size_kb {
        form = form.text(TARGET_SIZE_FIELD, kb.to_string());
    }
    form
}

fn file_part(op: Operation, upload: &Upload) -> Part {
    let filename = op
        .canonical_filename()
        .map(str::to_string)
        .unwrap_or_else(|| upload.filename.clone());
    let mime = if op.preserves_content_type() {
        upload.content_type.as_deref().unwrap_or(GENERIC_BINARY)
    } else {
        GENERIC_BINARY
    };

    let part = || {
        Part::stream_with_length(upload.data.clone(), upload.data.len() as u64)
            .file_name(filename.clone())
    };

    part().mime_str(mime).unwrap_or_else(|_| {
        tracing::debug!(content_type = %mime, "Unparseable part content type, sending generic binary");
        part().mime_str(GENERIC_BINARY).unwrap_or_else(|_| part())
    })
}

/// Anything that stopped the exchange from completing is the backend being
/// unreachable, except a request we could not even build.
fn transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_builder() {
        GatewayError::Unexpected(format!("could not build backend request: {}", err))
    } else if err.is_timeout() {
        GatewayError::BackendUnreachable(format!("timed out: {}", err))
    } else {
        GatewayError::BackendUnreachable(err.to_string())
    }
}
