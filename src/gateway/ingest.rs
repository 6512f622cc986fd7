//! Upload ingestion.
//!
//! Reads the inbound multipart body into memory, picks out the file part(s)
//! an operation needs and, for compression, the optional `constraints` JSON.
//! Everything is checked here so that an invalid request never reaches the
//! backend.

use std::num::NonZeroU64;

use axum::body::Bytes;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use serde_json::Value;

use crate::gateway::error::GatewayError;
use crate::gateway::operation::Operation;

/// Form field holding the compression constraints.
pub const CONSTRAINTS_FIELD: &str = "constraints";

/// One uploaded file, held in memory for the lifetime of the request.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Options a client may attach to a compression request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompressConstraints {
    /// Target output size in kilobytes (`maxSize`).
    pub max_size_kb: Option<NonZeroU64>,
}

impl CompressConstraints {
    /// Parse the `constraints` form field.
    ///
    /// Blank input means "no constraints". Anything else must be a JSON
    /// object; `maxSize`, when present and not null, must be a positive
    /// integer given either as a number or as a string of digits. Other
    /// keys are ignored.
    pub fn parse(raw: &str) -> Result<Self, GatewayError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        let value: Value = serde_json::from_str(raw)
            .map_err(|e| GatewayError::InvalidConstraints(e.to_string()))?;
        let Value::Object(options) = value else {
            return Err(GatewayError::InvalidConstraints(
                "expected a JSON object".to_string(),
            ));
        };

        let max_size_kb = match options.get("maxSize") {
            None | Some(Value::Null) => None,
            Some(v) => Some(positive_kb(v).ok_or(GatewayError::InvalidTargetSize)?),
        };

        Ok(Self { max_size_kb })
    }
}

fn positive_kb(value: &Value) -> Option<NonZeroU64> {
    let kb = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    kb.and_then(NonZeroU64::new)
}

/// Everything extracted from one inbound request.
#[derive(Debug)]
pub struct IncomingUpload {
    /// At least one file; exactly one unless the operation is merge.
    pub files: Vec<Upload>,
    pub constraints: CompressConstraints,
}

/// Read and validate the multipart body for `op`.
///
/// Single-file operations use the first `file` part and ignore any later
/// ones. Merge keeps every `files` part in order; each must carry a
/// non-blank filename and some content, and there must be at least
/// `min_merge_files` of them.
pub async fn ingest(
    op: Operation,
    mut multipart: Multipart,
    min_merge_files: usize,
) -> Result<IncomingUpload, GatewayError> {
    let file_field = op.file_field();
    let mut files = Vec::new();
    let mut raw_constraints = None;
    let mut position = 0;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == file_field {
            if op == Operation::Merge {
                position += 1;
                files.push(read_merge_part(field, position).await?);
            } else if files.is_empty() {
                if let Some(upload) = read_single_part(field).await? {
                    files.push(upload);
                }
            }
        } else if name == CONSTRAINTS_FIELD && op == Operation::Compress {
            raw_constraints = Some(field.text().await.map_err(multipart_error)?);
        } else {
            tracing::trace!(field = %name, operation = %op, "Ignoring multipart field");
        }
    }

    if files.is_empty() {
        return Err(GatewayError::MissingFile { field: file_field });
    }
    if op == Operation::Merge && files.len() < min_merge_files {
        return Err(GatewayError::TooFewFiles {
            required: min_merge_files,
            received: files.len(),
        });
    }

    let constraints = match raw_constraints {
        Some(raw) => CompressConstraints::parse(&raw)?,
        None => CompressConstraints::default(),
    };

    Ok(IncomingUpload { files, constraints })
}

/// A `file` part without a filename is a plain form value, not an upload.
/// A blank filename or empty body is what browsers send for an empty
/// file input; both count as "no file".
async fn read_single_part(field: Field<'_>) -> Result<Option<Upload>, GatewayError> {
    let Some(filename) = field.file_name().map(str::to_string) else {
        return Ok(None);
    };
    let content_type = field.content_type().map(str::to_string);
    let data = field.bytes().await.map_err(multipart_error)?;

    if filename.trim().is_empty() || data.is_empty() {
        return Ok(None);
    }

    Ok(Some(Upload {
        filename,
        content_type,
        data,
    }))
}

async fn read_merge_part(field: Field<'_>, position: usize) -> Result<Upload, GatewayError> {
    let filename = match field.file_name() {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => return Err(GatewayError::InvalidFilename { position }),
    };
    let content_type = field.content_type().map(str::to_string);
    let data = field.bytes().await.map_err(multipart_error)?;

    if data.is_empty() {
        return Err(GatewayError::EmptyFile { position });
    }

    Ok(Upload {
        filename,
        content_type,
        data,
    })
}

fn multipart_error(err: MultipartError) -> GatewayError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::PayloadTooLarge
    } else {
        GatewayError::MalformedUpload(err.body_text())
    }
}
