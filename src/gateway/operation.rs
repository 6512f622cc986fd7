//! The four logical operations and their fixed forwarding contract.

use std::fmt;

/// Content type used for outgoing parts whose original type is discarded,
/// and as the fallback when a client omits or garbles a part's type.
pub const GENERIC_BINARY: &str = "application/octet-stream";

/// One of the operations the backend performs on uploaded files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Compress,
    ImageCompress,
    Split,
    Merge,
}

/// Where the `X-Original-Content-Type` response header gets its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginalType {
    /// Always this value.
    Fixed(&'static str),
    /// Echo the backend's own `X-Original-Content-Type`, empty when absent.
    Echo,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Compress,
        Operation::ImageCompress,
        Operation::Split,
        Operation::Merge,
    ];

    /// Route the gateway exposes for this operation.
    pub fn route(self) -> &'static str {
        match self {
            Operation::Compress => "/compress",
            Operation::ImageCompress => "/imgCompressor",
            Operation::Split => "/split",
            Operation::Merge => "/merge",
        }
    }

    /// Name used in config keys, logs and metric labels.
    pub fn config_key(self) -> &'static str {
        match self {
            Operation::Compress => "compress",
            Operation::ImageCompress => "image_compress",
            Operation::Split => "split",
            Operation::Merge => "merge",
        }
    }

    /// Multipart field carrying the upload(s), both inbound and outbound.
    pub fn file_field(self) -> &'static str {
        match self {
            Operation::Merge => "files",
            Operation::Compress | Operation::ImageCompress | Operation::Split => "file",
        }
    }

    /// Filename the upload is renamed to before forwarding.
    /// `None` keeps each client filename.
    pub fn canonical_filename(self) -> Option<&'static str> {
        match self {
            Operation::Compress => Some("encrypted.enc.pdf"),
            Operation::ImageCompress | Operation::Split => Some("encrypted.enc"),
            Operation::Merge => None,
        }
    }

    /// Whether the outgoing part keeps the client's content type
    /// instead of [`GENERIC_BINARY`].
    pub fn preserves_content_type(self) -> bool {
        matches!(self, Operation::ImageCompress | Operation::Merge)
    }

    /// Content type of a successful response to the client.
    pub fn response_content_type(self) -> &'static str {
        match self {
            Operation::Compress => "application/pdf",
            Operation::ImageCompress | Operation::Merge => GENERIC_BINARY,
            Operation::Split => "application/zip",
        }
    }

    pub fn original_type(self) -> OriginalType {
        match self {
            Operation::Compress | Operation::Merge => OriginalType::Fixed("application/pdf"),
            Operation::Split => OriginalType::Fixed("application/zip"),
            Operation::ImageCompress => OriginalType::Echo,
        }
    }

    /// Suggested download filename, sent as `Content-Disposition`.
    pub fn download_filename(self) -> Option<&'static str> {
        match self {
            Operation::Merge => Some("merged_encrypted.pdf"),
            _ => None,
        }
    }

    /// Responses must be a whole number of 16-byte blocks.
    pub fn requires_block_alignment(self) -> bool {
        matches!(self, Operation::ImageCompress)
    }

    /// Ask the backend not to keep the connection alive after the call.
    pub fn closes_connection(self) -> bool {
        matches!(self, Operation::Merge)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_client_metadata() {
        assert_eq!(Operation::Merge.canonical_filename(), None);
        assert!(Operation::Merge.preserves_content_type());
        assert_eq!(Operation::Merge.file_field(), "files");
        assert!(Operation::Merge.closes_connection());
    }

    #[test]
    fn single_file_operations_are_renamed() {
        for op in [Operation::Compress, Operation::ImageCompress, Operation::Split] {
            assert!(op.canonical_filename().is_some(), "{op}");
            assert_eq!(op.file_field(), "file");
            assert!(!op.closes_connection());
        }
        assert!(!Operation::Compress.preserves_content_type());
        assert!(!Operation::Split.preserves_content_type());
    }

    #[test]
    fn only_image_compress_is_alignment_checked() {
        let checked: Vec<_> = Operation::ALL
            .into_iter()
            .filter(|op| op.requires_block_alignment())
            .collect();
        assert_eq!(checked, vec![Operation::ImageCompress]);
    }
}
