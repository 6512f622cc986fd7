//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::gateway::operation::Operation;

/// Root configuration for the file gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, concurrency).
    pub listener: ListenerConfig,

    /// Remote file-processing backend.
    pub backend: BackendConfig,

    /// Timeout configuration for backend calls.
    pub timeouts: TimeoutConfig,

    /// Upload size limits.
    pub limits: LimitsConfig,

    /// Merge-specific settings.
    pub merge: MergeConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,

    /// Maximum number of requests handled at the same time.
    /// Requests beyond this wait for a free slot.
    pub max_concurrency: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            max_concurrency: 256,
        }
    }
}

/// Backend service location and per-operation endpoint paths.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL all endpoint paths are resolved against.
    pub base_url: String,

    /// Endpoint path per operation, relative to `base_url`.
    pub paths: EndpointPaths,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://docker-c05d.onrender.com/file-operations".to_string(),
            paths: EndpointPaths::default(),
        }
    }
}

impl BackendConfig {
    /// Full URL of the backend endpoint serving `op`.
    ///
    /// Exactly one slash separates the base URL from the path; trailing
    /// slashes on the path are kept because the backend routes on them.
    pub fn endpoint(&self, op: Operation) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.paths.get(op).trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointPaths {
    pub compress: String,
    pub image_compress: String,
    pub split: String,
    pub merge: String,
}

impl Default for EndpointPaths {
    fn default() -> Self {
        Self {
            compress: "compress_pdf/".to_string(),
            image_compress: "imageCompressor/".to_string(),
            split: "split_pdf_file/".to_string(),
            merge: "mergePDF/".to_string(),
        }
    }
}

impl EndpointPaths {
    pub fn get(&self, op: Operation) -> &str {
        match op {
            Operation::Compress => &self.compress,
            Operation::ImageCompress => &self.image_compress,
            Operation::Split => &self.split,
            Operation::Merge => &self.merge,
        }
    }
}

/// Timeout configuration for backend calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total time for a compress, image-compress or split call in seconds.
    pub backend_secs: u64,

    /// Total time for a merge call in seconds.
    pub merge_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            backend_secs: 120,
            merge_secs: 30,
        }
    }
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    /// Deadline for the whole backend exchange of `op`.
    pub fn for_operation(&self, op: Operation) -> Duration {
        match op {
            Operation::Merge => Duration::from_secs(self.merge_secs),
            Operation::Compress | Operation::ImageCompress | Operation::Split => {
                Duration::from_secs(self.backend_secs)
            }
        }
    }
}

/// Upload size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 64 * 1024 * 1024, // 64MB
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Fewest files a merge request may carry.
    pub min_files: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self { min_files: 1 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_with_single_slash() {
        let mut backend = BackendConfig::default();
        backend.base_url = "http://127.0.0.1:9000/file-operations/".into();
        assert_eq!(
            backend.endpoint(Operation::Compress),
            "http://127.0.0.1:9000/file-operations/compress_pdf/"
        );

        backend.paths.merge = "/mergePDF/".into();
        assert_eq!(
            backend.endpoint(Operation::Merge),
            "http://127.0.0.1:9000/file-operations/mergePDF/"
        );
    }

    #[test]
    fn only_merge_gets_the_short_deadline() {
        let timeouts = TimeoutConfig::default();
        assert_eq!(timeouts.for_operation(Operation::Merge), Duration::from_secs(30));
        assert_eq!(timeouts.for_operation(Operation::Split), Duration::from_secs(120));
        assert_eq!(timeouts.for_operation(Operation::ImageCompress), Duration::from_secs(120));
    }

    #[test]
    fn log_format_parses_lowercase() {
        let cfg: ObservabilityConfig = toml::from_str("log_format = \"json\"").unwrap();
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert!(cfg.metrics_enabled);
    }
}
