//! File gateway library.
//!
//! Accepts PDF and image uploads, forwards them byte for byte to a remote
//! file-processing backend and relays the binary result, turning every
//! failure into a `{"error": ...}` JSON body.

pub mod config;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
