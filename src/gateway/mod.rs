//! Request-forwarding pipeline.
//!
//! # Data Flow
//! ```text
//! client multipart request
//!     → ingest.rs (file part(s), constraints, shape checks)
//!     → credential.rs (X-Password, passed through untouched)
//!     → dispatch.rs (rebuild multipart, one backend call, status gate)
//!     → validate.rs (alignment check, response headers, byte passthrough)
//!     → client
//!
//! any failure
//!     → error.rs (GatewayError → {"error": ...} + status)
//! ```

pub mod credential;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod ingest;
pub mod operation;
pub mod validate;

pub use dispatch::Dispatcher;
pub use error::{ErrorKind, GatewayError};
pub use operation::Operation;
