//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (one task per connection, axum::serve)
//!     → request.rs (assign/propagate request ID)
//!     → server.rs (tracing, metrics, concurrency limit, panic catching)
//!     → gateway handlers (one per operation)
//!     → response.rs (JSON fallbacks for unknown routes and panics)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
