//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with one route per operation
//! - Wire up middleware (request ID, tracing, metrics, concurrency limit,
//!   panic catching, body limit)
//! - Bind server to listener and shut down gracefully

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{catch_panic::CatchPanicLayer, request_id::RequestId, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::gateway::{handlers, Dispatcher, Operation};
use crate::http::request::{propagate_request_id_layer, request_id_str, set_request_id_layer};
use crate::http::response;
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub dispatcher: Dispatcher,
}

/// HTTP server for the file gateway.
pub struct HttpServer {
    router: Router,
    config: Arc<GatewayConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let dispatcher = Dispatcher::new(config.backend.clone(), config.timeouts.clone())?;
        let config = Arc::new(config);

        let state = AppState {
            config: config.clone(),
            dispatcher,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route(Operation::Compress.route(), post(handlers::compress))
            .route(Operation::ImageCompress.route(), post(handlers::image_compress))
            .route(Operation::Split.route(), post(handlers::split))
            .route(Operation::Merge.route(), post(handlers::merge))
            .route("/health", get(handlers::health))
            .fallback(response::not_found)
            .method_not_allowed_fallback(response::method_not_allowed)
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
            .layer(CatchPanicLayer::custom(response::panic_response))
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_concurrency))
            .layer(axum::middleware::from_fn(metrics::track_metrics))
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %request_id_str(req.extensions().get::<RequestId>()),
                    method = %req.method(),
                    path = %req.uri().path(),
                )
            }))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// Run the server until `shutdown` fires or the process is signalled.
    /// In-flight requests are drained before this returns.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend = %self.config.backend.base_url,
            max_concurrency = self.config.listener.max_concurrency,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown.recv() => tracing::info!("Shutdown requested"),
                    _ = shutdown_signal() => {}
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
