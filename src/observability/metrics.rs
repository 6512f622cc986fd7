//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by route, status
//! - `gateway_request_duration_seconds` (histogram): latency by route, status
//! - `gateway_backend_calls_total` (counter): backend calls by operation, outcome
//!
//! Without an installed recorder every update is a no-op, so tests and
//! embedders pay nothing.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body, extract::MatchedPath, http::Request, middleware::Next, response::IntoResponse,
    routing::get, Router,
};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::gateway::Operation;

const LATENCY_BUCKETS: &[f64] = &[0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0];

/// Install the Prometheus recorder and serve `GET /metrics` on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    let handle = PrometheusBuilder::new()
        .set_buckets(LATENCY_BUCKETS)?
        .install_recorder()?;

    let app = Router::new().route("/metrics", get(move || std::future::ready(handle.render())));

    tokio::spawn(async move {
        let listener = match tokio::net::TcpListener::bind(addr).await {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(address = %addr, error = %e, "Failed to bind metrics listener");
                return;
            }
        };
        tracing::info!(address = %addr, "Metrics endpoint listening");
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "Metrics server stopped");
        }
    });

    Ok(())
}

/// Middleware recording request count and latency per matched route.
pub async fn track_metrics(req: Request<Body>, next: Next) -> impl IntoResponse {
    let start = Instant::now();

    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(req).await;

    let labels = [
        ("route", route),
        ("status", response.status().as_u16().to_string()),
    ];
    metrics::counter!("gateway_requests_total", &labels).increment(1);
    metrics::histogram!("gateway_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());

    response
}

/// Count one backend call for `op`; `outcome` is `ok`, `rejected` or `unreachable`.
pub fn record_backend_call(op: Operation, outcome: &'static str) {
    metrics::counter!(
        "gateway_backend_calls_total",
        "operation" => op.config_key(),
        "outcome" => outcome
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post};
    use metrics_exporter_prometheus::PrometheusHandle;
    use tower::ServiceExt;

    /// The rendered sample line for `name` carrying every label in `labels`.
    fn sample(handle: &PrometheusHandle, name: &str, labels: &[&str]) -> Option<String> {
        handle
            .render()
            .lines()
            .filter(|line| line.starts_with(&format!("{name}{{")))
            .find(|line| labels.iter().all(|label| line.contains(label)))
            .map(str::to_string)
    }

    #[test]
    fn backend_calls_are_labeled_by_operation_and_outcome() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_backend_call(Operation::Merge, "rejected");
            record_backend_call(Operation::Merge, "rejected");
            record_backend_call(Operation::ImageCompress, "ok");
        });

        let merge = sample(
            &handle,
            "gateway_backend_calls_total",
            &[r#"operation="merge""#, r#"outcome="rejected""#],
        )
        .expect("merge series");
        assert!(merge.ends_with(" 2"), "{merge}");

        let image = sample(
            &handle,
            "gateway_backend_calls_total",
            &[r#"operation="image_compress""#, r#"outcome="ok""#],
        )
        .expect("image series");
        assert!(image.ends_with(" 1"), "{image}");
    }

    #[tokio::test]
    async fn requests_are_labeled_by_matched_route_and_status() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let _guard = metrics::set_default_local_recorder(&recorder);

        let app = Router::new()
            .route("/split", post(|| async { StatusCode::BAD_GATEWAY }))
            .layer(axum::middleware::from_fn(track_metrics));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/split")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let line = sample(
            &handle,
            "gateway_requests_total",
            &[r#"route="/split""#, r#"status="502""#],
        )
        .expect("request series");
        assert!(line.ends_with(" 1"), "{line}");
        assert!(handle
            .render()
            .contains("gateway_request_duration_seconds"));
    }
}
