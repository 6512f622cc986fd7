//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;

use file_gateway::config::GatewayConfig;
use file_gateway::http::HttpServer;
use file_gateway::lifecycle::Shutdown;

/// One multipart part as the backend saw it.
#[derive(Debug, Clone)]
pub struct ReceivedPart {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// One request as the backend saw it.
#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub path: String,
    pub headers: HeaderMap,
    pub parts: Vec<ReceivedPart>,
}

impl ReceivedRequest {
    pub fn part(&self, name: &str) -> Option<&ReceivedPart> {
        self.parts.iter().find(|p| p.name == name)
    }

    /// Bytes of the first part with a filename.
    pub fn first_file(&self) -> &[u8] {
        self.parts
            .iter()
            .find(|p| p.filename.is_some())
            .map(|p| p.data.as_slice())
            .unwrap_or_default()
    }
}

/// What the mock backend answers.
#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: u16,
    pub body: Vec<u8>,
    pub original_content_type: Option<&'static str>,
    pub delay: Option<Duration>,
}

impl MockReply {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            original_content_type: None,
            delay: None,
        }
    }

    pub fn status(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            ..Self::ok(body)
        }
    }

    pub fn with_original_type(mut self, value: &'static str) -> Self {
        self.original_content_type = Some(value);
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

type ReplyFn = dyn Fn(&ReceivedRequest) -> MockReply + Send + Sync;

struct MockState {
    reply: Box<ReplyFn>,
    received: Mutex<Vec<ReceivedRequest>>,
}

/// A programmable backend on an ephemeral port.
pub struct MockBackend {
    pub addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockBackend {
    pub fn base_url(&self) -> String {
        format!("http://{}/file-operations", self.addr)
    }

    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.state.received.lock().unwrap().clone()
    }
}

/// Start a backend that answers every request with `reply(request)`.
pub async fn start_backend<F>(reply: F) -> MockBackend
where
    F: Fn(&ReceivedRequest) -> MockReply + Send + Sync + 'static,
{
    let state = Arc::new(MockState {
        reply: Box::new(reply),
        received: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/{*path}", any(handle))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockBackend { addr, state }
}

/// Backend that sends back the first uploaded file unchanged.
pub async fn start_echo_backend() -> MockBackend {
    start_backend(|req| MockReply::ok(req.first_file().to_vec())).await
}

async fn handle(
    State(state): State<Arc<MockState>>,
    uri: Uri,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.unwrap().to_vec();
        parts.push(ReceivedPart {
            name,
            filename,
            content_type,
            data,
        });
    }

    let request = ReceivedRequest {
        path: uri.path().to_string(),
        headers,
        parts,
    };
    let reply = (state.reply)(&request);
    state.received.lock().unwrap().push(request);

    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }

    let mut response = (
        StatusCode::from_u16(reply.status).unwrap(),
        reply.body,
    )
        .into_response();
    if let Some(value) = reply.original_content_type {
        response
            .headers_mut()
            .insert("x-original-content-type", value.parse().unwrap());
    }
    response
}

/// A gateway under test. Shuts down when dropped.
pub struct TestGateway {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_gateway(backend_url: &str) -> TestGateway {
    start_gateway_with(backend_url, |_| {}).await
}

/// Start a gateway against `backend_url`, letting the test adjust the config.
pub async fn start_gateway_with<F>(backend_url: &str, tweak: F) -> TestGateway
where
    F: FnOnce(&mut GatewayConfig),
{
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.backend.base_url = backend_url.to_string();
    config.observability.metrics_enabled = false;
    tweak(&mut config);

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestGateway { addr, shutdown }
}

/// An address nothing listens on.
pub async fn closed_backend_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/file-operations", addr)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
