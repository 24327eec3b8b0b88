//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request};
use axum::response::Response;
use service_router::config::ServiceConfig;
use service_router::http::HttpServer;
use service_router::lifecycle::Shutdown;
use service_router::routing::Router;
use tokio::net::TcpListener;

/// Handler that always answers `body`.
pub fn reply(
    body: &'static str,
) -> impl Fn(Request<Body>) -> std::future::Ready<&'static str> + Send + Sync + 'static {
    move |_req| std::future::ready(body)
}

pub fn request(method: Method, path: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Serve `router` on an ephemeral local port.
///
/// Returns the bound address and the shutdown handle.
pub async fn start_server(router: Router) -> (SocketAddr, Arc<Shutdown>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut config = ServiceConfig::default();
    config.listener.bind_address = addr.to_string();

    let shutdown = Arc::new(Shutdown::new());
    let server = HttpServer::new(config, Arc::new(router));
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}
