//! service-router demo service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (axum: request id, CORS, timeout, trace)
//!                        │
//!                        ▼
//!                     routing::Router::serve
//!                        │   table scan (read lock), first match wins
//!                        ├──▶ matched: params → middleware chain → handler
//!                        └──▶ no match: not-found handler
//!
//!     Startup: config → logging → metrics → register routes (abort on
//!     any RouteError) → bind → serve until SIGINT/SIGTERM
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use clap::Parser;
use serde_json::json;
use tokio::net::TcpListener;

use service_router::config::{self, ServiceConfig};
use service_router::http::HttpServer;
use service_router::lifecycle::{signals, Shutdown};
use service_router::observability::{logging, metrics};
use service_router::routing::{
    internal_error_recovery, shared, Middleware, RequestParamsExt, RouteError, Router,
    SharedHandler,
};

#[derive(Parser)]
#[command(name = "service-router")]
#[command(about = "HTTP service built on a conflict-checked method/path router", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = config::load_config(cli.config.as_deref())?;
    logging::init_logging(&config.observability)?;

    tracing::info!(
        service = %config.name,
        version = %config.version,
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let router = build_router(&config)?;
    for (method, pattern) in router.routes() {
        tracing::info!(method = %method, pattern = %pattern, "Route");
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let shutdown = Arc::new(Shutdown::new());
    signals::spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config, Arc::new(router));
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Build the router and register the service routes.
///
/// A registration error aborts startup.
fn build_router(config: &ServiceConfig) -> Result<Router, RouteError> {
    let mut router = Router::new();
    if config.http.recover_panics {
        router = router.with_recovery(internal_error_recovery());
    }

    let name = config.name.clone();
    router.get("/", move |_req: Request<Body>| {
        let name = name.clone();
        async move { name }
    })?;

    router.get("/health", |_req: Request<Body>| async {
        Json(json!({ "status": "ok" }))
    })?;

    router.register("GET", "/users/:id", Some(shared(get_user)), &[timed()])?;

    Ok(router)
}

async fn get_user(req: Request<Body>) -> impl IntoResponse {
    match req.param(":id") {
        Some(id) if !id.is_empty() => (StatusCode::OK, Json(json!({ "id": id }))),
        _ => (StatusCode::BAD_REQUEST, Json(json!({ "error": "missing id" }))),
    }
}

/// Logs handler latency.
fn timed() -> Middleware {
    Arc::new(|next: SharedHandler| -> SharedHandler {
        Arc::new(move |req: Request<Body>| {
            let next = next.clone();
            async move {
                let started = Instant::now();
                let response = next.call(req).await;
                tracing::debug!(
                    status = response.status().as_u16(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Handler finished"
                );
                response
            }
        })
    })
}
