//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum app that hands every request to the router
//! - Wire up middleware (request ID, CORS, timeout, tracing)
//! - Bind to a listener and serve until shutdown
//!
//! # Design Decisions
//! - Shutdown has a drain deadline (`timeouts.shutdown_secs`); connections
//!   still open after it are abandoned

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware,
    response::Response,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::Instrument;

use crate::config::ServiceConfig;
use crate::http::request::{assign_request_id, RequestIdExt};
use crate::routing::Router;

/// HTTP server fronting a [`Router`].
pub struct HttpServer {
    app: axum::Router,
    config: ServiceConfig,
    router: Arc<Router>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig, router: Arc<Router>) -> Self {
        let app = Self::build_app(&config, router.clone());
        Self {
            app,
            config,
            router,
        }
    }

    /// Build the axum app with all middleware layers.
    ///
    /// Every method and path falls through to the router, which owns the
    /// not-found behavior.
    #[allow(deprecated)]
    pub fn build_app(config: &ServiceConfig, router: Arc<Router>) -> axum::Router {
        let mut app = axum::Router::new()
            .fallback(dispatch)
            .with_state(router)
            .layer(middleware::from_fn(assign_request_id))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        if config.http.cors_allow_all {
            app = app.layer(CorsLayer::permissive());
        }

        app.layer(TraceLayer::new_for_http())
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight
    /// requests for at most `timeouts.shutdown_secs`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            service = %self.config.name,
            version = %self.config.version,
            routes = self.router.table().len(),
            "HTTP server starting"
        );

        let grace = Duration::from_secs(self.config.timeouts.shutdown_secs);
        let (draining_tx, draining_rx) = oneshot::channel();
        let server = axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
                let _ = draining_tx.send(());
            })
            .into_future();
        tokio::pin!(server);

        tokio::select! {
            biased;
            result = &mut server => result?,
            _ = draining_rx => match tokio::time::timeout(grace, &mut server).await {
                Ok(result) => {
                    result?;
                    tracing::info!("Connections drained");
                }
                Err(_) => tracing::warn!(
                    grace_secs = grace.as_secs(),
                    "Drain deadline elapsed, abandoning open connections"
                ),
            },
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }
}

/// Fallback handler: run the request through the router inside a request span.
async fn dispatch(State(router): State<Arc<Router>>, request: Request<Body>) -> Response {
    let span = tracing::info_span!(
        "request",
        request_id = %request.request_id().map(|id| id.as_str()).unwrap_or("unknown"),
        method = %request.method(),
        path = %request.uri().path(),
    );
    router.serve(request).instrument(span).await
}
