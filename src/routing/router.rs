//! Request dispatch.
//!
//! # Responsibilities
//! - Register routes (method check, middleware wrapping, table insert)
//! - Resolve each request to a route or the not-found handler
//! - Publish path parameters into the request extensions
//! - Optionally recover from handler panics
//!
//! # Design Decisions
//! - The route table is owned by the router and injected at construction;
//!   there is no process-wide instance
//! - Registration takes `&self` so routes can be added while serving
//! - Handlers run outside the table lock
//! - Without a recovery hook, handler panics propagate to the host

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, Uri};
use axum::response::Response;
use futures_util::FutureExt;

use crate::http::response;
use crate::observability::metrics::{self, DispatchOutcome};
use crate::routing::error::RouteError;
use crate::routing::handler::{self, Handler, Middleware, SharedHandler};
use crate::routing::table::{self, RouteTable};

/// Request metadata kept aside for the recovery hook, since the request
/// itself is consumed by the handler.
#[derive(Debug, Clone)]
pub struct RequestHead {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

impl<B> From<&Request<B>> for RequestHead {
    fn from(request: &Request<B>) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
            headers: request.headers().clone(),
        }
    }
}

/// Called with the panic payload of a failed handler; decides the response.
pub type RecoveryHook = Arc<dyn Fn(&RequestHead, Box<dyn Any + Send>) -> Response + Send + Sync>;

/// Method/path router with conflict-checked registration.
pub struct Router {
    table: Arc<RouteTable>,
    not_found: SharedHandler,
    recovery: Option<RecoveryHook>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Router over a fresh, empty table.
    pub fn new() -> Self {
        Self::with_table(Arc::new(RouteTable::new()))
    }

    pub fn with_table(table: Arc<RouteTable>) -> Self {
        Self {
            table,
            not_found: handler::shared(|_req: Request<Body>| async { response::not_found() }),
            recovery: None,
        }
    }

    /// Replace the handler used when no route matches.
    pub fn with_not_found<H: Handler>(mut self, not_found: H) -> Self {
        self.not_found = handler::shared(not_found);
        self
    }

    /// Recover from handler panics with `hook`.
    pub fn with_recovery<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RequestHead, Box<dyn Any + Send>) -> Response + Send + Sync + 'static,
    {
        self.recovery = Some(Arc::new(hook));
        self
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Registered `(method, pattern)` pairs.
    pub fn routes(&self) -> Vec<(Method, String)> {
        self.table.routes()
    }

    /// Register `handler` for `method` and `pattern`, wrapped by `middlewares`.
    ///
    /// Any error means the route set is invalid and the host should not
    /// start serving.
    pub fn register(
        &self,
        method: &str,
        pattern: &str,
        handler: Option<SharedHandler>,
        middlewares: &[Middleware],
    ) -> Result<(), RouteError> {
        let result = self.try_register(method, pattern, handler, middlewares);
        match &result {
            Ok(()) => {
                metrics::record_registration(true);
                tracing::debug!(
                    method = %method.to_ascii_uppercase(),
                    pattern = %pattern,
                    "Route registered"
                );
            }
            Err(e) => {
                metrics::record_registration(false);
                tracing::warn!(
                    method = %method,
                    pattern = %pattern,
                    kind = e.kind(),
                    error = %e,
                    "Route rejected"
                );
            }
        }
        result
    }

    fn try_register(
        &self,
        method: &str,
        pattern: &str,
        handler: Option<SharedHandler>,
        middlewares: &[Middleware],
    ) -> Result<(), RouteError> {
        let method = table::normalize_method(method)?;
        let handler = handler.ok_or_else(|| RouteError::Handler {
            pattern: pattern.to_string(),
        })?;
        let handler = handler::compose(handler, middlewares);
        self.table.insert(method, pattern, handler)?;
        Ok(())
    }

    pub fn handle<H: Handler>(
        &self,
        method: &str,
        pattern: &str,
        handler: H,
    ) -> Result<(), RouteError> {
        self.register(method, pattern, Some(handler::shared(handler)), &[])
    }

    pub fn get<H: Handler>(&self, pattern: &str, handler: H) -> Result<(), RouteError> {
        self.handle("GET", pattern, handler)
    }

    pub fn head<H: Handler>(&self, pattern: &str, handler: H) -> Result<(), RouteError> {
        self.handle("HEAD", pattern, handler)
    }

    pub fn options<H: Handler>(&self, pattern: &str, handler: H) -> Result<(), RouteError> {
        self.handle("OPTIONS", pattern, handler)
    }

    pub fn post<H: Handler>(&self, pattern: &str, handler: H) -> Result<(), RouteError> {
        self.handle("POST", pattern, handler)
    }

    pub fn put<H: Handler>(&self, pattern: &str, handler: H) -> Result<(), RouteError> {
        self.handle("PUT", pattern, handler)
    }

    pub fn patch<H: Handler>(&self, pattern: &str, handler: H) -> Result<(), RouteError> {
        self.handle("PATCH", pattern, handler)
    }

    pub fn delete<H: Handler>(&self, pattern: &str, handler: H) -> Result<(), RouteError> {
        self.handle("DELETE", pattern, handler)
    }

    /// Dispatch one request.
    pub async fn serve(&self, mut request: Request<Body>) -> Response {
        let method = request.method().clone();

        let Some(found) = self.table.find(&method, request.uri().path()) else {
            tracing::debug!(method = %method, path = %request.uri().path(), "No route matched");
            return self
                .invoke(self.not_found.clone(), request, method, DispatchOutcome::NotFound)
                .await;
        };

        tracing::debug!(
            method = %method,
            pattern = %found.route.pattern(),
            params = found.params.len(),
            "Route matched"
        );

        let handler = found.route.handler().clone();
        request.extensions_mut().insert(found.params);
        self.invoke(handler, request, method, DispatchOutcome::Matched).await
    }

    async fn invoke(
        &self,
        handler: SharedHandler,
        request: Request<Body>,
        method: Method,
        outcome: DispatchOutcome,
    ) -> Response {
        let Some(hook) = &self.recovery else {
            let response = handler.call(request).await;
            metrics::record_dispatch(method.as_str(), outcome);
            return response;
        };

        let head = RequestHead::from(&request);
        // The call happens inside the future so a panic before the first
        // await is caught too.
        let result = AssertUnwindSafe(async move { handler.call(request).await })
            .catch_unwind()
            .await;

        match result {
            Ok(response) => {
                metrics::record_dispatch(method.as_str(), outcome);
                response
            }
            Err(payload) => {
                tracing::error!(
                    method = %head.method,
                    path = %head.uri.path(),
                    panic = %panic_message(&*payload),
                    "Handler panicked, recovering"
                );
                metrics::record_dispatch(method.as_str(), DispatchOutcome::Recovered);
                hook(&head, payload)
            }
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("table", &self.table)
            .field("recovery", &self.recovery.is_some())
            .finish_non_exhaustive()
    }
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Recovery hook answering `500 Internal Server Error`.
pub fn internal_error_recovery(
) -> impl Fn(&RequestHead, Box<dyn Any + Send>) -> Response + Send + Sync + 'static {
    |_head: &RequestHead, _payload: Box<dyn Any + Send>| response::internal_error()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use crate::routing::params::RequestParamsExt;

    async fn boom(_req: Request<Body>) -> &'static str {
        panic!("exploded")
    }

    fn request(method: Method, path: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_default_not_found() {
        let router = Router::new();
        let response = router.serve(request(Method::GET, "/missing")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "404 page not found\n");
    }

    #[tokio::test]
    async fn test_custom_not_found() {
        let router = Router::new().with_not_found(|_req: Request<Body>| async {
            (StatusCode::NOT_FOUND, "nothing here")
        });
        let response = router.serve(request(Method::GET, "/missing")).await;
        assert_eq!(body_text(response).await, "nothing here");
    }

    #[tokio::test]
    async fn test_params_published_to_handler() {
        let router = Router::new();
        router
            .put("/users/:uuid", |req: Request<Body>| async move {
                req.param(":uuid").unwrap_or_default().to_string()
            })
            .unwrap();

        let response = router.serve(request(Method::PUT, "/users/12345-67890")).await;
        assert_eq!(body_text(response).await, "12345-67890");
    }

    #[tokio::test]
    async fn test_missing_handler_rejected() {
        let router = Router::new();
        let err = router.register("GET", "/", None, &[]).unwrap_err();
        assert_eq!(err, RouteError::Handler { pattern: "/".into() });
        assert!(router.table().is_empty());
    }

    #[tokio::test]
    async fn test_lowercase_method_registration() {
        let router = Router::new();
        router.handle("delete", "/users/:id", |_req: Request<Body>| async { "deleted" }).unwrap();

        let response = router.serve(request(Method::DELETE, "/users/1")).await;
        assert_eq!(body_text(response).await, "deleted");
    }

    #[tokio::test]
    async fn test_recovery_hook_intercepts_panic() {
        let hook = |head: &RequestHead, payload: Box<dyn Any + Send>| {
            let message = panic_message(&*payload);
            let body = format!("{} {} {}", head.method, head.uri.path(), message);
            (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
        };
        let router = Router::new().with_recovery(hook);
        router.get("/boom", boom).unwrap();

        let response = router.serve(request(Method::GET, "/boom")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "GET /boom exploded");
    }

    #[tokio::test]
    async fn test_recovery_catches_synchronous_panic() {
        let router = Router::new().with_recovery(internal_error_recovery());
        router
            .get("/sync", |_req: Request<Body>| -> std::future::Ready<&'static str> {
                panic!("before any future")
            })
            .unwrap();

        let response = router.serve(request(Method::GET, "/sync")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_panic_propagates_without_hook() {
        let router = Arc::new(Router::new());
        router
            .get("/boom", boom)
            .unwrap();

        let task = tokio::spawn({
            let router = router.clone();
            async move { router.serve(request(Method::GET, "/boom")).await }
        });
        let err = task.await.unwrap_err();
        assert!(err.is_panic());
    }
}
