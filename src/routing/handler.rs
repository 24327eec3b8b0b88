//! Handler and middleware abstractions.
//!
//! # Design Decisions
//! - Any `Fn(Request<Body>) -> impl Future<Output: IntoResponse>` is a handler
//! - Handlers are stored type-erased behind `Arc` so they can be cloned out of
//!   the route table and run without holding its lock
//! - Middlewares wrap handlers once, at registration time

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;

/// Something that turns a request into a response.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, request: Request<Body>) -> BoxFuture<'static, Response>;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoResponse,
{
    fn call(&self, request: Request<Body>) -> BoxFuture<'static, Response> {
        let fut = self(request);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// Type-erased, cloneable handler.
pub type SharedHandler = Arc<dyn Handler>;

/// Wraps a handler into another handler.
pub type Middleware = Arc<dyn Fn(SharedHandler) -> SharedHandler + Send + Sync>;

/// Erase a concrete handler.
pub fn shared<H: Handler>(handler: H) -> SharedHandler {
    Arc::new(handler)
}

/// Apply `middlewares` in listed order.
///
/// Each middleware receives the result of the previous one, so the last
/// middleware ends up outermost and runs first on a request.
pub fn compose(handler: SharedHandler, middlewares: &[Middleware]) -> SharedHandler {
    middlewares
        .iter()
        .fold(handler, |inner, middleware| middleware(inner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn recording(label: &'static str, log: Arc<Mutex<Vec<&'static str>>>) -> Middleware {
        Arc::new(move |next: SharedHandler| -> SharedHandler {
            let log = log.clone();
            Arc::new(move |req: Request<Body>| {
                log.lock().push(label);
                next.call(req)
            })
        })
    }

    #[tokio::test]
    async fn test_last_middleware_runs_first() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let inner_log = log.clone();
        let handler = shared(move |_req: Request<Body>| {
            inner_log.lock().push("handler");
            async { "done" }
        });

        let wrapped = compose(
            handler,
            &[recording("first", log.clone()), recording("second", log.clone())],
        );
        wrapped.call(Request::new(Body::empty())).await;

        assert_eq!(*log.lock(), vec!["second", "first", "handler"]);
    }

    #[tokio::test]
    async fn test_no_middlewares_is_identity() {
        let handler = shared(|_req: Request<Body>| async { "plain" });
        let wrapped = compose(handler.clone(), &[]);
        assert!(Arc::ptr_eq(&handler, &wrapped));
    }
}
