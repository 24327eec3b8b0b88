//! Request ID assignment.
//!
//! # Responsibilities
//! - Reuse an inbound `x-request-id` or mint a UUID v4
//! - Expose the ID to handlers through request extensions
//! - Echo the ID on the response
//!
//! # Design Decisions
//! - Runs before dispatch so the request span and every log line carry it

use std::fmt;

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Correlation ID of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read the request ID assigned by [`assign_request_id`].
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&RequestId>;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<&RequestId> {
        self.extensions().get::<RequestId>()
    }
}

/// Middleware attaching a [`RequestId`] to the request and response.
pub async fn assign_request_id(mut request: Request<Body>, next: Next) -> Response {
    let id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(|v| RequestId(v.to_string()))
        .unwrap_or_default();

    request.extensions_mut().insert(id.clone());
    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(id.as_str()) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique_uuids() {
        let a = RequestId::new();
        let b = RequestId::new();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }
}
