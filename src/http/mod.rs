//! HTTP host transport.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum, timeouts, CORS, trace layer)
//!     → request.rs (request ID)
//!     → routing::Router::serve (match + handler)
//!     → response.rs (canned not-found / error bodies)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestId, RequestIdExt, X_REQUEST_ID};
pub use server::HttpServer;
