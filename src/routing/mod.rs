//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (startup, may overlap traffic):
//!     (method, pattern, handler, middlewares)
//!     → router.rs (method check, wrap middlewares)
//!     → pattern.rs (compile segments)
//!     → conflict.rs (duplicate + ambiguity check, under write lock)
//!     → table.rs (append)
//!
//! Incoming Request (method, path)
//!     → router.rs (dispatch)
//!     → table.rs + matcher.rs (scan under read lock)
//!     → Matched: params.rs bindings into request extensions → handler
//!     → NoMatch: not-found handler
//! ```
//!
//! # Design Decisions
//! - Linear scan per method, first match wins
//! - Ambiguous registrations are rejected, so first-match is deterministic
//! - No regex, no catch-all segments

pub mod conflict;
pub mod error;
pub mod handler;
pub mod matcher;
pub mod params;
pub mod pattern;
pub mod router;
pub mod table;

pub use error::{PatternError, RouteError, RouteResult};
pub use handler::{compose, shared, Handler, Middleware, SharedHandler};
pub use params::{Params, RequestParamsExt};
pub use router::{internal_error_recovery, RecoveryHook, RequestHead, Router};
pub use table::{Route, RouteMatch, RouteTable};
