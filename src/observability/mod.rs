//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router and server produce:
//!     → logging.rs (structured log events, request spans)
//!     → metrics.rs (registration and dispatch counters)
//!
//! Consumers:
//!     → stdout (JSON or text)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) by default for machine parsing
//! - Request ID flows into every log line through the request span
//! - Metrics go through the `metrics` facade; without an installed
//!   recorder they are no-ops

pub mod logging;
pub mod metrics;
