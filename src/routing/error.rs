//! Registration error definitions.

use thiserror::Error;

/// A route pattern could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("route pattern must not be empty")]
    Empty,

    #[error("route pattern must begin with '/': {0}")]
    MissingLeadingSlash(String),
}

/// Errors raised while registering a route.
///
/// All of them are configuration errors: a router that rejected a
/// registration must not be put in front of traffic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// Method is not one of GET, HEAD, OPTIONS, POST, PUT, PATCH, DELETE.
    #[error("unsupported method {0}")]
    Method(String),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("no handler given for pattern {pattern}")]
    Handler { pattern: String },

    #[error("multiple registrations for {method} {pattern}")]
    Duplicate { method: String, pattern: String },

    #[error("{method} {pattern} conflicts with registered pattern {existing}")]
    Conflict {
        method: String,
        pattern: String,
        existing: String,
    },
}

impl RouteError {
    /// Short label used for log fields and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RouteError::Method(_) => "method",
            RouteError::Pattern(_) => "pattern",
            RouteError::Handler { .. } => "handler",
            RouteError::Duplicate { .. } => "duplicate",
            RouteError::Conflict { .. } => "conflict",
        }
    }
}

/// Result type for route registration.
pub type RouteResult<T> = Result<T, RouteError>;
