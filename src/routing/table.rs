//! Route storage.
//!
//! # Responsibilities
//! - Hold registered routes per method, in insertion order
//! - Serialize registrations and run the conflict check under the write lock
//! - Serve lookups to concurrent readers
//!
//! # Design Decisions
//! - `parking_lot::RwLock`: readers proceed in parallel, writers are exclusive
//! - Lock scope covers the scan only; callers receive owned results and run
//!   handlers after the guard is dropped
//! - Sequences only grow; routes are never removed or replaced

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::Method;
use parking_lot::RwLock;

use crate::routing::conflict;
use crate::routing::error::RouteError;
use crate::routing::handler::SharedHandler;
use crate::routing::matcher::{self, MatchMode};
use crate::routing::params::Params;
use crate::routing::pattern::{self, CompiledPattern, Segment};

/// Methods accepted at registration.
pub const SUPPORTED_METHODS: [Method; 7] = [
    Method::GET,
    Method::HEAD,
    Method::OPTIONS,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

/// Upper-case `method` and check it against [`SUPPORTED_METHODS`].
pub fn normalize_method(method: &str) -> Result<Method, RouteError> {
    let upper = method.to_ascii_uppercase();
    SUPPORTED_METHODS
        .iter()
        .find(|m| m.as_str() == upper)
        .cloned()
        .ok_or(RouteError::Method(upper))
}

/// A registered route. Immutable once created.
pub struct Route {
    method: Method,
    compiled: CompiledPattern,
    handler: SharedHandler,
}

impl Route {
    pub fn new(method: Method, compiled: CompiledPattern, handler: SharedHandler) -> Self {
        Self {
            method,
            compiled,
            handler,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn pattern(&self) -> &str {
        self.compiled.as_str()
    }

    pub fn segments(&self) -> &[Segment] {
        self.compiled.segments()
    }

    pub fn has_param(&self) -> bool {
        self.compiled.has_param()
    }

    pub fn compiled(&self) -> &CompiledPattern {
        &self.compiled
    }

    pub fn handler(&self) -> &SharedHandler {
        &self.handler
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.compiled.as_str())
            .field("has_param", &self.compiled.has_param())
            .finish_non_exhaustive()
    }
}

/// Outcome of a successful lookup.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<Route>,
    pub params: Params,
}

/// Method → insertion-ordered routes.
#[derive(Default)]
pub struct RouteTable {
    entries: RwLock<HashMap<Method, Vec<Arc<Route>>>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile and append a route.
    ///
    /// Duplicate and conflict checks run under the same write lock as the
    /// append, so two racing registrations cannot both be accepted.
    pub fn insert(
        &self,
        method: Method,
        raw_pattern: &str,
        handler: SharedHandler,
    ) -> Result<Arc<Route>, RouteError> {
        let compiled = pattern::compile(raw_pattern)?;

        let mut entries = self.entries.write();
        let routes = entries.entry(method.clone()).or_default();
        conflict::check(method.as_str(), routes, &compiled)?;

        let route = Arc::new(Route::new(method, compiled, handler));
        routes.push(route.clone());
        Ok(route)
    }

    /// First route registered for `method` that matches `path`.
    pub fn find(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let entries = self.entries.read();
        let routes = entries.get(method)?;
        matcher::find(routes, path, false, MatchMode::Dispatch).map(|(route, params)| RouteMatch {
            route: route.clone(),
            params,
        })
    }

    /// Registered `(method, pattern)` pairs, each method in insertion order.
    pub fn routes(&self) -> Vec<(Method, String)> {
        let entries = self.entries.read();
        SUPPORTED_METHODS
            .iter()
            .filter_map(|m| entries.get(m))
            .flatten()
            .map(|r| (r.method().clone(), r.pattern().to_string()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTable").field("routes", &self.len()).finish()
    }
}
