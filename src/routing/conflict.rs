//! Registration-time ambiguity checks.
//!
//! A candidate pattern is rejected when an existing route for the same
//! method has the same normalized pattern, or when either pattern, read as a
//! probe path, matches the other. Checking both directions makes the outcome
//! independent of registration order.

use std::sync::Arc;

use crate::routing::error::RouteError;
use crate::routing::matcher::{self, MatchMode};
use crate::routing::pattern::CompiledPattern;
use crate::routing::table::Route;

/// Verify `candidate` can be appended to `existing` without ambiguity.
pub fn check(
    method: &str,
    existing: &[Arc<Route>],
    candidate: &CompiledPattern,
) -> Result<(), RouteError> {
    if existing.iter().any(|route| route.pattern() == candidate.as_str()) {
        return Err(RouteError::Duplicate {
            method: method.to_string(),
            pattern: candidate.to_string(),
        });
    }

    let forward = matcher::find(
        existing,
        candidate.as_str(),
        candidate.has_param(),
        MatchMode::Probe,
    )
    .map(|(route, _)| route);

    let reverse = || {
        existing.iter().find(|route| {
            matcher::match_path(candidate, route.pattern(), route.has_param(), MatchMode::Probe)
                .is_some()
        })
    };

    match forward.or_else(reverse) {
        Some(route) => Err(RouteError::Conflict {
            method: method.to_string(),
            pattern: candidate.to_string(),
            existing: route.pattern().to_string(),
        }),
        None => Ok(()),
    }
}
