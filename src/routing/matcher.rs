//! Path matching against compiled patterns.
//!
//! # Responsibilities
//! - Decide whether a path satisfies a compiled pattern
//! - Capture parameter values while matching
//! - Scan a route sequence, first match wins
//!
//! # Design Decisions
//! - Unparameterized patterns compare whole strings (fast path)
//! - Parameterized patterns compare segment by segment; counts must agree
//! - A parameter binds the raw segment text, even if it looks like `:name`
//! - `MatchMode::Probe` lets a `:name` path segment satisfy any literal; only
//!   the conflict detector uses it
//! - Paths are matched as given; they are not normalized

use std::sync::Arc;

use crate::routing::params::Params;
use crate::routing::pattern::{CompiledPattern, Segment, PARAM_MARKER};
use crate::routing::table::Route;

/// How path segments are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Request dispatch: path segments are plain text.
    Dispatch,
    /// Conflict probing: the "path" is another pattern, so its parameter
    /// tokens stand for any value.
    Probe,
}

/// Match `path` against `pattern`.
///
/// `path_has_param` flags a probe path that contains parameter tokens; it
/// forces segment comparison even when `pattern` itself is static.
pub fn match_path(
    pattern: &CompiledPattern,
    path: &str,
    path_has_param: bool,
    mode: MatchMode,
) -> Option<Params> {
    if !pattern.has_param() && !path_has_param {
        return (pattern.as_str() == path).then(Params::new);
    }

    let rest = path.strip_prefix('/')?;
    if rest.split('/').count() != pattern.segments().len() {
        return None;
    }

    let mut params = Params::new();
    for (segment, value) in pattern.segments().iter().zip(rest.split('/')) {
        match segment {
            Segment::Parameter(name) => params.insert(name.as_str(), value),
            Segment::Literal(text) if text == value => {}
            Segment::Literal(_)
                if mode == MatchMode::Probe && value.starts_with(PARAM_MARKER) => {}
            Segment::Literal(_) => return None,
        }
    }
    Some(params)
}

/// Return the first route in `routes` matching `path`, with its bindings.
pub fn find<'a>(
    routes: &'a [Arc<Route>],
    path: &str,
    path_has_param: bool,
    mode: MatchMode,
) -> Option<(&'a Arc<Route>, Params)> {
    routes.iter().find_map(|route| {
        match_path(route.compiled(), path, path_has_param, mode).map(|params| (route, params))
    })
}
