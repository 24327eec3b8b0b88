//! Route pattern compilation.
//!
//! # Responsibilities
//! - Validate raw patterns (non-empty, leading `/`)
//! - Normalize the trailing slash
//! - Split into literal and parameter segments
//!
//! # Design Decisions
//! - Parameter names keep their `:` marker (`":id"`), which is also the key
//!   handlers use to read the bound value
//! - The root `/` compiles to a single empty literal segment

use std::fmt;

use crate::routing::error::PatternError;

/// Marker that turns a segment into a named parameter.
pub const PARAM_MARKER: char = ':';

/// One `/`-delimited token of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the request segment exactly.
    Literal(String),
    /// Binds whatever the request carries at this position.
    Parameter(String),
}

impl Segment {
    fn parse(token: &str) -> Self {
        if token.starts_with(PARAM_MARKER) {
            Segment::Parameter(token.to_string())
        } else {
            Segment::Literal(token.to_string())
        }
    }

    pub fn is_parameter(&self) -> bool {
        matches!(self, Segment::Parameter(_))
    }
}

/// A validated, normalized route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    pattern: String,
    segments: Vec<Segment>,
    has_param: bool,
}

impl CompiledPattern {
    /// The normalized pattern string (trailing slash removed).
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn has_param(&self) -> bool {
        self.has_param
    }
}

impl fmt::Display for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// Compile a raw route pattern.
pub fn compile(pattern: &str) -> Result<CompiledPattern, PatternError> {
    if pattern.is_empty() {
        return Err(PatternError::Empty);
    }
    if !pattern.starts_with('/') {
        return Err(PatternError::MissingLeadingSlash(pattern.to_string()));
    }

    let normalized = match pattern.strip_suffix('/') {
        Some(stripped) if pattern != "/" => stripped,
        _ => pattern,
    };

    let segments: Vec<Segment> = normalized[1..].split('/').map(Segment::parse).collect();
    let has_param = segments.iter().any(Segment::is_parameter);

    Ok(CompiledPattern {
        pattern: normalized.to_string(),
        segments,
        has_param,
    })
}
