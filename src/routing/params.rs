//! Per-request path parameter bindings.

use axum::http::Request;

use crate::routing::pattern::PARAM_MARKER;

/// Values captured from the request path, keyed by parameter name.
///
/// Names carry their `:` marker. Lookups accept either form, so
/// `get(":id")` and `get("id")` are equivalent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`, replacing an earlier binding of the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let bare = name.strip_prefix(PARAM_MARKER).unwrap_or(name);
        self.entries
            .iter()
            .find(|(n, _)| n.strip_prefix(PARAM_MARKER).unwrap_or(n) == bare)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// Read path parameters from a dispatched request.
pub trait RequestParamsExt {
    /// Bindings captured by the matched route, if the request was routed.
    fn params(&self) -> Option<&Params>;

    /// Value bound to `name` (`":id"` or `"id"`).
    fn param(&self, name: &str) -> Option<&str> {
        self.params().and_then(|p| p.get(name))
    }
}

impl<B> RequestParamsExt for Request<B> {
    fn params(&self) -> Option<&Params> {
        self.extensions().get::<Params>()
    }
}
