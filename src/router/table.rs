use std::collections::HashMap;
use std::sync::Arc;

use super::pattern::{CompiledPattern, ParamVec};
use crate::handler::SharedHandler;

/// A compiled pattern bound to its handler
///
/// Immutable once registered. A route registered under several methods is a
/// single `CompiledRoute` shared by each method's list.
pub struct CompiledRoute {
    pattern: CompiledPattern,
    handler: SharedHandler,
}

impl CompiledRoute {
    #[must_use]
    pub fn new(pattern: CompiledPattern, handler: SharedHandler) -> Self {
        Self { pattern, handler }
    }

    /// The original pattern string
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.pattern()
    }

    #[must_use]
    pub fn compiled(&self) -> &CompiledPattern {
        &self.pattern
    }

    #[must_use]
    pub fn handler(&self) -> &SharedHandler {
        &self.handler
    }

    /// Match a path against this route, binding its parameters
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<ParamVec> {
        self.pattern.captures(path)
    }
}

impl std::fmt::Debug for CompiledRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledRoute")
            .field("pattern", &self.pattern.pattern())
            .field("regex", &self.pattern.regex_str())
            .field("params", &self.pattern.param_names())
            .finish_non_exhaustive()
    }
}

/// Method name to ordered route list
///
/// Method keys are exact and case-sensitive. Routes are never deduplicated:
/// the list keeps registration order, which is the matching precedence.
#[derive(Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, Vec<Arc<CompiledRoute>>>,
    // Methods in first-registration order, for stable listings
    methods: Vec<String>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route to the list for `method`
    pub fn register(&mut self, method: &str, route: Arc<CompiledRoute>) {
        if !self.routes.contains_key(method) {
            self.methods.push(method.to_string());
        }
        self.routes.entry(method.to_string()).or_default().push(route);
    }

    /// Routes registered for `method`, in registration order
    ///
    /// `None` means the method was never registered, which is distinct from an
    /// empty candidate list.
    #[must_use]
    pub fn lookup(&self, method: &str) -> Option<&[Arc<CompiledRoute>]> {
        self.routes.get(method).map(Vec::as_slice)
    }

    /// Registered methods in first-registration order
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(String::as_str)
    }

    /// Every `(method, route)` pair, grouped by method
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<CompiledRoute>)> {
        self.methods.iter().flat_map(move |m| {
            self.routes
                .get(m)
                .into_iter()
                .flatten()
                .map(move |r| (m.as_str(), r))
        })
    }

    /// Total number of `(method, route)` entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
