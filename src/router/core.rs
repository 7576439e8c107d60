//! Router core module - hot path for request routing.
//!
//! Resolution is a linear scan of the candidate list for the request method,
//! in registration order. The first pattern that matches the whole path wins,
//! regardless of how specific later patterns are.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::pattern::{CompiledPattern, ParamVec};
use super::table::{CompiledRoute, RouteTable};
use super::RouterError;
use crate::handler::SharedHandler;

/// Result of successfully matching a request to a route
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched route
    pub route: Arc<CompiledRoute>,
    /// Path parameters in pattern order (e.g., `/users/:id` → `[("id", "123")]`)
    pub path_params: ParamVec,
}

impl RouteMatch {
    /// Get a path parameter by name
    ///
    /// Uses "last write wins" semantics: if a pattern repeats a parameter
    /// name, the rightmost segment's value is returned.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert path_params to a HashMap
    /// Note: This allocates - use get_path_param() in hot paths instead
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Compiles patterns into the route table and resolves requests against it
#[derive(Clone, Default)]
pub struct Router {
    table: RouteTable,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `pattern` once and register it under every method in `methods`
    ///
    /// `methods` is used as given; defaulting an empty list is the caller's
    /// policy (see [`crate::Dispatcher::handle`]).
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPattern`] if the pattern does not compile.
    /// Nothing is registered in that case.
    pub fn add_route(
        &mut self,
        pattern: &str,
        handler: SharedHandler,
        methods: &[&str],
    ) -> Result<Arc<CompiledRoute>, RouterError> {
        let compiled = match CompiledPattern::compile(pattern) {
            Ok(c) => c,
            Err(e) => {
                warn!(pattern = %pattern, error = %e, "Route pattern rejected");
                return Err(e);
            }
        };

        let route = Arc::new(CompiledRoute::new(compiled, handler));
        for method in methods {
            self.table.register(method, Arc::clone(&route));
        }

        info!(
            pattern = %pattern,
            regex = %route.compiled().regex_str(),
            params = ?route.compiled().param_names(),
            methods = ?methods,
            total_routes = self.table.len(),
            "Route registered"
        );

        Ok(route)
    }

    /// The underlying route table
    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Print all registered routes to stdout, in matching order per method
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.table.len());
        for (method, route) in self.table.iter() {
            println!(
                "[route] {method:<7} {} -> {}",
                route.pattern(),
                route.compiled().regex_str()
            );
        }
    }

    /// Resolve a request to a route
    ///
    /// # Errors
    ///
    /// * [`RouterError::MethodNotAllowed`] - nothing was ever registered for `method`
    /// * [`RouterError::NotFound`] - no pattern under `method` matches `path`
    pub fn route(&self, method: &str, path: &str) -> Result<RouteMatch, RouterError> {
        debug!(method = %method, path = %path, "Route match attempt");
        let match_start = Instant::now();

        let Some(candidates) = self.table.lookup(method) else {
            warn!(method = %method, path = %path, "Method not allowed");
            return Err(RouterError::MethodNotAllowed {
                method: method.to_string(),
            });
        };

        for route in candidates {
            if let Some(path_params) = route.match_path(path) {
                let match_duration = match_start.elapsed();
                if match_duration > Duration::from_millis(1) {
                    warn!(
                        method = %method,
                        path = %path,
                        route_pattern = %route.pattern(),
                        candidates = candidates.len(),
                        duration_us = match_duration.as_micros(),
                        "Slow route matching detected"
                    );
                } else {
                    debug!(
                        method = %method,
                        path = %path,
                        route_pattern = %route.pattern(),
                        path_params = ?path_params,
                        duration_us = match_duration.as_micros(),
                        "Route matched"
                    );
                }
                return Ok(RouteMatch {
                    route: Arc::clone(route),
                    path_params,
                });
            }
        }

        warn!(
            method = %method,
            path = %path,
            candidates = candidates.len(),
            duration_us = match_start.elapsed().as_micros(),
            "No route matched"
        );

        Err(RouterError::NotFound {
            method: method.to_string(),
            path: path.to_string(),
        })
    }

    /// Every registered pattern, in registration order per method
    #[must_use]
    pub fn get_all_path_patterns(&self) -> Vec<String> {
        self.table
            .iter()
            .map(|(_, route)| route.pattern().to_string())
            .collect()
    }
}
