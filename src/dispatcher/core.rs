//! Dispatcher core module - hot path for request dispatch.
//!
//! `serve` resolves the route, then runs the pipeline on one context:
//! middleware in order (stopping at the first abort), the route handler when
//! not aborted, then every post-hook in registration order.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::context::RequestContext;
use crate::handler::{shared, Handler, SharedHandler};
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::router::{CompiledRoute, RouteMatch, Router, RouterError};
use crate::server::{HandlerResponse, ParsedRequest};

/// Method a route is registered under when no methods are given
pub const DEFAULT_METHOD: &str = "GET";

/// Route table plus the global middleware chain
///
/// Built mutably at startup, then shared read-only (`Arc<Dispatcher>`) by the
/// transport for the lifetime of the server.
///
/// ```rust
/// use feather::{Dispatcher, RequestContext};
/// use feather::server::ParsedRequest;
///
/// let mut app = Dispatcher::new();
/// app.get("/hello/:name", |ctx: &mut RequestContext| {
///     let name = ctx.param("name").unwrap_or("world").to_string();
///     ctx.text(200, format!("hello {name}"));
/// })
/// .unwrap();
///
/// let resp = app.serve(ParsedRequest::new("GET", "/hello/ada"));
/// assert_eq!(resp.status, 200);
/// assert_eq!(resp.body_text(), "hello ada");
///
/// assert_eq!(app.serve(ParsedRequest::new("GET", "/nope")).status, 404);
/// assert_eq!(app.serve(ParsedRequest::new("DELETE", "/hello/ada")).status, 405);
/// ```
#[derive(Clone, Default)]
pub struct Dispatcher {
    router: Router,
    middlewares: Vec<SharedHandler>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `pattern` under each of `methods`
    ///
    /// An empty `methods` slice registers the route for `GET` only.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPattern`] when the pattern does not
    /// compile. Callers are expected to treat this as a startup failure.
    pub fn handle<H: Handler>(
        &mut self,
        pattern: &str,
        handler: H,
        methods: &[&str],
    ) -> Result<Arc<CompiledRoute>, RouterError> {
        let methods = if methods.is_empty() {
            &[DEFAULT_METHOD][..]
        } else {
            methods
        };
        self.router.add_route(pattern, shared(handler), methods)
    }

    /// Register a `GET` route
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::handle`].
    pub fn get<H: Handler>(
        &mut self,
        pattern: &str,
        handler: H,
    ) -> Result<Arc<CompiledRoute>, RouterError> {
        self.handle(pattern, handler, &["GET"])
    }

    /// Register a `POST` route
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::handle`].
    pub fn post<H: Handler>(
        &mut self,
        pattern: &str,
        handler: H,
    ) -> Result<Arc<CompiledRoute>, RouterError> {
        self.handle(pattern, handler, &["POST"])
    }

    /// Register a `PUT` route
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::handle`].
    pub fn put<H: Handler>(
        &mut self,
        pattern: &str,
        handler: H,
    ) -> Result<Arc<CompiledRoute>, RouterError> {
        self.handle(pattern, handler, &["PUT"])
    }

    /// Register a `PATCH` route
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::handle`].
    pub fn patch<H: Handler>(
        &mut self,
        pattern: &str,
        handler: H,
    ) -> Result<Arc<CompiledRoute>, RouterError> {
        self.handle(pattern, handler, &["PATCH"])
    }

    /// Register a `DELETE` route
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::handle`].
    pub fn delete<H: Handler>(
        &mut self,
        pattern: &str,
        handler: H,
    ) -> Result<Arc<CompiledRoute>, RouterError> {
        self.handle(pattern, handler, &["DELETE"])
    }

    /// Append a middleware to the global chain
    pub fn add_middleware<H: Handler>(&mut self, middleware: H) {
        self.middlewares.push(shared(middleware));
        debug!(
            middleware_count = self.middlewares.len(),
            "Middleware registered"
        );
    }

    /// Append several middleware at once, keeping their order
    pub fn add_middlewares<I>(&mut self, middlewares: I)
    where
        I: IntoIterator<Item = SharedHandler>,
    {
        self.middlewares.extend(middlewares);
        debug!(
            middleware_count = self.middlewares.len(),
            "Middleware registered"
        );
    }

    #[must_use]
    pub fn middleware_count(&self) -> usize {
        self.middlewares.len()
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Resolve `(method, path)` without running anything
    ///
    /// # Errors
    ///
    /// [`RouterError::MethodNotAllowed`] or [`RouterError::NotFound`].
    pub fn dispatch(&self, method: &str, path: &str) -> Result<RouteMatch, RouterError> {
        self.router.route(method, path)
    }

    /// Run one request through the full pipeline and return its response
    ///
    /// Unknown methods get `405` and unmatched paths `404`; neither runs any
    /// middleware. Otherwise middleware and the handler fully control the
    /// response.
    pub fn serve(&self, request: ParsedRequest) -> HandlerResponse {
        let start = Instant::now();

        let route_match = match self.dispatch(&request.method, &request.path) {
            Ok(m) => m,
            Err(e) => return self.reject(&request, &e),
        };
        let RouteMatch { route, path_params } = route_match;

        let mut ctx = RequestContext::new(request, path_params);
        let request_id = ctx.request_id();

        debug!(
            request_id = %request_id,
            method = %ctx.method(),
            path = %ctx.path(),
            route_pattern = %route.pattern(),
            "Dispatch start"
        );

        let mut middleware_run = 0usize;
        for middleware in &self.middlewares {
            middleware.call(&mut ctx);
            middleware_run += 1;
            if ctx.is_aborted() {
                debug!(
                    request_id = %request_id,
                    middleware_index = middleware_run - 1,
                    "Middleware aborted request"
                );
                break;
            }
        }

        if !ctx.is_aborted() {
            route.handler().call(&mut ctx);
        }

        let post_hooks_run = run_post_hooks(&mut ctx);
        let aborted = ctx.is_aborted();
        let response = ctx.into_response();

        info!(
            request_id = %request_id,
            route_pattern = %route.pattern(),
            status = response.status,
            aborted = aborted,
            middleware_run = middleware_run,
            post_hooks_run = post_hooks_run,
            duration_us = start.elapsed().as_micros(),
            "Dispatch complete"
        );

        response
    }

    /// Start an HTTP server on `addr` and block until it stops
    ///
    /// # Errors
    ///
    /// Returns the bind error when the address is unavailable.
    pub fn listen(self, addr: &str) -> std::io::Result<()> {
        use crate::server::{FeatherService, HttpServer};

        let service = FeatherService::new(Arc::new(self));
        let handle = HttpServer(service).start(addr)?;
        info!(addr = %addr, "Listening");
        handle
            .join()
            .map_err(|_| std::io::Error::other("server coroutine panicked"))
    }

    fn reject(&self, request: &ParsedRequest, err: &RouterError) -> HandlerResponse {
        let status = err.status();
        let request_id = RequestId::from_header_or_new(request.get_header(REQUEST_ID_HEADER));
        warn!(
            request_id = %request_id,
            method = %request.method,
            path = %request.path,
            status = status,
            "Request rejected before pipeline"
        );
        HandlerResponse::plain_error(status, crate::server::response::status_reason(status))
    }
}

/// Run the context's post-hooks in registration order
///
/// Hooks registered by a running post-hook are appended and run too.
fn run_post_hooks(ctx: &mut RequestContext) -> usize {
    let mut ran = 0;
    loop {
        let hooks = ctx.take_post_hooks();
        if hooks.is_empty() {
            return ran;
        }
        for hook in hooks {
            hook.call(ctx);
            ran += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_empty_methods_default_to_get() {
        let mut d = Dispatcher::new();
        d.handle("/x", |ctx: &mut RequestContext| ctx.status(204), &[])
            .unwrap();
        assert_eq!(d.serve(ParsedRequest::new("GET", "/x")).status, 204);
        assert!(matches!(
            d.dispatch("POST", "/x"),
            Err(RouterError::MethodNotAllowed { .. })
        ));
    }

    #[test]
    fn test_rejections_carry_reason() {
        let mut d = Dispatcher::new();
        d.post("/only-post", |_: &mut RequestContext| {}).unwrap();

        let resp = d.serve(ParsedRequest::new("GET", "/only-post"));
        assert_eq!(resp.status, 405);
        assert_eq!(resp.body_text(), "Method Not Allowed\n");
        assert!(resp.get_header(REQUEST_ID_HEADER).is_none());

        let resp = d.serve(ParsedRequest::new("POST", "/elsewhere"));
        assert_eq!(resp.status, 404);
        assert_eq!(resp.body_text(), "Not Found\n");
    }

    #[test]
    fn test_post_hook_registered_by_post_hook_runs() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut d = Dispatcher::new();
        let s = Arc::clone(&seen);
        d.get("/", move |ctx: &mut RequestContext| {
            let s1 = Arc::clone(&s);
            ctx.post(move |ctx: &mut RequestContext| {
                s1.lock().unwrap().push("first");
                let s2 = Arc::clone(&s1);
                ctx.post(move |_: &mut RequestContext| s2.lock().unwrap().push("nested"));
            });
        })
        .unwrap();
        d.serve(ParsedRequest::new("GET", "/"));
        assert_eq!(*seen.lock().unwrap(), vec!["first", "nested"]);
    }
}
