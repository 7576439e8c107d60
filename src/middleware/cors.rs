use http::Method;
use tracing::debug;

use crate::context::RequestContext;
use crate::handler::Handler;

/// CORS (Cross-Origin Resource Sharing) middleware
///
/// Adds the `Access-Control-Allow-*` headers to every response that reaches
/// the pipeline. A preflight `OPTIONS` request is answered `200` on the spot
/// and the request is aborted, so no route handler runs for it.
///
/// The route table still decides whether a preflight reaches the middleware:
/// an `OPTIONS` route must be registered for the path, otherwise the
/// dispatcher answers `405` before any middleware runs.
#[derive(Debug, Clone)]
pub struct CorsMiddleware {
    allowed_origins: Vec<String>,
    allowed_headers: Vec<String>,
    allowed_methods: Vec<Method>,
}

impl CorsMiddleware {
    /// Create a CORS middleware with an explicit policy
    ///
    /// ```rust
    /// use feather::middleware::CorsMiddleware;
    /// use http::Method;
    ///
    /// let cors = CorsMiddleware::new(
    ///     vec!["https://example.com".to_string()],
    ///     vec!["Content-Type".to_string()],
    ///     vec![Method::GET, Method::POST],
    /// );
    /// assert_eq!(cors.allow_methods_value(), "GET, POST");
    /// ```
    #[must_use]
    pub fn new(
        allowed_origins: Vec<String>,
        allowed_headers: Vec<String>,
        allowed_methods: Vec<Method>,
    ) -> Self {
        Self {
            allowed_origins,
            allowed_headers,
            allowed_methods,
        }
    }

    #[must_use]
    pub fn allow_origin_value(&self) -> String {
        self.allowed_origins.join(", ")
    }

    #[must_use]
    pub fn allow_headers_value(&self) -> String {
        self.allowed_headers.join(", ")
    }

    #[must_use]
    pub fn allow_methods_value(&self) -> String {
        self.allowed_methods
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Permissive policy for development: any origin, the common verbs,
/// `Content-Type` and `Authorization`
impl Default for CorsMiddleware {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".into()],
            allowed_headers: vec!["Content-Type".into(), "Authorization".into()],
            allowed_methods: vec![
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ],
        }
    }
}

impl Handler for CorsMiddleware {
    fn call(&self, ctx: &mut RequestContext) {
        let response = ctx.response_mut();
        response.set_header("Access-Control-Allow-Origin", self.allow_origin_value());
        response.set_header("Access-Control-Allow-Methods", self.allow_methods_value());
        response.set_header("Access-Control-Allow-Headers", self.allow_headers_value());

        if ctx.method() == Method::OPTIONS.as_str() {
            debug!(
                request_id = %ctx.request_id(),
                path = %ctx.path(),
                "CORS preflight answered"
            );
            ctx.status(200);
            ctx.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::ParamVec;
    use crate::server::ParsedRequest;

    #[test]
    fn test_headers_added_without_abort() {
        let mut ctx = RequestContext::new(ParsedRequest::new("GET", "/"), ParamVec::new());
        CorsMiddleware::default().call(&mut ctx);
        assert!(!ctx.is_aborted());
        let r = ctx.response();
        assert_eq!(r.get_header("access-control-allow-origin"), Some("*"));
        assert_eq!(
            r.get_header("access-control-allow-headers"),
            Some("Content-Type, Authorization")
        );
        assert_eq!(
            r.get_header("access-control-allow-methods"),
            Some("GET, POST, PUT, PATCH, DELETE, OPTIONS")
        );
    }

    #[test]
    fn test_preflight_aborts_with_200() {
        let mut ctx = RequestContext::new(ParsedRequest::new("OPTIONS", "/"), ParamVec::new());
        ctx.text(418, "pre-existing");
        CorsMiddleware::default().call(&mut ctx);
        assert!(ctx.is_aborted());
        assert_eq!(ctx.response().status, 200);
        assert!(ctx.response().body.is_empty());
    }
}
