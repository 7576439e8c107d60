use minijinja::Environment;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::{error, warn};

use super::cookie::Cookie;
use super::files::{content_type, render_templates};
use crate::handler::{shared, Handler, SharedHandler};
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::router::ParamVec;
use crate::server::request::{parse_cookies, parse_query_params};
use crate::server::{HandlerResponse, ParsedRequest};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Per-request state shared by middleware, the route handler and post-hooks
///
/// A context is created by the dispatcher once a route has matched and lives
/// until the response has been handed to the transport. It is never shared
/// between requests.
///
/// Besides the request and the response under construction it carries:
///
/// - the path parameters bound by the matched route
/// - a scratch store (`set` / `get`) for passing data between stages
/// - the abort flag, which stops remaining middleware and the route handler
/// - the post-hook list, run after the handler whether or not it ran
pub struct RequestContext {
    request: ParsedRequest,
    response: HandlerResponse,
    params: ParamVec,
    request_id: RequestId,
    data: HashMap<String, Box<dyn Any + Send + Sync>>,
    aborted: bool,
    post_hooks: Vec<SharedHandler>,
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("method", &self.request.method)
            .field("path", &self.request.path)
            .field("params", &self.params)
            .field("status", &self.response.status)
            .field("aborted", &self.aborted)
            .field("data_keys", &self.data.keys().collect::<Vec<_>>())
            .field("post_hooks", &self.post_hooks.len())
            .finish()
    }
}

impl RequestContext {
    /// Create a fresh context for a matched request
    ///
    /// The request id is taken from an inbound `X-Request-Id` header when it
    /// is a valid ULID. It is not written to the response.
    #[must_use]
    pub fn new(request: ParsedRequest, params: ParamVec) -> Self {
        let request_id = RequestId::from_header_or_new(request.get_header(REQUEST_ID_HEADER));
        Self {
            request,
            response: HandlerResponse::default(),
            params,
            request_id,
            data: HashMap::new(),
            aborted: false,
            post_hooks: Vec::new(),
        }
    }

    // ---------------------------------------------------------------------
    // Pipeline control
    // ---------------------------------------------------------------------

    /// Stop the remaining middleware and skip the route handler
    ///
    /// The flag cannot be cleared for the rest of the request. Post-hooks that
    /// were already registered still run.
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Register a hook to run after the route handler
    ///
    /// Hooks run in registration order, after the handler has run or been
    /// skipped by an abort. They observe the final response.
    pub fn post<H: Handler>(&mut self, hook: H) {
        self.post_hooks.push(shared(hook));
    }

    /// Number of post-hooks waiting to run
    #[must_use]
    pub fn post_hook_count(&self) -> usize {
        self.post_hooks.len()
    }

    pub(crate) fn take_post_hooks(&mut self) -> Vec<SharedHandler> {
        std::mem::take(&mut self.post_hooks)
    }

    // ---------------------------------------------------------------------
    // Scratch store
    // ---------------------------------------------------------------------

    /// Store a value under `key`, replacing any previous value
    pub fn set<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.data.insert(key.into(), Box::new(value));
    }

    /// Read a value stored under `key`
    ///
    /// Returns `None` when the key is absent or holds a different type.
    #[must_use]
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.data.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    #[must_use]
    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.data.get_mut(key).and_then(|v| v.downcast_mut::<T>())
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Remove and return a value; a value of another type is left in place
    pub fn remove<T: Any>(&mut self, key: &str) -> Option<T> {
        if !self.data.get(key).is_some_and(|v| v.is::<T>()) {
            return None;
        }
        self.data
            .remove(key)
            .and_then(|v| v.downcast::<T>().ok())
            .map(|b| *b)
    }

    // ---------------------------------------------------------------------
    // Request accessors
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn request(&self) -> &ParsedRequest {
        &self.request
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    #[must_use]
    pub fn method(&self) -> &str {
        &self.request.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.request.path
    }

    /// Value bound to a path parameter (last occurrence wins)
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn params(&self) -> &ParamVec {
        &self.params
    }

    /// Path parameters as a map
    /// Note: This allocates - use param() in hot paths instead
    #[must_use]
    pub fn params_map(&self) -> HashMap<String, String> {
        self.params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    /// First value of a query string parameter, URL-decoded
    #[must_use]
    pub fn query(&self, key: &str) -> Option<String> {
        url::form_urlencoded::parse(self.request.query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// All query string parameters (last value wins on repeats)
    #[must_use]
    pub fn query_map(&self) -> HashMap<String, String> {
        parse_query_params(&self.request.query)
    }

    /// Request header value (case-insensitive)
    #[must_use]
    pub fn header(&self, key: &str) -> Option<&str> {
        self.request.get_header(key)
    }

    /// Value of a request cookie
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.header("cookie")
            .and_then(|h| parse_cookies(h).remove(name))
    }

    /// Raw request body
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.request.body
    }

    /// Deserialize the request body as JSON
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the body is not valid JSON for `T`.
    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.request.body)
    }

    /// Form field value
    ///
    /// A urlencoded request body takes precedence over the query string.
    #[must_use]
    pub fn form_value(&self, key: &str) -> Option<String> {
        let is_form = self
            .header("content-type")
            .is_some_and(|ct| ct.trim_start().starts_with(FORM_CONTENT_TYPE));
        if is_form {
            let from_body = url::form_urlencoded::parse(&self.request.body)
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned());
            if from_body.is_some() {
                return from_body;
            }
        }
        self.query(key)
    }

    /// Client address as reported by a fronting proxy
    ///
    /// Uses the first entry of `X-Forwarded-For`, then `X-Real-IP`.
    #[must_use]
    pub fn client_ip(&self) -> Option<&str> {
        self.header("x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .or_else(|| self.header("x-real-ip").map(str::trim))
    }

    // ---------------------------------------------------------------------
    // Response writers
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn response(&self) -> &HandlerResponse {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut HandlerResponse {
        &mut self.response
    }

    /// Hand the finished response to the transport
    #[must_use]
    pub fn into_response(self) -> HandlerResponse {
        self.response
    }

    /// Serialize `value` as the JSON body
    ///
    /// A serialization failure is logged and answered with `500`.
    pub fn json<T: Serialize + ?Sized>(&mut self, status: u16, value: &T) {
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                self.write(status, "application/json", bytes);
            }
            Err(e) => {
                error!(
                    request_id = %self.request_id,
                    error = %e,
                    "JSON response serialization failed"
                );
                self.error(500, "Internal Server Error");
            }
        }
    }

    /// Plain text body
    pub fn text(&mut self, status: u16, body: impl Into<String>) {
        self.write(status, "text/plain; charset=utf-8", body.into().into_bytes());
    }

    /// HTML body
    pub fn html(&mut self, status: u16, body: impl Into<String>) {
        self.write(status, "text/html; charset=utf-8", body.into().into_bytes());
    }

    /// Send a file, with its content type guessed from the extension
    ///
    /// A missing or unreadable file is answered with `404 File not found`.
    pub fn file(&mut self, status: u16, path: impl AsRef<Path>) {
        let path = path.as_ref();
        match std::fs::read(path) {
            Ok(bytes) => self.write(status, content_type(path), bytes),
            Err(e) => {
                warn!(
                    request_id = %self.request_id,
                    file = %path.display(),
                    error = %e,
                    "File response failed"
                );
                self.error(404, "File not found");
            }
        }
    }

    /// Render a minijinja template file as the HTML body
    ///
    /// Keeps the current status. A read or render failure is answered with
    /// `500` and the error message.
    pub fn template<S: Serialize + ?Sized>(&mut self, path: impl AsRef<Path>, data: &S) {
        self.template_files(&[path], data, |_| {});
    }

    /// Like [`template`](Self::template), for a page made of several files
    ///
    /// The first file is rendered; the rest are available to it by file
    /// name for `extends` and `include`. `configure` can register filters
    /// and functions on the environment first.
    pub fn template_files<P, S, F>(&mut self, paths: &[P], data: &S, configure: F)
    where
        P: AsRef<Path>,
        S: Serialize + ?Sized,
        F: FnOnce(&mut Environment<'_>),
    {
        match render_templates(paths, data, configure) {
            Ok(rendered) => {
                let status = self.response.status;
                self.html(status, rendered);
            }
            Err(e) => {
                error!(
                    request_id = %self.request_id,
                    templates = ?paths.iter().map(|p| p.as_ref().display().to_string()).collect::<Vec<_>>(),
                    error = %e,
                    "Template rendering failed"
                );
                self.error(500, &e.to_string());
            }
        }
    }

    /// Set the status code and clear the body
    pub fn status(&mut self, status: u16) {
        self.response.status = status;
        self.response.body.clear();
    }

    /// Redirect the client to `url`
    pub fn redirect(&mut self, status: u16, url: &str) {
        self.response.set_header("Location", url.to_string());
        self.status(status);
    }

    /// Plain-text error response; `message` becomes the body
    pub fn error(&mut self, status: u16, message: &str) {
        let HandlerResponse { headers, body, .. } = HandlerResponse::plain_error(status, message);
        for (name, value) in headers {
            self.response.set_header(&name, value);
        }
        self.response.status = status;
        self.response.body = body;
    }

    /// Append a response header, keeping existing values
    pub fn set_header(&mut self, key: &str, value: impl Into<String>) {
        self.response.add_header(key, value.into());
    }

    /// Replace the `Content-Type` header
    pub fn content_type(&mut self, value: &str) {
        self.response.set_header("Content-Type", value.to_string());
    }

    /// Add a `Set-Cookie` header
    pub fn set_cookie(&mut self, cookie: &Cookie) {
        self.response.add_header("Set-Cookie", cookie.to_string());
    }

    fn write(&mut self, status: u16, content_type: &str, body: Vec<u8>) {
        self.response.set_header("Content-Type", content_type.to_string());
        self.response.status = status;
        self.response.body = body;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn ctx(req: ParsedRequest) -> RequestContext {
        RequestContext::new(req, ParamVec::new())
    }

    #[test]
    fn test_abort_is_one_way() {
        let mut c = ctx(ParsedRequest::new("GET", "/"));
        assert!(!c.is_aborted());
        c.abort();
        c.abort();
        assert!(c.is_aborted());
    }

    #[test]
    fn test_scratch_store_is_typed() {
        let mut c = ctx(ParsedRequest::new("GET", "/"));
        c.set("user", "alice".to_string());
        c.set("count", 3u32);
        assert_eq!(c.get::<String>("user").map(String::as_str), Some("alice"));
        assert_eq!(c.get::<u32>("count"), Some(&3));
        assert!(c.get::<u64>("count").is_none());
        *c.get_mut::<u32>("count").unwrap() += 1;
        assert_eq!(c.remove::<String>("count"), None);
        assert_eq!(c.remove::<u32>("count"), Some(4));
        assert!(!c.contains("count"));
    }

    #[test]
    fn test_scratch_keys_collide() {
        let mut c = ctx(ParsedRequest::new("GET", "/"));
        c.set("k", 1i32);
        c.set("k", "two");
        assert!(c.get::<i32>("k").is_none());
        assert_eq!(c.get::<&str>("k"), Some(&"two"));
    }

    #[test]
    fn test_params_lookup() {
        let mut params = ParamVec::new();
        params.push((Arc::from("id"), "7".to_string()));
        let c = RequestContext::new(ParsedRequest::new("GET", "/u/7"), params);
        assert_eq!(c.param("id"), Some("7"));
        assert_eq!(c.param("missing"), None);
        assert_eq!(c.params_map().get("id"), Some(&"7".to_string()));
    }

    #[test]
    fn test_request_id_reused_but_not_written() {
        let id = RequestId::new();
        let c = ctx(ParsedRequest::new("GET", "/").with_header("X-Request-Id", &id.to_string()));
        assert_eq!(c.request_id(), id);
        assert!(c.response().headers.is_empty());
    }

    #[test]
    fn test_error_sets_plain_text() {
        let mut c = ctx(ParsedRequest::new("GET", "/"));
        c.json(200, &serde_json::json!({"ok": true}));
        c.error(400, "bad input");
        let r = c.into_response();
        assert_eq!(r.status, 400);
        assert_eq!(r.body_text(), "bad input\n");
        assert_eq!(r.get_header_all("content-type").count(), 1);
        assert_eq!(r.get_header("x-content-type-options"), Some("nosniff"));
    }
}
