use may_minihttp::Request;
use percent_encoding::percent_decode_str;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, info};

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage
///
/// Names are `Arc<str>`; request header names are stored lowercase.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Transport-neutral view of an inbound HTTP request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRequest {
    /// HTTP method, exactly as received (`GET`, `POST`, ...)
    pub method: String,
    /// Percent-decoded request path without the query string
    pub path: String,
    /// Raw query string (without the leading `?`)
    pub query: String,
    /// HTTP headers (lowercase names)
    pub headers: HeaderVec,
    /// Raw request body
    pub body: Vec<u8>,
}

impl ParsedRequest {
    /// Build a request from a method and a target that may carry a query string
    ///
    /// The target is taken as it appears on the wire, so the path is
    /// percent-decoded and the query string is kept raw.
    ///
    /// ```rust
    /// use feather::server::ParsedRequest;
    ///
    /// let req = ParsedRequest::new("GET", "/search%20all?q=rust");
    /// assert_eq!(req.path, "/search all");
    /// assert_eq!(req.query, "q=rust");
    /// ```
    #[must_use]
    pub fn new(method: &str, target: &str) -> Self {
        let (path, query) = split_target(target);
        Self {
            method: method.to_string(),
            path: decode_path(path),
            query: query.to_string(),
            headers: HeaderVec::new(),
            body: Vec::new(),
        }
    }

    /// Add a header (name is lowercased)
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .push((Arc::from(name.to_ascii_lowercase()), value.to_string()));
        self
    }

    /// Replace the body
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn split_target(target: &str) -> (&str, &str) {
    match target.split_once('?') {
        Some((path, query)) => (if path.is_empty() { "/" } else { path }, query),
        None => (if target.is_empty() { "/" } else { target }, ""),
    }
}

/// Percent-decode a request path
///
/// `+` stays literal and `%2F` becomes `/` before matching. Malformed
/// escapes are kept as-is and invalid UTF-8 is replaced.
pub fn decode_path(path: &str) -> String {
    percent_decode_str(path).decode_utf8_lossy().into_owned()
}

/// Parse cookies out of a `Cookie` header value
pub fn parse_cookies(header: &str) -> HashMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let name = parts.next()?.trim();
            if name.is_empty() {
                return None;
            }
            let value = parts.next().unwrap_or("").trim().trim_matches('"');
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

/// Decode an `application/x-www-form-urlencoded` string (query string or body)
pub fn parse_query_params(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Extract a [`ParsedRequest`] from a `may_minihttp::Request`.
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = req.method().to_string();
    let (path, query) = split_target(req.path());
    let (path, query) = (decode_path(path), query.to_string());

    let headers: HeaderVec = req
        .headers()
        .iter()
        .map(|h| {
            (
                Arc::from(h.name.to_ascii_lowercase()),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    debug!(
        header_count = headers.len(),
        header_names = ?headers.iter().take(20).map(|(k, _)| k.as_ref()).collect::<Vec<_>>(),
        "Headers extracted"
    );

    let mut body = Vec::new();
    if let Err(e) = req.body().read_to_end(&mut body) {
        debug!(error = %e, "Request body read failed; continuing with empty body");
        body.clear();
    }

    info!(
        method = %method,
        path = %path,
        query_len = query.len(),
        headers_count = headers.len(),
        body_size_bytes = body.len(),
        "HTTP request parsed"
    );

    ParsedRequest {
        method,
        path,
        query,
        headers,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cookies() {
        let cookies = parse_cookies("a=b; c=d; session=\"xyz\"; =skip");
        assert_eq!(cookies.get("a"), Some(&"b".to_string()));
        assert_eq!(cookies.get("c"), Some(&"d".to_string()));
        assert_eq!(cookies.get("session"), Some(&"xyz".to_string()));
        assert_eq!(cookies.len(), 3);
    }

    #[test]
    fn test_parse_query_params() {
        let q = parse_query_params("x=1&y=hello%20world&z=a+b");
        assert_eq!(q.get("x"), Some(&"1".to_string()));
        assert_eq!(q.get("y"), Some(&"hello world".to_string()));
        assert_eq!(q.get("z"), Some(&"a b".to_string()));
    }

    #[test]
    fn test_split_target() {
        assert_eq!(split_target("/p?x=1"), ("/p", "x=1"));
        assert_eq!(split_target("/p"), ("/p", ""));
        assert_eq!(split_target("?x=1"), ("/", "x=1"));
        assert_eq!(split_target(""), ("/", ""));
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/users/J%C3%B6rg"), "/users/Jörg");
        assert_eq!(decode_path("/a%20b/c+d"), "/a b/c+d");
        assert_eq!(decode_path("/bad%zz/%"), "/bad%zz/%");
        assert_eq!(decode_path("/%FF"), "/\u{FFFD}");
    }

    #[test]
    fn test_new_decodes_path_but_not_query() {
        let req = ParsedRequest::new("GET", "/files/a%2Fb?name=x%20y");
        assert_eq!(req.path, "/files/a/b");
        assert_eq!(req.query, "name=x%20y");
    }

    #[test]
    fn test_headers_lowercased_and_case_insensitive() {
        let req = ParsedRequest::new("GET", "/").with_header("X-Token", "abc");
        assert_eq!(&*req.headers[0].0, "x-token");
        assert_eq!(req.get_header("X-TOKEN"), Some("abc"));
    }
}
