use may_minihttp::Response;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::warn;

use super::request::HeaderVec;

/// Response being built for one request
///
/// Handlers and middleware write into this through
/// [`crate::RequestContext`]; the transport serializes it once the pipeline
/// has finished. Status defaults to `200`.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers, in insertion order; names keep their given case
    pub headers: HeaderVec,
    /// Response body
    pub body: Vec<u8>,
}

impl Default for HandlerResponse {
    fn default() -> Self {
        Self {
            status: 200,
            headers: HeaderVec::new(),
            body: Vec::new(),
        }
    }
}

impl HandlerResponse {
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// A `text/plain` response whose body is `message` plus a newline
    #[must_use]
    pub fn plain_error(status: u16, message: &str) -> Self {
        let mut resp = Self::new(status);
        resp.set_header("Content-Type", "text/plain; charset=utf-8".to_string());
        resp.set_header("X-Content-Type-Options", "nosniff".to_string());
        resp.body = format!("{message}\n").into_bytes();
        resp
    }

    /// Get the first header value by name (case-insensitive)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All values of a header, in insertion order
    pub fn get_header_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Replace every value of a header with `value`
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }

    /// Append a header value, keeping existing ones
    pub fn add_header(&mut self, name: &str, value: String) {
        self.headers.push((Arc::from(name), value));
    }

    /// Body as UTF-8 text (lossy)
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Canonical reason phrase for a status code
pub(crate) fn status_reason(status: u16) -> &'static str {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
}

/// Upper bound on distinct header lines kept for the transport
///
/// `may_minihttp` only accepts `&'static str` headers, so every distinct
/// line is leaked once and reused afterwards. Past this many lines, new
/// ones are dropped instead of leaked.
pub const MAX_HEADER_LINES: usize = 4096;

/// Set of leaked header lines with a fixed capacity
#[derive(Debug)]
pub(crate) struct HeaderLineTable {
    lines: HashSet<&'static str>,
    capacity: usize,
}

impl HeaderLineTable {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: HashSet::new(),
            capacity,
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.lines.len()
    }

    /// Static copy of `name: value`, or `None` once the table is full and
    /// the line has not been seen before
    pub(crate) fn intern(&mut self, name: &str, value: &str) -> Option<&'static str> {
        let line = format!("{name}: {value}");
        if let Some(existing) = self.lines.get(line.as_str()).copied() {
            return Some(existing);
        }
        if self.lines.len() >= self.capacity {
            return None;
        }
        let leaked: &'static str = Box::leak(line.into_boxed_str());
        self.lines.insert(leaked);
        Some(leaked)
    }
}

static HEADER_LINES: Lazy<Mutex<HeaderLineTable>> =
    Lazy::new(|| Mutex::new(HeaderLineTable::with_capacity(MAX_HEADER_LINES)));

// Content-Length and Date are written by may_minihttp itself
const TRANSPORT_OWNED_HEADERS: [&str; 2] = ["content-length", "date"];

fn intern_header_line(name: &str, value: &str) -> Option<&'static str> {
    let mut lines = match HEADER_LINES.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    lines.intern(name, value)
}

/// Write a [`HandlerResponse`] into the transport response
pub fn write_handler_response(res: &mut Response, resp: HandlerResponse) {
    res.status_code(resp.status as usize, status_reason(resp.status));
    for (name, value) in &resp.headers {
        if TRANSPORT_OWNED_HEADERS
            .iter()
            .any(|h| name.eq_ignore_ascii_case(h))
        {
            continue;
        }
        if value.contains(['\r', '\n']) {
            warn!(header = %name, "Dropping response header containing a line break");
            continue;
        }
        match intern_header_line(name, value) {
            Some(line) => {
                res.header(line);
            }
            None => warn!(
                header = %name,
                limit = MAX_HEADER_LINES,
                "Dropping response header: too many distinct header lines"
            ),
        }
    }
    res.body_vec(resp.body);
}
