//! Route pattern compilation.
//!
//! A pattern is a `/`-separated template. Each non-empty segment is one of:
//!
//! - `:name` - a parameter matching one non-empty segment (`[^/]+`)
//! - `:name|<fragment>` - a parameter matching the regex `<fragment>`
//! - anything else - a literal, matched verbatim
//!
//! The compiled regex is anchored at both ends. Parameter values are bound
//! positionally: capture group *i* feeds parameter name *i*, so a custom
//! fragment must not introduce capture groups of its own (use `(?:...)`).

use regex::Regex;
use smallvec::SmallVec;
use std::sync::Arc;

use super::RouterError;

/// Regex used for a bare `:name` segment
pub const DEFAULT_SEGMENT_REGEX: &str = "[^/]+";

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated path parameter storage, in pattern order.
///
/// Names are `Arc<str>` shared with the compiled pattern; values are
/// per-request data taken from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// A route pattern compiled into an anchored regex plus its parameter names
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pattern: String,
    regex: Regex,
    param_names: Vec<Arc<str>>,
}

impl CompiledPattern {
    /// Compile a route pattern
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPattern`] when the generated expression is
    /// not a valid regex, typically because of a malformed custom fragment.
    ///
    /// # Example
    ///
    /// ```rust
    /// use feather::router::CompiledPattern;
    ///
    /// let p = CompiledPattern::compile("/users/:id|[0-9]+").unwrap();
    /// assert_eq!(p.regex_str(), "^/users/([0-9]+)$");
    /// assert!(p.is_match("/users/42"));
    /// assert!(!p.is_match("/users/bob"));
    /// ```
    pub fn compile(pattern: &str) -> Result<Self, RouterError> {
        let (expr, param_names) = pattern_to_regex(pattern);
        let regex = Regex::new(&expr).map_err(|e| RouterError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            param_names: param_names.into_iter().map(Arc::from).collect(),
        })
    }

    /// The pattern as it was registered
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The generated regex source
    #[must_use]
    pub fn regex_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Parameter names in capture-group order
    #[must_use]
    pub fn param_names(&self) -> &[Arc<str>] {
        &self.param_names
    }

    /// Whether `path` matches the whole pattern
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Match `path` and bind each parameter name to its capture group
    ///
    /// Returns `None` when the path does not match. A group that did not
    /// participate in the match binds an empty string.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<ParamVec> {
        let caps = self.regex.captures(path)?;
        let mut params = ParamVec::new();
        for (i, name) in self.param_names.iter().enumerate() {
            let value = caps.get(i + 1).map(|m| m.as_str()).unwrap_or("");
            params.push((Arc::clone(name), value.to_string()));
        }
        Some(params)
    }
}

/// Build the regex source and parameter list for a pattern without compiling it
///
/// Empty segments are dropped, so `//a//b/` and `/a/b` produce the same
/// expression.
pub(crate) fn pattern_to_regex(pattern: &str) -> (String, Vec<String>) {
    let mut fragments: Vec<String> = Vec::new();
    let mut param_names = Vec::new();

    for segment in pattern.split('/').filter(|s| !s.is_empty()) {
        match segment.split_once('|') {
            None if segment.starts_with(':') => {
                fragments.push(format!("({DEFAULT_SEGMENT_REGEX})"));
                param_names.push(segment[1..].to_string());
            }
            Some((name, fragment)) if name.starts_with(':') => {
                fragments.push(format!("({fragment})"));
                param_names.push(name[1..].to_string());
            }
            _ => fragments.push(regex::escape(segment)),
        }
    }

    let mut expr = String::with_capacity(pattern.len() + 16);
    expr.push_str("^/");
    expr.push_str(&fragments.join("/"));
    expr.push('$');

    (expr, param_names)
}
