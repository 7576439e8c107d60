//! # Router Module
//!
//! Path matching and route resolution using regex-based matchers.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling route patterns (`/users/:id|[0-9]+`) into anchored regexes
//! - Keeping a per-method, insertion-ordered route table
//! - Resolving `(method, path)` to a route and its path parameters
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Compilation**: At registration, each pattern becomes a regex such as
//!    `^/users/([0-9]+)$` plus the ordered parameter names `["id"]`. A pattern
//!    that produces an invalid regex is rejected with
//!    [`RouterError::InvalidPattern`].
//!
//! 2. **Matching**: For each request, the candidates for the method are tested
//!    in registration order and the first full match wins. Capture group *i*
//!    binds parameter name *i*.
//!
//! ## Example
//!
//! ```rust
//! use feather::router::{Router, RouterError};
//! use feather::{shared, RequestContext};
//!
//! let mut router = Router::new();
//! router
//!     .add_route("/pets/:id|[0-9]+", shared(|_: &mut RequestContext| {}), &["GET"])
//!     .unwrap();
//!
//! let m = router.route("GET", "/pets/42").unwrap();
//! assert_eq!(m.get_path_param("id"), Some("42"));
//!
//! assert!(matches!(router.route("GET", "/pets/rex"), Err(RouterError::NotFound { .. })));
//! assert!(matches!(router.route("POST", "/pets/42"), Err(RouterError::MethodNotAllowed { .. })));
//! ```
//!
//! ## Performance
//!
//! Matching is O(n) in the number of routes registered for the method. This is
//! deliberate: precedence is registration order, which a prefix tree would not
//! preserve.

mod core;
mod error;
mod pattern;
mod table;
#[cfg(test)]
mod tests;

pub use core::{RouteMatch, Router};
pub use error::RouterError;
pub use pattern::{CompiledPattern, ParamVec, DEFAULT_SEGMENT_REGEX, MAX_INLINE_PARAMS};
pub use table::{CompiledRoute, RouteTable};
