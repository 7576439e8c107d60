//! # Context Module
//!
//! [`RequestContext`] is the single mutable value every stage of a request
//! works on: middleware, the route handler and post-hooks all receive
//! `&mut RequestContext`.
//!
//! ## Example
//!
//! ```rust
//! use feather::context::{Cookie, RequestContext};
//! use feather::router::ParamVec;
//! use feather::server::ParsedRequest;
//!
//! let req = ParsedRequest::new("GET", "/greet?name=Ada");
//! let mut ctx = RequestContext::new(req, ParamVec::new());
//!
//! let name = ctx.query("name").unwrap_or_default();
//! ctx.set_cookie(&Cookie::new("seen", "1").path("/"));
//! ctx.text(200, format!("hello {name}"));
//!
//! let resp = ctx.into_response();
//! assert_eq!(resp.status, 200);
//! assert_eq!(resp.body_text(), "hello Ada");
//! assert_eq!(resp.get_header("set-cookie"), Some("seen=1; Path=/"));
//! ```

mod cookie;
mod core;
mod files;

pub use cookie::{Cookie, SameSite};
pub use core::RequestContext;
pub use files::{content_type, render_template};
