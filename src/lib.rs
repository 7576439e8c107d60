//! # Feather
//!
//! **Feather** is an embeddable HTTP request dispatcher. It maps an incoming
//! `(method, path)` pair to a registered handler, binds the parameters
//! embedded in the path, and runs a chain of middleware around the handler.
//! Connections are served by `may_minihttp` on the `may` coroutine runtime.
//!
//! ## Architecture
//!
//! - **[`router`]** - Pattern compiler and the per-method, insertion-ordered route table
//! - **[`dispatcher`]** - Registration API and the request pipeline
//! - **[`context`]** - [`RequestContext`]: request accessors, response writers,
//!   scratch store, abort flag and post-hooks
//! - **[`middleware`]** - Stock middleware (access logging, CORS)
//! - **[`server`]** - `may_minihttp` binding
//! - **[`logging`]** / **[`runtime_config`]** - Environment-driven setup
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Server as FeatherService
//!     participant Dispatcher
//!     participant Router
//!     participant MW as Middleware
//!     participant Handler
//!
//!     Client->>Server: GET /users/42
//!     Server->>Dispatcher: serve(ParsedRequest)
//!     Dispatcher->>Router: route("GET", "/users/42")
//!     alt method never registered
//!         Router-->>Client: 405 Method Not Allowed
//!     else no pattern matches
//!         Router-->>Client: 404 Not Found
//!     end
//!     Router-->>Dispatcher: RouteMatch { id = "42" }
//!     loop each middleware, until abort
//!         Dispatcher->>MW: call(&mut ctx)
//!     end
//!     opt not aborted
//!         Dispatcher->>Handler: call(&mut ctx)
//!     end
//!     Dispatcher->>Dispatcher: run post-hooks in order
//!     Dispatcher-->>Server: HandlerResponse
//!     Server-->>Client: HTTP response
//! ```
//!
//! ## Patterns
//!
//! | Segment | Compiles to | Binds |
//! |---------|-------------|-------|
//! | `users` | `users` (regex-escaped) | nothing |
//! | `:id` | `([^/]+)` | `id` |
//! | `:id\|[0-9]+` | `([0-9]+)` | `id` |
//!
//! Segments are split on `/`, empty segments are dropped, and the result is
//! anchored: `/users/:id|[0-9]+` becomes `^/users/([0-9]+)$`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use feather::middleware::{CorsMiddleware, LoggingMiddleware};
//! use feather::{Dispatcher, RequestContext};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = feather::logging::init_logging("info")?;
//!
//!     let mut app = Dispatcher::new();
//!     app.add_middleware(LoggingMiddleware);
//!     app.add_middleware(CorsMiddleware::default());
//!
//!     app.get("/users/:id|[0-9]+", |ctx: &mut RequestContext| {
//!         let id = ctx.param("id").unwrap_or_default().to_string();
//!         ctx.json(200, &serde_json::json!({ "id": id }));
//!     })?;
//!
//!     app.listen("0.0.0.0:8080")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Middleware
//!
//! Middleware are plain [`Handler`]s. A middleware can stop the pipeline with
//! [`RequestContext::abort`]; remaining middleware and the route handler are
//! skipped, but hooks registered with [`RequestContext::post`] still run:
//!
//! ```rust
//! use feather::{Dispatcher, RequestContext};
//! use feather::server::ParsedRequest;
//!
//! let mut app = Dispatcher::new();
//! app.add_middleware(|ctx: &mut RequestContext| {
//!     ctx.post(|ctx: &mut RequestContext| ctx.set_header("X-Seen", "1"));
//!     if ctx.header("authorization").is_none() {
//!         ctx.error(401, "Unauthorized");
//!         ctx.abort();
//!     }
//! });
//! app.get("/secret", |ctx: &mut RequestContext| ctx.text(200, "ok")).unwrap();
//!
//! let resp = app.serve(ParsedRequest::new("GET", "/secret"));
//! assert_eq!(resp.status, 401);
//! assert_eq!(resp.get_header("x-seen"), Some("1"));
//! ```

pub mod cli;
pub mod context;
pub mod dispatcher;
pub mod echo;
mod handler;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod runtime_config;
pub mod server;

pub use context::{Cookie, RequestContext, SameSite};
pub use dispatcher::Dispatcher;
pub use handler::{shared, Handler, SharedHandler};
pub use ids::RequestId;
pub use router::{RouteMatch, Router, RouterError};
pub use server::{HandlerResponse, ParsedRequest};
