//! Stock middleware
//!
//! Middleware are ordinary [`crate::Handler`]s added with
//! [`crate::Dispatcher::add_middleware`]. They run before the route handler,
//! may stop the pipeline with [`crate::RequestContext::abort`] and may defer
//! work with [`crate::RequestContext::post`].

mod cors;
mod logging;

pub use cors::CorsMiddleware;
pub use logging::LoggingMiddleware;
