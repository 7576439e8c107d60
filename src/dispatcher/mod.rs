//! # Dispatcher Module
//!
//! The dispatcher turns an inbound request into a response by running the
//! request pipeline against the route table.
//!
//! ## Request Flow
//!
//! 1. Resolve `(method, path)` through the [`crate::router::Router`]
//!    - no routes for the method: `405 Method Not Allowed`
//!    - no pattern matches: `404 Not Found`
//! 2. Build a fresh [`crate::RequestContext`] with the bound path parameters
//! 3. Run every global middleware in registration order, stopping after the
//!    first one that calls [`crate::RequestContext::abort`]
//! 4. Run the route handler unless the request was aborted
//! 5. Run every post-hook registered on the context, in registration order,
//!    whether or not the handler ran
//!
//! Rejections in step 1 run no middleware at all, so they are not observed by
//! logging middleware; the dispatcher logs them itself.
//!
//! ## Concurrency
//!
//! Registration takes `&mut self` and happens before the server starts.
//! Serving takes `&self`; the transport shares one `Arc<Dispatcher>` across
//! all connection coroutines, and each request owns its own context.

mod core;

pub use core::{Dispatcher, DEFAULT_METHOD};
