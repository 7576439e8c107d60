use std::sync::Arc;

use crate::context::RequestContext;

/// A unit of work run against a request context
///
/// Route handlers, middleware and post-hooks all share this one shape so they
/// compose uniformly. Handlers work by side effect on the context: they write
/// the response, stash data for later stages, call [`RequestContext::abort`]
/// or register post-hooks with [`RequestContext::post`]. Nothing is returned
/// to the dispatcher.
///
/// Any `Fn(&mut RequestContext) + Send + Sync + 'static` closure is a handler:
///
/// ```rust
/// use feather::{Handler, RequestContext};
///
/// fn hello(ctx: &mut RequestContext) {
///     ctx.text(200, "hello");
/// }
///
/// fn assert_handler<H: Handler>(_: H) {}
/// assert_handler(hello);
/// assert_handler(|ctx: &mut RequestContext| ctx.status(204));
/// ```
pub trait Handler: Send + Sync + 'static {
    fn call(&self, ctx: &mut RequestContext);
}

impl<F> Handler for F
where
    F: Fn(&mut RequestContext) + Send + Sync + 'static,
{
    #[inline]
    fn call(&self, ctx: &mut RequestContext) {
        self(ctx)
    }
}

/// Reference-counted handler, cheap to clone into the route table and into
/// several methods at once
pub type SharedHandler = Arc<dyn Handler>;

/// Wrap a handler into a [`SharedHandler`]
#[must_use]
pub fn shared<H: Handler>(handler: H) -> SharedHandler {
    Arc::new(handler)
}
