use super::request::parse_request;
use super::response::{write_handler_response, HandlerResponse};
use crate::dispatcher::Dispatcher;
use may_minihttp::{HttpService, Request, Response};
use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::error;

/// `may_minihttp` service that feeds every request through a [`Dispatcher`]
///
/// Cloned once per connection by `may_minihttp`; all clones share the same
/// read-only dispatcher.
#[derive(Clone)]
pub struct FeatherService {
    pub dispatcher: Arc<Dispatcher>,
}

impl FeatherService {
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

impl HttpService for FeatherService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let request = parse_request(req);
        let method = request.method.clone();
        let path = request.path.clone();

        let dispatcher = &self.dispatcher;
        let response = match catch_unwind(AssertUnwindSafe(|| dispatcher.serve(request))) {
            Ok(response) => response,
            Err(panic) => {
                let panic_message = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(
                    method = %method,
                    path = %path,
                    panic_message = %panic_message,
                    "Request pipeline panicked - CRITICAL"
                );
                HandlerResponse::plain_error(500, "Internal Server Error")
            }
        };

        write_handler_response(res, response);
        Ok(())
    }
}
