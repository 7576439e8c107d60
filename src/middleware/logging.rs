use std::time::Instant;

use tracing::{debug, info, warn};

use crate::context::RequestContext;
use crate::handler::Handler;

/// Access-log middleware
///
/// Notes the start time, then registers a post-hook that logs the final
/// status once the response is complete. The hook runs even when a later
/// middleware aborts the request, so rejected requests are logged too.
#[derive(Debug, Clone, Copy)]
pub struct LoggingMiddleware {
    _private: (),
}

impl LoggingMiddleware {
    #[must_use]
    pub fn new() -> Self {
        debug!(
            version = env!("CARGO_PKG_VERSION"),
            "Logger initialized, using feather v{}",
            env!("CARGO_PKG_VERSION")
        );
        Self { _private: () }
    }
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for LoggingMiddleware {
    fn call(&self, ctx: &mut RequestContext) {
        let start = Instant::now();
        ctx.post(move |ctx: &mut RequestContext| {
            let status = ctx.response().status;
            let duration_us = start.elapsed().as_micros();
            let client_ip = ctx.client_ip().unwrap_or("-");
            if status >= 500 {
                warn!(
                    request_id = %ctx.request_id(),
                    status = status,
                    client_ip = %client_ip,
                    method = %ctx.method(),
                    path = %ctx.path(),
                    aborted = ctx.is_aborted(),
                    duration_us = duration_us,
                    "Request completed with server error"
                );
            } else {
                info!(
                    request_id = %ctx.request_id(),
                    status = status,
                    client_ip = %client_ip,
                    method = %ctx.method(),
                    path = %ctx.path(),
                    aborted = ctx.is_aborted(),
                    duration_us = duration_us,
                    "Request completed"
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::ParamVec;
    use crate::server::ParsedRequest;

    #[test]
    fn test_registers_one_post_hook() {
        let mut ctx = RequestContext::new(ParsedRequest::new("GET", "/"), ParamVec::new());
        LoggingMiddleware::new().call(&mut ctx);
        assert_eq!(ctx.post_hook_count(), 1);
        assert!(!ctx.is_aborted());
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_construction_logs_version() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let _ = LoggingMiddleware::default();
        });
        let out = String::from_utf8_lossy(&captured.0.lock().unwrap()).into_owned();
        assert!(out.contains(&format!(
            "Logger initialized, using feather v{}",
            env!("CARGO_PKG_VERSION")
        )));
    }
}
