use may::coroutine::JoinHandle;
use may_minihttp::{HttpServerWithHeaders, HttpService};
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Maximum request headers parsed per request
///
/// Proxies and gateways routinely add a dozen headers of their own, so the
/// `may_minihttp` default of 16 is raised.
pub const MAX_REQUEST_HEADERS: usize = 32;

const READY_POLL_INTERVAL: Duration = Duration::from_millis(5);
const DEFAULT_READY_TIMEOUT: Duration = Duration::from_millis(500);

/// Wrapper around may_minihttp's HTTP server
pub struct HttpServer<T>(pub T);

/// Handle to a running HTTP server
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the server is bound to
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Block until the listener accepts TCP connections
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` if the server is not reachable within 500ms.
    pub fn wait_ready(&self) -> io::Result<()> {
        self.wait_ready_timeout(DEFAULT_READY_TIMEOUT)
    }

    /// Like [`ServerHandle::wait_ready`] with an explicit timeout
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` if the server is not reachable within `timeout`.
    pub fn wait_ready_timeout(&self, timeout: Duration) -> io::Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if TcpStream::connect(self.addr).is_ok() {
                debug!(addr = %self.addr, "Server ready");
                return Ok(());
            }
            thread::sleep(READY_POLL_INTERVAL);
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Cancel the accept loop and wait for it to finish
    pub fn stop(self) {
        // SAFETY: cancel() is unsafe because the coroutine may be parked
        // mid-operation. The accept loop owns no state that outlives it and we
        // join immediately afterwards.
        unsafe {
            self.handle.coroutine().cancel();
        }
        let _ = self.handle.join();
        info!(addr = %self.addr, "Server stopped");
    }

    /// Block until the server coroutine exits
    ///
    /// # Errors
    ///
    /// Returns the panic payload if the server coroutine panicked.
    pub fn join(self) -> thread::Result<()> {
        self.handle.join()
    }
}

impl<T: HttpService + Clone + Send + Sync + 'static> HttpServer<T> {
    /// Bind `addr` and start accepting connections
    ///
    /// `addr` may use port `0`; the handle then reports the requested address,
    /// so tests should pick a concrete free port instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the address does not resolve or cannot be bound.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        let handle = HttpServerWithHeaders::<_, MAX_REQUEST_HEADERS>(self.0).start(addr)?;
        info!(addr = %addr, "HTTP server started");
        Ok(ServerHandle { addr, handle })
    }
}
