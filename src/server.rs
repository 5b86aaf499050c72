//! HTTP server and graceful shutdown.
//!
//! The server is the collaborator that owns sockets; everything else in the
//! crate only ever sees a [`Request`] and a [`ResponseWriter`].
//!
//! # Per-request lifecycle
//!
//! 1. hyper parses the request; the body is read in full.
//! 2. The handler runs on tokio's blocking pool against a fresh
//!    [`BufferedResponse`], so file I/O and compression never stall the
//!    reactor.
//! 3. The buffered response goes back to hyper. A handler error or panic
//!    discards whatever was written and sends `500 Internal Server Error`.
//!
//! # Graceful shutdown
//!
//! On **SIGTERM** or **Ctrl-C** the server stops accepting, lets every
//! in-flight connection finish, then returns from [`Server::serve`].

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::handler::{BoxedHandler, Handler};
use crate::request::Request;
use crate::response::BufferedResponse;

type Shutdown = Pin<Box<dyn Future<Output = ()> + Send>>;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
    shutdown: Option<Shutdown>,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust
    /// use webguard::Server;
    /// let server = Server::bind("0.0.0.0:3000").unwrap();
    /// # let _ = server;
    /// assert!(Server::bind("not an address").is_err());
    /// ```
    pub fn bind(addr: &str) -> Result<Self> {
        let addr = addr
            .parse()
            .map_err(|_| Error::InvalidAddress(addr.to_owned()))?;
        Ok(Self { addr, shutdown: None })
    }

    /// Replaces the SIGTERM / Ctrl-C trigger with `signal`.
    pub fn with_shutdown(mut self, signal: impl Future<Output = ()> + Send + 'static) -> Self {
        self.shutdown = Some(Box::pin(signal));
        self
    }

    /// Binds, then serves every request with `handler` until shutdown.
    pub async fn serve(self, handler: impl Handler) -> Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        self.serve_on(listener, handler).await
    }

    /// Serves on an already-bound listener, ignoring the configured address.
    pub async fn serve_on(self, listener: TcpListener, handler: impl Handler) -> Result<()> {
        let handler = handler.boxed();
        let local = listener.local_addr()?;
        info!(addr = %local, "webguard listening");

        // JoinSet tracks every spawned connection task so we can wait for
        // them all to finish during graceful shutdown.
        let mut tasks = tokio::task::JoinSet::new();

        let mut shutdown: Shutdown = match self.shutdown {
            Some(signal) => signal,
            None => Box::pin(shutdown_signal()),
        };

        loop {
            tokio::select! {
                // Check shutdown first so a signal immediately stops
                // accepting, even if more connections are queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let handler = Arc::clone(&handler);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| dispatch(Arc::clone(&handler), req));

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("webguard stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Runs one request through the handler and produces one response.
///
/// Never fails towards hyper: every failure becomes an HTTP status.
async fn dispatch(
    handler: BoxedHandler,
    req: hyper::Request<Incoming>,
) -> std::result::Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes().to_vec(),
        Err(e) => {
            warn!("failed to read request body: {e}");
            return Ok(status_only(StatusCode::BAD_REQUEST));
        }
    };

    let req = Request::from_parts(parts, body);
    let method = req.method().clone();
    let path = req.path().to_owned();

    let outcome = tokio::task::spawn_blocking(move || {
        let mut w = BufferedResponse::new();
        handler.serve(&mut w, &req).map(|()| w)
    })
    .await;

    let response = match outcome {
        Ok(Ok(w)) => w.into_http(),
        Ok(Err(e)) => {
            error!(%method, %path, "handler failed: {e}");
            status_only(StatusCode::INTERNAL_SERVER_ERROR)
        }
        Err(e) => {
            error!(%method, %path, "handler panicked: {e}");
            status_only(StatusCode::INTERNAL_SERVER_ERROR)
        }
    };

    debug!(%method, %path, status = response.status().as_u16(), "request served");
    Ok(response)
}

fn status_only(status: StatusCode) -> http::Response<Full<Bytes>> {
    let mut res = http::Response::new(Full::new(Bytes::new()));
    *res.status_mut() = status;
    res
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** and **SIGINT** (Ctrl-C).
/// On Windows only Ctrl-C is available. A handler that cannot be installed
/// is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
