//! Handler trait and type erasure.
//!
//! # How handlers are stored
//!
//! A [`Gate`](crate::Gate) holds two handlers of possibly *different* types
//! and an [`Envelope`](crate::Envelope) holds one of any type, so both store
//! them as trait objects (`Arc<dyn Handler>`) behind a common interface.
//!
//! The chain from user code to vtable call is:
//!
//! ```text
//! fn hello(w: &mut dyn ResponseWriter, req: &Request) -> Result<()> { … }
//!        ↓ Gate::builder(hello)
//! hello.boxed()                              ← Handler blanket impl
//!        ↓
//! Arc::new(hello)                            ← stored as BoxedHandler
//!        ↓
//! handler.serve(w, req)  at request time     ← one vtable dispatch
//! ```
//!
//! Handlers are synchronous: they write into a sink that is owned by exactly
//! one request, and the host server runs them on tokio's blocking pool.

use std::sync::Arc;

use crate::error::Result;
use crate::request::Request;
use crate::response::ResponseWriter;

/// The single "serve one request" capability.
///
/// Implemented automatically for any function or closure with the signature
///
/// ```text
/// fn name(w: &mut dyn ResponseWriter, req: &Request) -> webguard::Result<()>
/// ```
///
/// and for [`Gate`](crate::Gate), [`Envelope`](crate::Envelope) and
/// [`FileServer`](crate::files::FileServer).
///
/// Errors are not turned into responses here: they propagate to whoever
/// called `serve`, which for the host server means a logged `500`.
pub trait Handler: Send + Sync + 'static {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request) -> Result<()>;

    /// Type-erases `self` for shared storage.
    fn boxed(self) -> BoxedHandler
    where
        Self: Sized,
    {
        Arc::new(self)
    }
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
///
/// `Arc` gives cheap, thread-safe shared ownership (one atomic increment per
/// request) without copying the handler.
pub type BoxedHandler = Arc<dyn Handler>;

impl<F> Handler for F
where
    F: Fn(&mut dyn ResponseWriter, &Request) -> Result<()> + Send + Sync + 'static,
{
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request) -> Result<()> {
        self(w, req)
    }
}

/// Pins a closure to the handler signature.
///
/// Closures passed straight to an `impl Handler` parameter cannot have their
/// argument lifetimes inferred; routing them through here fixes that:
///
/// ```rust
/// use webguard::{handler_fn, Gate};
///
/// let gate = Gate::builder(handler_fn(|w, _req| {
///     w.write_all(b"hello")?;
///     Ok(())
/// }))
/// .methods(["GET"])
/// .build();
/// # let _ = gate;
/// ```
pub fn handler_fn<F>(f: F) -> F
where
    F: Fn(&mut dyn ResponseWriter, &Request) -> Result<()> + Send + Sync + 'static,
{
    f
}
