//! # webguard
//!
//! A thin convenience layer for hyper-served handlers. Nothing more.
//!
//! ## What it does
//!
//! - **Method/origin gating**: [`Gate`] runs a handler only if the request
//!   method, and optionally its `Origin`, is in an allow-list; anything else
//!   goes to a fallback handler.
//! - **Transparent gzip**: [`Envelope`] compresses the body whenever the
//!   client's `Accept-Encoding` mentions `gzip`, sniffing `Content-Type` from
//!   the uncompressed bytes if the handler did not set one.
//! - **Default headers**: [`DefaultHeaders`] are set on every response
//!   before the handler runs.
//! - **Static files with a custom 404**: [`files::FileServer`] serves a
//!   directory and substitutes `/error404.html` for anything missing.
//!
//! ## What it does not do
//!
//! - **Routing**: a gate never looks at the path.
//! - **Middleware chains**: handlers are gated, not composed.
//! - **TLS and connection management**: put a proxy in front.
//! - **Compression negotiation**: gzip only, one substring check.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::StatusCode;
//! use webguard::{handler_fn, DefaultHeaders, Envelope, Gate, Request, ResponseWriter, Server};
//!
//! fn users(w: &mut dyn ResponseWriter, req: &Request) -> webguard::Result<()> {
//!     w.write_all(format!(r#"{{"path":"{}"}}"#, req.path()).as_bytes())?;
//!     Ok(())
//! }
//!
//! #[tokio::main]
//! async fn main() -> webguard::Result<()> {
//!     let api = Gate::builder(users)
//!         .methods(["GET", "POST"])
//!         .origins(["https://example.com"])
//!         .not_allowed(handler_fn(|w, _| {
//!             w.write_header(StatusCode::METHOD_NOT_ALLOWED);
//!             Ok(())
//!         }))
//!         .build();
//!
//!     let headers = DefaultHeaders::from_entries([
//!         ["x-content-type-options", "nosniff"],
//!         ["x-frame-options", "SAMEORIGIN"],
//!     ]);
//!
//!     Server::bind("0.0.0.0:3000")?
//!         .serve(Envelope::new(api, headers))
//!         .await
//! }
//! ```

mod config;
mod envelope;
mod error;
mod gate;
mod gzip;
mod handler;
mod request;
mod response;
mod server;

pub mod files;
pub mod method;
pub mod sniff;

pub use config::Config;
pub use envelope::{DefaultHeaders, Envelope};
pub use error::{Error, Result};
pub use gate::{bad_request, Gate, GateBuilder};
pub use gzip::GzipResponseWriter;
pub use handler::{handler_fn, BoxedHandler, Handler};
pub use request::{Request, RequestBuilder};
pub use response::{BodyWriter, BufferedResponse, ResponseWriter};
pub use server::Server;
