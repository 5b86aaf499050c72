//! Per-method convenience helpers.
//!
//! Inside a handler that answers several methods, these run a block only for
//! one of them:
//!
//! ```rust
//! use webguard::{method, Request, ResponseWriter, Result};
//!
//! fn users(w: &mut dyn ResponseWriter, req: &Request) -> Result<()> {
//!     method::get(w, req, |w, _| Ok(w.write_all(b"list")?))?;
//!     method::post(w, req, |w, _| Ok(w.write_all(b"created")?))?;
//!     Ok(())
//! }
//! ```
//!
//! Unlike a [`Gate`](crate::Gate) there is no fallback: a request with any
//! other method leaves the response untouched.

use std::fmt;
use std::str::FromStr;

use crate::error::Result;
use crate::request::Request;
use crate::response::ResponseWriter;

/// The RFC 9110 methods.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    Connect,
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
    Trace,
}

impl Method {
    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Delete  => "DELETE",
            Self::Get     => "GET",
            Self::Head    => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch   => "PATCH",
            Self::Post    => "POST",
            Self::Put     => "PUT",
            Self::Trace   => "TRACE",
        }
    }
}

/// Parses an uppercase method string (e.g. `"GET"`). Case-sensitive per RFC 9110 §9.1.
impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONNECT" => Ok(Self::Connect),
            "DELETE"  => Ok(Self::Delete),
            "GET"     => Ok(Self::Get),
            "HEAD"    => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "PATCH"   => Ok(Self::Patch),
            "POST"    => Ok(Self::Post),
            "PUT"     => Ok(Self::Put),
            "TRACE"   => Ok(Self::Trace),
            _         => Err(()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for http::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Connect => Self::CONNECT,
            Method::Delete  => Self::DELETE,
            Method::Get     => Self::GET,
            Method::Head    => Self::HEAD,
            Method::Options => Self::OPTIONS,
            Method::Patch   => Self::PATCH,
            Method::Post    => Self::POST,
            Method::Put     => Self::PUT,
            Method::Trace   => Self::TRACE,
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Calls `f` only if the request method is exactly `method`.
pub fn if_method<F>(method: Method, w: &mut dyn ResponseWriter, req: &Request, f: F) -> Result<()>
where
    F: FnOnce(&mut dyn ResponseWriter, &Request) -> Result<()>,
{
    if req.method().as_str() == method.as_str() {
        f(w, req)
    } else {
        Ok(())
    }
}

macro_rules! method_helpers {
    ($($(#[$doc:meta])* $name:ident => $variant:ident;)*) => {$(
        $(#[$doc])*
        pub fn $name<F>(w: &mut dyn ResponseWriter, req: &Request, f: F) -> Result<()>
        where
            F: FnOnce(&mut dyn ResponseWriter, &Request) -> Result<()>,
        {
            if_method(Method::$variant, w, req, f)
        }
    )*};
}

method_helpers! {
    /// Runs `f` for `GET` requests.
    get => Get;
    /// Runs `f` for `HEAD` requests.
    head => Head;
    /// Runs `f` for `POST` requests.
    post => Post;
    /// Runs `f` for `PUT` requests.
    put => Put;
    /// Runs `f` for `DELETE` requests.
    delete => Delete;
    /// Runs `f` for `CONNECT` requests.
    connect => Connect;
    /// Runs `f` for `OPTIONS` requests.
    options => Options;
    /// Runs `f` for `TRACE` requests.
    trace => Trace;
    /// Runs `f` for `PATCH` requests.
    patch => Patch;
}
