//! Method and origin allow-list gating.
//!
//! A [`Gate`] picks one of two handlers per request: the *allowed* handler
//! when the method is in the allow-list (and, if origins are configured, the
//! `Origin` header is too), the *not-allowed* handler otherwise.
//!
//! ```rust
//! use webguard::{handler_fn, DefaultHeaders, Envelope, Gate};
//!
//! let api = Gate::builder(handler_fn(|w, _| Ok(w.write_all(b"{}")?)))
//!     .methods(["GET", "POST"])
//!     .origins(["https://example.com"])
//!     .build();
//!
//! // Gzip and default headers around the gate.
//! let app = Envelope::new(api, DefaultHeaders::new());
//! # let _ = app;
//! ```
//!
//! There is no routing here: a gate never looks at the path.

use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::handler::{BoxedHandler, Handler};
use crate::request::Request;
use crate::response::ResponseWriter;

/// Two handlers and the allow-lists that choose between them.
///
/// Immutable once built; safe to share across concurrent requests.
pub struct Gate {
    allowed: BoxedHandler,
    not_allowed: BoxedHandler,
    methods: Vec<String>,
    origins: Vec<String>,
}

impl Gate {
    /// Starts a gate around the handler that serves accepted requests.
    ///
    /// With no further calls the gate accepts nothing: the method list
    /// starts empty.
    pub fn builder(allowed: impl Handler) -> GateBuilder {
        GateBuilder {
            allowed: allowed.boxed(),
            not_allowed: None,
            methods: Vec::new(),
            origins: Vec::new(),
        }
    }

    pub fn allowed_methods(&self) -> &[String] {
        &self.methods
    }

    pub fn allowed_origins(&self) -> &[String] {
        &self.origins
    }

    /// Decides which handler serves `req`.
    ///
    /// Membership decides, not position. With origins configured both the
    /// method and the origin must match; an absent `Origin` never matches.
    /// `OPTIONS` gets no special treatment.
    pub fn select(&self, req: &Request) -> &dyn Handler {
        let origin_ok = self.origins.is_empty()
            || req
                .header("origin")
                .is_some_and(|origin| self.origins.iter().any(|o| o == origin));

        let method = req.method().as_str();
        let method_ok = self.methods.iter().any(|m| m == method);

        if method_ok && origin_ok {
            &*self.allowed
        } else {
            debug!(
                method,
                origin = req.header("origin"),
                method_ok,
                origin_ok,
                "request rejected by gate"
            );
            &*self.not_allowed
        }
    }
}

impl Handler for Gate {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request) -> Result<()> {
        self.select(req).serve(w, req)
    }
}

/// Writes `Bad Request` as the body. The status is left to the sink.
pub fn bad_request(w: &mut dyn ResponseWriter, _req: &Request) -> Result<()> {
    w.write_all(b"Bad Request")?;
    Ok(())
}

// ── GateBuilder ───────────────────────────────────────────────────────────────

/// Fluent builder for [`Gate`]. Obtain via [`Gate::builder`].
pub struct GateBuilder {
    allowed: BoxedHandler,
    not_allowed: Option<BoxedHandler>,
    methods: Vec<String>,
    origins: Vec<String>,
}

impl GateBuilder {
    /// Handler for rejected requests. Defaults to [`bad_request`].
    ///
    /// Set a status inside it if the client should see more than a body:
    ///
    /// ```rust
    /// use http::StatusCode;
    /// use webguard::{handler_fn, Gate};
    ///
    /// let gate = Gate::builder(handler_fn(|w, _| Ok(w.write_all(b"ok")?)))
    ///     .methods(["GET"])
    ///     .not_allowed(handler_fn(|w, _| {
    ///         w.write_header(StatusCode::METHOD_NOT_ALLOWED);
    ///         Ok(())
    ///     }))
    ///     .build();
    /// # let _ = gate;
    /// ```
    pub fn not_allowed(mut self, handler: impl Handler) -> Self {
        self.not_allowed = Some(handler.boxed());
        self
    }

    /// Appends accepted method tokens, compared exactly (`"get"` ≠ `"GET"`).
    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods.extend(methods.into_iter().map(Into::into));
        self
    }

    /// Appends accepted `Origin` values, compared exactly.
    pub fn origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.origins.extend(origins.into_iter().map(Into::into));
        self
    }

    /// Takes both allow-lists from `config`.
    pub fn config(self, config: &Config) -> Self {
        self.methods(config.allowed_methods.iter().cloned())
            .origins(config.allowed_origins.iter().cloned())
    }

    pub fn build(self) -> Gate {
        Gate {
            allowed: self.allowed,
            not_allowed: self.not_allowed.unwrap_or_else(|| bad_request.boxed()),
            methods: self.methods,
            origins: self.origins,
        }
    }
}
