//! Per-request entry point: default headers and gzip negotiation.
//!
//! Every request served through an [`Envelope`] goes through the same three
//! steps before the wrapped handler sees it:
//!
//! 1. the configured [`DefaultHeaders`] are set on the response;
//! 2. `Accept-Encoding` is checked for the substring `gzip`;
//! 3. the wrapped handler runs, either against the sink as-is or against a
//!    [`GzipResponseWriter`] that is always closed before `serve` returns.

use http::header::{ACCEPT_ENCODING, CONTENT_ENCODING};
use http::{HeaderName, HeaderValue};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::Result;
use crate::gzip::GzipResponseWriter;
use crate::handler::{BoxedHandler, Handler};
use crate::request::Request;
use crate::response::ResponseWriter;

// ── DefaultHeaders ────────────────────────────────────────────────────────────

/// Headers set on every response, in order, before the handler runs.
///
/// Built from raw `[name, value]` entries. An entry without exactly two
/// components, or whose name or value is not valid in HTTP, is skipped.
///
/// ```rust
/// use webguard::DefaultHeaders;
///
/// let headers = DefaultHeaders::from_entries([
///     vec!["x-content-type-options", "nosniff"],
///     vec!["x-frame-options", "SAMEORIGIN"],
///     vec!["broken"],
/// ]);
/// assert_eq!(headers.len(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct DefaultHeaders {
    pairs: Vec<(HeaderName, HeaderValue)>,
}

impl DefaultHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I, E, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: AsRef<[S]>,
        S: AsRef<str>,
    {
        let pairs = entries
            .into_iter()
            .filter_map(|entry| match entry.as_ref() {
                [name, value] => parse_pair(name.as_ref(), value.as_ref()),
                other => {
                    debug!(components = other.len(), "skipping malformed default header entry");
                    None
                }
            })
            .collect();
        Self { pairs }
    }

    /// Number of usable entries.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Sets every pair on `w`. A later pair with the same name replaces an
    /// earlier one.
    pub fn apply(&self, w: &mut dyn ResponseWriter) {
        let headers = w.headers_mut();
        for (name, value) in &self.pairs {
            headers.insert(name.clone(), value.clone());
        }
    }
}

fn parse_pair(name: &str, value: &str) -> Option<(HeaderName, HeaderValue)> {
    match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
        (Ok(name), Ok(value)) => Some((name, value)),
        _ => {
            warn!(header = name, "skipping default header with invalid name or value");
            None
        }
    }
}

// ── Envelope ──────────────────────────────────────────────────────────────────

/// Wraps a handler with default headers and transparent gzip.
///
/// Configuration is read-only after construction, so one envelope can serve
/// any number of concurrent requests, and several envelopes with different
/// headers can coexist in one process.
pub struct Envelope {
    inner: BoxedHandler,
    headers: DefaultHeaders,
}

impl Envelope {
    pub fn new(inner: impl Handler, headers: DefaultHeaders) -> Self {
        Self { inner: inner.boxed(), headers }
    }

    /// Uses `config.default_headers`.
    pub fn from_config(inner: impl Handler, config: &Config) -> Self {
        Self::new(inner, DefaultHeaders::from_entries(&config.default_headers))
    }

    pub fn default_headers(&self) -> &DefaultHeaders {
        &self.headers
    }
}

impl Handler for Envelope {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request) -> Result<()> {
        self.headers.apply(w);

        if !accepts_gzip(req) {
            return self.inner.serve(w, req);
        }

        w.headers_mut().insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        let mut gz = GzipResponseWriter::new(w);
        let served = self.inner.serve(&mut gz, req);
        let closed = gz.finish();

        // The handler's own failure wins over a failure to close.
        served?;
        closed?;
        Ok(())
    }
}

/// Exact, case-sensitive substring match, as received.
fn accepts_gzip(req: &Request) -> bool {
    req.headers()
        .get_all(ACCEPT_ENCODING)
        .iter()
        .any(|v| v.as_bytes().windows(4).any(|w| w == b"gzip"))
}
