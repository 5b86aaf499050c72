//! The response sink handlers write into.
//!
//! [`ResponseWriter`] is the capability set every sink exposes: a header map,
//! a one-shot status setter, and a byte-stream `write`. The host server hands
//! each request a fresh [`BufferedResponse`]; wrappers such as
//! [`GzipResponseWriter`](crate::GzipResponseWriter) implement the same trait
//! and forward everything except `write` to the sink they wrap.
//!
//! # Commit semantics
//!
//! The first `write_header` (or the first `write`, which implies `200 OK`)
//! *commits* the response: the status and a snapshot of the header map are
//! frozen. Headers changed afterwards never reach the wire and later status
//! changes are ignored. Until the commit, handlers may overwrite any header.
//! `Content-Type` is the one exception: if the snapshot lacks it, the first
//! body write fills it in.

use std::io;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, StatusCode};
use http_body_util::Full;
use tracing::debug;

use crate::sniff::detect_content_type;

// ── ResponseWriter ────────────────────────────────────────────────────────────

/// An outgoing HTTP response under construction.
pub trait ResponseWriter: Send {
    /// Headers that will be sent when the response is committed.
    fn headers(&self) -> &HeaderMap;

    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Sets the status and commits the response. Only the first call counts.
    fn write_header(&mut self, status: StatusCode);

    /// Appends body bytes, committing `200 OK` first if nothing was committed.
    ///
    /// Returns the number of bytes accepted from `buf`.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Writes the whole buffer, retrying short writes.
    fn write_all(&mut self, mut buf: &[u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.write(buf)? {
                0 => return Err(io::ErrorKind::WriteZero.into()),
                n => buf = &buf[n..],
            }
        }
        Ok(())
    }
}

impl<W: ResponseWriter + ?Sized> ResponseWriter for &mut W {
    fn headers(&self) -> &HeaderMap { (**self).headers() }
    fn headers_mut(&mut self) -> &mut HeaderMap { (**self).headers_mut() }
    fn write_header(&mut self, status: StatusCode) { (**self).write_header(status) }
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> { (**self).write(buf) }
}

// ── BodyWriter ────────────────────────────────────────────────────────────────

/// Adapts a [`ResponseWriter`] to [`std::io::Write`] so byte-stream encoders
/// (flate2 and friends) can target it.
pub struct BodyWriter<'a>(pub(crate) &'a mut dyn ResponseWriter);

impl<'a> BodyWriter<'a> {
    pub fn new(sink: &'a mut dyn ResponseWriter) -> Self {
        Self(sink)
    }

    pub fn sink(&self) -> &(dyn ResponseWriter + 'a) {
        &*self.0
    }

    pub fn sink_mut(&mut self) -> &mut (dyn ResponseWriter + 'a) {
        &mut *self.0
    }
}

impl io::Write for BodyWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ── BufferedResponse ──────────────────────────────────────────────────────────

/// In-memory sink used by the host server.
///
/// Sniffs `Content-Type` from the first non-empty write when the handler has
/// not chosen one, like any standard HTTP server does.
#[derive(Debug, Default)]
pub struct BufferedResponse {
    headers: HeaderMap,
    committed: Option<(StatusCode, HeaderMap)>,
    body: Vec<u8>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed status, or `None` while the response is still open.
    pub fn status(&self) -> Option<StatusCode> {
        self.committed.as_ref().map(|(status, _)| *status)
    }

    /// Headers as they will be sent: the commit snapshot if committed.
    pub fn sent_headers(&self) -> &HeaderMap {
        match &self.committed {
            Some((_, headers)) => headers,
            None => &self.headers,
        }
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Finishes the response. An untouched sink becomes an empty `200 OK`.
    pub fn into_http(self) -> http::Response<Full<Bytes>> {
        let (status, headers) = self
            .committed
            .unwrap_or((StatusCode::OK, self.headers));

        let mut res = http::Response::new(Full::new(Bytes::from(self.body)));
        *res.status_mut() = status;
        *res.headers_mut() = headers;
        res
    }
}

impl ResponseWriter for BufferedResponse {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_header(&mut self, status: StatusCode) {
        if let Some((sent, _)) = &self.committed {
            debug!(%sent, ignored = %status, "superfluous write_header call");
            return;
        }
        self.committed = Some((status, self.headers.clone()));
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.committed.is_none() {
            self.write_header(StatusCode::OK);
        }
        if self.body.is_empty() && !buf.is_empty() {
            self.fill_content_type(buf);
        }
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }
}

impl BufferedResponse {
    // The sent headers get a Content-Type at the first body byte even when
    // the status was committed earlier. A type placed in the live map by a
    // wrapping writer wins over sniffing `buf`.
    fn fill_content_type(&mut self, buf: &[u8]) {
        let Some((_, sent)) = &mut self.committed else {
            return;
        };
        if sent.contains_key(CONTENT_TYPE) {
            return;
        }
        let value = match self.headers.get(CONTENT_TYPE) {
            Some(value) => value.clone(),
            None => HeaderValue::from_static(detect_content_type(buf)),
        };
        sent.insert(CONTENT_TYPE, value);
    }
}
