//! Transparent gzip response bodies.
//!
//! [`GzipResponseWriter`] is a [`ResponseWriter`] that owns a gzip stream
//! which in turn owns the sink it wraps. Headers and status go straight to
//! the sink; only `write` is intercepted:
//!
//! ```text
//! handler ── write(b) ──▶ GzipResponseWriter ──▶ GzEncoder ──▶ sink.write(z)
//!                              │
//!                              └── headers / write_header ──────▶ sink
//! ```
//!
//! The encoder buffers and flushes compressed bytes on its own schedule, so
//! the sink usually sees its first write long after the handler's first one.
//! That is why `Content-Type` is sniffed here, from the plain bytes, instead
//! of leaving it to the sink, which would only ever see gzip frames.

use std::io::{self, Write};

use flate2::Compression;
use flate2::write::GzEncoder;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, StatusCode};

use crate::response::{BodyWriter, ResponseWriter};
use crate::sniff::detect_content_type;

/// A response sink whose body is gzip-compressed.
///
/// Call [`finish`](Self::finish) once the handler is done. Dropping the
/// writer without it still writes the gzip trailer, but swallows any error.
pub struct GzipResponseWriter<'a> {
    encoder: GzEncoder<BodyWriter<'a>>,
}

impl<'a> GzipResponseWriter<'a> {
    /// Binds a fresh gzip stream to `sink`.
    ///
    /// Does not touch `Content-Encoding`; the caller decides whether the
    /// response is advertised as gzip.
    pub fn new(sink: &'a mut dyn ResponseWriter) -> Self {
        Self::with_level(sink, Compression::default())
    }

    pub fn with_level(sink: &'a mut dyn ResponseWriter, level: Compression) -> Self {
        Self { encoder: GzEncoder::new(BodyWriter::new(sink), level) }
    }

    /// Closes the gzip stream, flushing buffered data and the trailer into
    /// the sink.
    pub fn finish(self) -> io::Result<()> {
        self.encoder.finish().map(drop)
    }
}

impl ResponseWriter for GzipResponseWriter<'_> {
    fn headers(&self) -> &HeaderMap {
        self.encoder.get_ref().sink().headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.encoder.get_mut().sink_mut().headers_mut()
    }

    fn write_header(&mut self, status: StatusCode) {
        self.encoder.get_mut().sink_mut().write_header(status);
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.headers().contains_key(CONTENT_TYPE) {
            let sniffed = HeaderValue::from_static(detect_content_type(buf));
            self.headers_mut().insert(CONTENT_TYPE, sniffed);
        }
        self.encoder.write(buf)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::GzDecoder;

    use super::*;
    use crate::response::BufferedResponse;

    fn gunzip(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        GzDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn body_round_trips_through_gzip() {
        let mut sink = BufferedResponse::new();
        let mut gz = GzipResponseWriter::new(&mut sink);
        gz.write_all(b"hello ").unwrap();
        gz.write_all(b"world").unwrap();
        gz.finish().unwrap();

        assert_eq!(gunzip(sink.body()), b"hello world");
    }

    #[test]
    fn content_type_is_sniffed_from_uncompressed_bytes() {
        let mut sink = BufferedResponse::new();
        let mut gz = GzipResponseWriter::new(&mut sink);
        gz.write_all(b"<!DOCTYPE html><title>x</title>").unwrap();
        gz.finish().unwrap();

        assert_eq!(sink.sent_headers()[CONTENT_TYPE], "text/html; charset=utf-8");
    }

    #[test]
    fn only_the_first_write_is_sniffed() {
        let mut sink = BufferedResponse::new();
        let mut gz = GzipResponseWriter::new(&mut sink);
        gz.write_all(b"plain text first").unwrap();
        gz.write_all(b"%PDF-1.4 then a pdf").unwrap();
        gz.finish().unwrap();

        assert_eq!(sink.sent_headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
    }

    #[test]
    fn preset_content_type_is_kept() {
        let mut sink = BufferedResponse::new();
        sink.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut gz = GzipResponseWriter::new(&mut sink);
        gz.write_all(b"<html>").unwrap();
        gz.finish().unwrap();

        assert_eq!(sink.sent_headers()[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn status_is_forwarded_to_the_sink() {
        let mut sink = BufferedResponse::new();
        let mut gz = GzipResponseWriter::new(&mut sink);
        gz.write_header(StatusCode::CREATED);
        gz.write_all(b"<html><p>created</p>").unwrap();
        gz.finish().unwrap();

        assert_eq!(sink.status(), Some(StatusCode::CREATED));
        // Sniffed from the plain bytes, not the gzip framing.
        assert_eq!(sink.sent_headers()[CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(gunzip(sink.body()), b"<html><p>created</p>");
    }

    #[test]
    fn drop_still_closes_the_stream() {
        let mut sink = BufferedResponse::new();
        {
            let mut gz = GzipResponseWriter::new(&mut sink);
            gz.write_all(b"abandoned").unwrap();
        }
        assert_eq!(gunzip(sink.body()), b"abandoned");
    }
}
