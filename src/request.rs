//! Incoming HTTP request type.

use http::{HeaderMap, HeaderName, HeaderValue, Method};

/// An incoming HTTP request with its body fully read.
#[derive(Debug, Clone)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Vec<u8>,
}

impl Request {
    /// Builder for requests constructed outside the host server.
    ///
    /// Any valid token is kept as-is, so `"GTE"` stays `GTE`.
    ///
    /// # Panics
    ///
    /// Panics if `method` is not a valid HTTP method token (empty, or
    /// containing separators such as spaces).
    ///
    /// ```rust
    /// use webguard::Request;
    ///
    /// let req = Request::builder("GET", "/docs/")
    ///     .header("accept-encoding", "gzip, deflate")
    ///     .build();
    /// assert_eq!(req.header("Accept-Encoding"), Some("gzip, deflate"));
    /// ```
    pub fn builder(method: &str, target: &str) -> RequestBuilder {
        let method = match Method::from_bytes(method.as_bytes()) {
            Ok(method) => method,
            Err(_) => panic!("invalid HTTP method token {method:?}"),
        };
        let (path, query) = split_target(target);
        RequestBuilder {
            req: Request {
                method,
                path,
                query,
                headers: HeaderMap::new(),
                body: Vec::new(),
            },
        }
    }

    pub(crate) fn from_parts(parts: http::request::Parts, body: Vec<u8>) -> Self {
        Self {
            method: parts.method,
            path: parts.uri.path().to_owned(),
            query: parts.uri.query().map(str::to_owned),
            headers: parts.headers,
            body,
        }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    ///
    /// Returns the first value, or `None` when the header is absent or its
    /// value is not visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

/// Fluent builder for [`Request`]. Obtain via [`Request::builder`].
#[derive(Debug)]
pub struct RequestBuilder {
    req: Request,
}

impl RequestBuilder {
    /// Appends a header. Invalid names or values are dropped.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) =
            (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value))
        {
            self.req.headers.append(name, value);
        }
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.req.body = body.into();
        self
    }

    pub fn build(self) -> Request {
        self.req
    }
}

fn split_target(target: &str) -> (String, Option<String>) {
    match target.split_once('?') {
        Some((path, query)) => (path.to_owned(), Some(query.to_owned())),
        None => (target.to_owned(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_splits_query_and_keeps_method_token() {
        let req = Request::builder("PURGE", "/cache?key=a").build();
        assert_eq!(req.method().as_str(), "PURGE");
        assert_eq!(req.path(), "/cache");
        assert_eq!(req.query(), Some("key=a"));
    }

    #[test]
    fn method_tokens_are_case_sensitive() {
        let req = Request::builder("get", "/").build();
        assert_ne!(req.method(), Method::GET);
        assert_eq!(req.method().as_str(), "get");
    }

    #[test]
    fn misspelled_method_is_kept_verbatim() {
        let req = Request::builder("GTE", "/").build();
        assert_ne!(req.method(), Method::GET);
        assert_eq!(req.method().as_str(), "GTE");
    }

    #[test]
    #[should_panic(expected = "invalid HTTP method token")]
    fn malformed_method_token_panics() {
        let _ = Request::builder("GE T", "/");
    }

    #[test]
    fn header_lookup_ignores_name_case() {
        let req = Request::builder("GET", "/")
            .header("Origin", "https://example.com")
            .build();
        assert_eq!(req.header("origin"), Some("https://example.com"));
        assert_eq!(req.header("ORIGIN"), Some("https://example.com"));
        assert_eq!(req.header("referer"), None);
    }
}
