//! Not-found substitution for static files.

use std::fs::File;
use std::io;
use std::path::PathBuf;

use http::header::CONTENT_TYPE;
use http::{HeaderValue, StatusCode};
use tracing::debug;

use crate::files::dir::Dir;
use crate::response::ResponseWriter;

/// Path of the substitute document, relative to the served root.
pub const NOT_FOUND_DOCUMENT: &str = "/error404.html";

/// Opens request paths under a root, substituting [`NOT_FOUND_DOCUMENT`]
/// when the path is missing or is a directory without an `index.html`.
///
/// On substitution the response gets `Content-Type: text/html;
/// charset=utf-8` and `404 Not Found` before the handle is returned; the
/// caller then serves the handle's bytes as usual. If the substitute cannot
/// be opened either, the original error is returned and nothing is written.
#[derive(Clone, Debug)]
pub struct NotFoundResolver {
    dir: Dir,
}

impl NotFoundResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { dir: Dir::new(root) }
    }

    pub fn dir(&self) -> &Dir {
        &self.dir
    }

    pub fn open(&self, name: &str, w: &mut dyn ResponseWriter) -> io::Result<File> {
        let file = match self.dir.open(name) {
            Ok(file) => file,
            Err(err) => return self.substitute(name, err, w),
        };

        let is_dir = match file.metadata() {
            Ok(meta) => meta.is_dir(),
            Err(err) => return self.substitute(name, err, w),
        };

        if is_dir {
            let index = format!("{}/index.html", name.trim_end_matches('/'));
            if let Err(err) = self.dir.open(&index) {
                // Close the directory before falling back.
                drop(file);
                return self.substitute(name, err, w);
            }
        }

        Ok(file)
    }

    fn substitute(
        &self,
        name: &str,
        original: io::Error,
        w: &mut dyn ResponseWriter,
    ) -> io::Result<File> {
        match self.dir.open(NOT_FOUND_DOCUMENT) {
            Ok(doc) => {
                debug!(path = name, error = %original, "serving not-found document");
                w.headers_mut().insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static("text/html; charset=utf-8"),
                );
                w.write_header(StatusCode::NOT_FOUND);
                Ok(doc)
            }
            Err(doc_err) => {
                debug!(path = name, error = %original, %doc_err, "no not-found document");
                Err(original)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::files::testdir::TestDir;
    use crate::response::BufferedResponse;

    fn read(mut f: File) -> String {
        let mut s = String::new();
        f.read_to_string(&mut s).unwrap();
        s
    }

    #[test]
    fn existing_file_is_returned_untouched() {
        let tmp = TestDir::new("webguard-resolver");
        tmp.file("index.html", "home").file("error404.html", "lost");
        let resolver = NotFoundResolver::new(tmp.path());

        let mut w = BufferedResponse::new();
        let f = resolver.open("/index.html", &mut w).unwrap();
        assert_eq!(read(f), "home");
        assert_eq!(w.status(), None);
        assert!(w.headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn directory_with_index_is_returned_as_directory() {
        let tmp = TestDir::new("webguard-resolver");
        tmp.file("docs/index.html", "docs").file("error404.html", "lost");
        let resolver = NotFoundResolver::new(tmp.path());

        let mut w = BufferedResponse::new();
        let f = resolver.open("/docs/", &mut w).unwrap();
        assert!(f.metadata().unwrap().is_dir());
        assert_eq!(w.status(), None);
    }

    #[test]
    fn missing_file_without_document_returns_original_error() {
        let tmp = TestDir::new("webguard-resolver");
        tmp.file("index.html", "home");
        let resolver = NotFoundResolver::new(tmp.path());

        let mut w = BufferedResponse::new();
        let err = resolver.open("missing.txt", &mut w).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert_eq!(w.status(), None);
    }

    #[test]
    fn missing_file_serves_document_with_404() {
        let tmp = TestDir::new("webguard-resolver");
        tmp.file("error404.html", "<h1>lost</h1>");
        let resolver = NotFoundResolver::new(tmp.path());

        let mut w = BufferedResponse::new();
        let f = resolver.open("/missing.txt", &mut w).unwrap();
        assert_eq!(read(f), "<h1>lost</h1>");
        assert_eq!(w.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(w.sent_headers()[CONTENT_TYPE], "text/html; charset=utf-8");
    }

    #[test]
    fn directory_without_index_serves_document_with_404() {
        let tmp = TestDir::new("webguard-resolver");
        tmp.file("error404.html", "<h1>lost</h1>").dir("docs");
        let resolver = NotFoundResolver::new(tmp.path());

        let mut w = BufferedResponse::new();
        let f = resolver.open("docs/", &mut w).unwrap();
        assert_eq!(read(f), "<h1>lost</h1>");
        assert_eq!(w.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(w.sent_headers()[CONTENT_TYPE], "text/html; charset=utf-8");
    }

    #[test]
    fn directory_without_index_and_no_document_fails() {
        let tmp = TestDir::new("webguard-resolver");
        tmp.dir("docs");
        let resolver = NotFoundResolver::new(tmp.path());

        let mut w = BufferedResponse::new();
        let err = resolver.open("/docs", &mut w).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
