//! The file-serving handler.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::PathBuf;

use http::header::{CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, LOCATION, X_CONTENT_TYPE_OPTIONS};
use http::{HeaderValue, Method, StatusCode};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use tracing::{debug, warn};

use crate::error::Result;
use crate::files::mime::content_type_for_path;
use crate::files::resolver::NotFoundResolver;
use crate::handler::Handler;
use crate::request::Request;
use crate::response::{BodyWriter, ResponseWriter};
use crate::sniff::{detect_content_type, SNIFF_LEN};

/// Bytes escaped when a decoded segment goes back into a `Location`.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Serves the files under a root directory.
///
/// The request path is percent-decoded first; a path that does not decode
/// to UTF-8 gets `400`.
///
/// - `/dir` (a directory) redirects to `dir/`; `/dir/` serves `dir/index.html`.
/// - A missing file, or a directory without `index.html`, serves
///   `/error404.html` with `404` when that document exists.
/// - Otherwise failures become a short plain-text `404`, `403` or `500`.
///
/// Any method is served; `HEAD` gets headers only.
#[derive(Clone, Debug)]
pub struct FileServer {
    resolver: NotFoundResolver,
}

impl FileServer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { resolver: NotFoundResolver::new(root) }
    }

    pub fn resolver(&self) -> &NotFoundResolver {
        &self.resolver
    }
}

impl Handler for FileServer {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request) -> Result<()> {
        let decoded = match percent_decode_str(req.path()).decode_utf8() {
            Ok(decoded) => decoded,
            Err(err) => {
                debug!(path = req.path(), error = %err, "undecodable request path");
                return write_plain(w, StatusCode::BAD_REQUEST, "400 Bad Request\n");
            }
        };
        let name = if decoded.starts_with('/') {
            decoded.into_owned()
        } else {
            format!("/{decoded}")
        };

        let file = match self.resolver.open(&name, w) {
            Ok(file) => file,
            Err(err) => return write_error(w, &name, &err),
        };
        let meta = match file.metadata() {
            Ok(meta) => meta,
            Err(err) => return write_error(w, &name, &err),
        };

        if !meta.is_dir() {
            return send(w, req, file, &name);
        }

        if !name.ends_with('/') {
            let base = name.rsplit('/').next().unwrap_or_default();
            return redirect(w, req, &format!("{}/", utf8_percent_encode(base, SEGMENT)));
        }

        let index = format!("{name}index.html");
        match self.resolver.dir().open(&index) {
            Ok(file) => send(w, req, file, &index),
            Err(err) => write_error(w, &index, &err),
        }
    }
}

fn send(w: &mut dyn ResponseWriter, req: &Request, mut file: File, name: &str) -> Result<()> {
    if !w.headers().contains_key(CONTENT_TYPE) {
        let ct = match content_type_for_path(name) {
            Some(ct) => ct,
            None => sniff(&mut file)?,
        };
        w.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(ct));
    }

    // A compressed body has a different length; let the transport decide.
    if !w.headers().contains_key(CONTENT_ENCODING) {
        let len = file.metadata()?.len();
        w.headers_mut().insert(CONTENT_LENGTH, HeaderValue::from(len));
    }

    w.write_header(StatusCode::OK);
    if req.method() == Method::HEAD {
        return Ok(());
    }

    let copied = io::copy(&mut file, &mut BodyWriter::new(w))?;
    debug!(path = name, bytes = copied, "file served");
    Ok(())
}

fn sniff(file: &mut File) -> io::Result<&'static str> {
    let mut head = Vec::with_capacity(SNIFF_LEN);
    file.by_ref().take(SNIFF_LEN as u64).read_to_end(&mut head)?;
    file.seek(SeekFrom::Start(0))?;
    Ok(detect_content_type(&head))
}

fn redirect(w: &mut dyn ResponseWriter, req: &Request, target: &str) -> Result<()> {
    let location = match req.query() {
        Some(q) => format!("{target}?{q}"),
        None => target.to_owned(),
    };
    match HeaderValue::from_str(&location) {
        Ok(value) => {
            w.headers_mut().insert(LOCATION, value);
            w.write_header(StatusCode::MOVED_PERMANENTLY);
        }
        Err(_) => w.write_header(StatusCode::BAD_REQUEST),
    }
    Ok(())
}

fn write_error(w: &mut dyn ResponseWriter, name: &str, err: &io::Error) -> Result<()> {
    let (status, msg) = match err.kind() {
        io::ErrorKind::NotFound => (StatusCode::NOT_FOUND, "404 page not found\n"),
        io::ErrorKind::PermissionDenied => (StatusCode::FORBIDDEN, "403 Forbidden\n"),
        _ => {
            warn!(path = name, error = %err, "failed to open file");
            (StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error\n")
        }
    };
    write_plain(w, status, msg)
}

fn write_plain(w: &mut dyn ResponseWriter, status: StatusCode, msg: &str) -> Result<()> {
    let headers = w.headers_mut();
    headers.remove(CONTENT_LENGTH);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    w.write_header(status);
    w.write_all(msg.as_bytes())?;
    Ok(())
}
