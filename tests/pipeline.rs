//! End-to-end behaviour of envelope, gate and file server together, driven
//! through the public API against an in-memory sink.

use std::io::Read;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use flate2::read::GzDecoder;
use http::header::{CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE};
use http::StatusCode;
use webguard::files::FileServer;
use webguard::{
    handler_fn, BufferedResponse, Config, DefaultHeaders, Envelope, Gate, Handler, Request,
};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    static SEQ: AtomicUsize = AtomicUsize::new(0);
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("{prefix}-{}-{ts}-{seq}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn gunzip(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    GzDecoder::new(data).read_to_end(&mut out).expect("body should be valid gzip");
    out
}

fn run(handler: &impl Handler, req: Request) -> BufferedResponse {
    let mut w = BufferedResponse::new();
    handler.serve(&mut w, &req).expect("handler should succeed");
    w
}

#[test]
fn gated_api_behind_envelope() {
    let config: Config = r#"
        allowed_methods = ["GET"]
        allowed_origins = ["https://example.com"]
        default_headers = [["x-frame-options", "SAMEORIGIN"], ["broken"]]
    "#
    .parse()
    .unwrap();

    let gate = Gate::builder(handler_fn(|w, _| Ok(w.write_all(b"<p>welcome</p>")?)))
        .config(&config)
        .build();
    let app = Envelope::from_config(gate, &config);
    assert_eq!(app.default_headers().len(), 1);

    let ok = run(
        &app,
        Request::builder("GET", "/")
            .header("origin", "https://example.com")
            .header("accept-encoding", "gzip, deflate")
            .build(),
    );
    assert_eq!(ok.sent_headers()["x-frame-options"], "SAMEORIGIN");
    assert_eq!(ok.sent_headers()[CONTENT_ENCODING], "gzip");
    assert_eq!(ok.sent_headers()[CONTENT_TYPE], "text/html; charset=utf-8");
    assert_eq!(gunzip(ok.body()), b"<p>welcome</p>");

    let rejected = run(
        &app,
        Request::builder("GET", "/").header("origin", "https://evil.com").build(),
    );
    assert_eq!(rejected.sent_headers()["x-frame-options"], "SAMEORIGIN");
    assert!(rejected.sent_headers().get(CONTENT_ENCODING).is_none());
    assert_eq!(rejected.body(), b"Bad Request");
}

#[test]
fn file_server_with_not_found_document_behind_gzip() {
    let root = unique_temp_dir("webguard-pipeline");
    std::fs::write(root.join("error404.html"), "<h1>not here</h1>").unwrap();
    std::fs::write(root.join("app.js"), "console.log(1)").unwrap();
    std::fs::create_dir_all(root.join("docs")).unwrap();

    let app = Envelope::new(FileServer::new(&root), DefaultHeaders::new());

    let gz = || Request::builder("GET", "/docs/").header("accept-encoding", "gzip");
    let missing = run(&app, gz().build());
    assert_eq!(missing.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(missing.sent_headers()[CONTENT_TYPE], "text/html; charset=utf-8");
    assert_eq!(missing.sent_headers()[CONTENT_ENCODING], "gzip");
    assert_eq!(gunzip(missing.body()), b"<h1>not here</h1>");

    let script = run(
        &app,
        Request::builder("GET", "/app.js").header("accept-encoding", "gzip").build(),
    );
    assert_eq!(script.status(), Some(StatusCode::OK));
    assert_eq!(script.sent_headers()[CONTENT_TYPE], "text/javascript; charset=utf-8");
    // Compressed bodies carry no file length.
    assert!(script.sent_headers().get(CONTENT_LENGTH).is_none());
    assert_eq!(gunzip(script.body()), b"console.log(1)");

    let plain = run(&app, Request::builder("GET", "/app.js").build());
    assert_eq!(plain.sent_headers()[CONTENT_LENGTH], "14");
    assert_eq!(plain.body(), b"console.log(1)");

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn missing_file_without_document_gets_generic_404() {
    let root = unique_temp_dir("webguard-pipeline");
    std::fs::write(root.join("index.html"), "home").unwrap();

    let app = Envelope::new(FileServer::new(&root), DefaultHeaders::new());
    let res = run(&app, Request::builder("GET", "/missing.txt").build());
    assert_eq!(res.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(res.body(), b"404 page not found\n");

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn status_set_before_body_keeps_sniffed_type() {
    let app = Envelope::new(
        handler_fn(|w, _| {
            w.write_header(StatusCode::CREATED);
            Ok(w.write_all(b"<html><p>saved</p></html>")?)
        }),
        DefaultHeaders::new(),
    );

    let gz = run(&app, Request::builder("POST", "/").header("accept-encoding", "gzip").build());
    assert_eq!(gz.status(), Some(StatusCode::CREATED));
    assert_eq!(gz.sent_headers()[CONTENT_TYPE], "text/html; charset=utf-8");
    assert_eq!(gunzip(gz.body()), b"<html><p>saved</p></html>");

    let plain = run(&app, Request::builder("POST", "/").build());
    assert_eq!(plain.status(), Some(StatusCode::CREATED));
    assert_eq!(plain.sent_headers()[CONTENT_TYPE], "text/html; charset=utf-8");
}
