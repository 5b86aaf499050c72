//! Minimal webguard example: a gated JSON endpoint and a static site.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic -- [config.toml]
//!
//! Try:
//!   curl -i http://localhost:3000/api
//!   curl -i --compressed http://localhost:3000/api
//!   curl -i -X DELETE http://localhost:3000/api
//!   curl -i -H 'Origin: https://evil.test' http://localhost:3000/api
//!   curl -i http://localhost:3000/missing.html

use http::header::CONTENT_TYPE;
use http::{HeaderValue, StatusCode};
use webguard::files::FileServer;
use webguard::{handler_fn, method, Config, Envelope, Gate, Handler, Request, ResponseWriter, Server};

#[tokio::main]
async fn main() -> webguard::Result<()> {
    tracing_subscriber::fmt::init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config {
            bind: "0.0.0.0:3000".to_owned(),
            default_headers: vec![
                vec!["x-content-type-options".into(), "nosniff".into()],
                vec!["x-frame-options".into(), "SAMEORIGIN".into()],
                vec!["x-xss-protection".into(), "1; mode=block".into()],
            ],
            allowed_methods: vec!["GET".into(), "HEAD".into(), "POST".into()],
            ..Config::default()
        },
    };

    let root = config.static_root.clone().unwrap_or_else(|| "./public".into());
    let files = FileServer::new(root);
    let gated = Gate::builder(api)
        .config(&config)
        .not_allowed(handler_fn(|w, _| {
            w.write_header(StatusCode::METHOD_NOT_ALLOWED);
            Ok(w.write_all(b"method not allowed\n")?)
        }))
        .build();

    // No router: pick the gate or the file server by a fixed prefix.
    let app = handler_fn(move |w, req| {
        if req.path() == "/api" {
            gated.serve(w, req)
        } else {
            files.serve(w, req)
        }
    });

    Server::bind(&config.bind)?
        .serve(Envelope::from_config(app, &config))
        .await
}

// GET /api and POST /api share one handler; each method gets its own branch.
fn api(w: &mut dyn ResponseWriter, req: &Request) -> webguard::Result<()> {
    method::get(w, req, |w, _| {
        w.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(w.write_all(br#"{"users":["alice","bob"]}"#)?)
    })?;
    method::post(w, req, |w, req| {
        w.write_header(StatusCode::CREATED);
        Ok(w.write_all(req.body())?)
    })
}
