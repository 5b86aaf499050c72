//! Static file serving with a custom 404 document.
//!
//! Three layers, innermost first:
//!
//! - [`Dir`] opens slash-separated names under a root, never escaping it.
//! - [`NotFoundResolver`] swaps a missing file, or a directory without an
//!   `index.html`, for `/error404.html` under the same root, served with
//!   `404 Not Found`.
//! - [`FileServer`] is the [`Handler`](crate::Handler) that turns the
//!   resolved handle into a response.
//!
//! ```rust,no_run
//! use webguard::files::FileServer;
//! use webguard::{DefaultHeaders, Envelope, Server};
//!
//! # async fn run() -> webguard::Result<()> {
//! let site = Envelope::new(FileServer::new("./public"), DefaultHeaders::new());
//! Server::bind("0.0.0.0:8080")?.serve(site).await
//! # }
//! ```

mod dir;
pub mod mime;
mod resolver;
mod server;

pub use dir::Dir;
pub use resolver::{NotFoundResolver, NOT_FOUND_DOCUMENT};
pub use server::FileServer;

#[cfg(test)]
pub(crate) mod testdir {
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    /// A unique scratch directory, removed on drop.
    pub(crate) struct TestDir(PathBuf);

    impl TestDir {
        pub(crate) fn new(prefix: &str) -> Self {
            static SEQ: AtomicUsize = AtomicUsize::new(0);
            let ts = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock should be after unix epoch")
                .as_nanos();
            let seq = SEQ.fetch_add(1, Ordering::Relaxed);
            let dir = std::env::temp_dir()
                .join(format!("{prefix}-{}-{ts}-{seq}", std::process::id()));
            std::fs::create_dir_all(&dir).expect("failed to create temp dir");
            Self(dir)
        }

        pub(crate) fn path(&self) -> &Path {
            &self.0
        }

        pub(crate) fn file(&self, rel: &str, contents: &str) -> &Self {
            let path = self.0.join(rel);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("failed to create parent dir");
            }
            std::fs::write(path, contents).expect("failed to write test file");
            self
        }

        pub(crate) fn dir(&self, rel: &str) -> &Self {
            std::fs::create_dir_all(self.0.join(rel)).expect("failed to create test dir");
            self
        }
    }

    impl Drop for TestDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }
}
