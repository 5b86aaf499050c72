//! Unified error type.

/// The error type returned by webguard's fallible operations.
///
/// Client-visible failures (404, 400, etc.) are written to the
/// [`ResponseWriter`](crate::ResponseWriter) as HTTP responses, not returned
/// as `Error`s. This type surfaces what a handler or the host server cannot
/// turn into a response on its own: sink and filesystem I/O, configuration
/// parsing, and application handler failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Underlying sink, compressor or filesystem failure, unchanged.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration document could not be parsed.
    #[error("config: {0}")]
    Config(#[from] toml::de::Error),

    /// `Server::bind` was given something that is not a `host:port`.
    #[error("invalid socket address `{0}`")]
    InvalidAddress(String),

    /// Application handler failure.
    #[error("handler: {0}")]
    Handler(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    /// Wraps an arbitrary application error.
    pub fn handler<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self::Handler(err.into())
    }

    /// `true` when this error is the given [`std::io::ErrorKind`].
    pub fn is_io_kind(&self, kind: std::io::ErrorKind) -> bool {
        matches!(self, Self::Io(e) if e.kind() == kind)
    }
}

/// Convenience alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

