//! TOML configuration.
//!
//! Everything a host process usually wants to tweak without recompiling:
//!
//! ```toml
//! bind = "0.0.0.0:8080"
//! static_root = "./public"
//! allowed_methods = ["GET", "POST"]
//! allowed_origins = ["https://example.com"]
//! default_headers = [
//!     ["x-content-type-options", "nosniff"],
//!     ["x-frame-options", "SAMEORIGIN"],
//!     ["x-xss-protection", "1; mode=block"],
//! ]
//! ```
//!
//! A `Config` is a plain value handed to constructors; there is no global.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use tracing::info;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `host:port` for [`Server::bind`](crate::Server::bind).
    pub bind: String,

    /// Raw `[name, value]` entries; see [`DefaultHeaders`](crate::DefaultHeaders).
    pub default_headers: Vec<Vec<String>>,

    /// Method tokens accepted by a [`Gate`](crate::Gate). Case-sensitive.
    /// Left out, nothing is accepted.
    pub allowed_methods: Vec<String>,

    /// `Origin` values accepted by a gate. Empty disables the check.
    pub allowed_origins: Vec<String>,

    /// Directory served by a [`FileServer`](crate::files::FileServer).
    pub static_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_owned(),
            default_headers: Vec::new(),
            allowed_methods: Vec::new(),
            allowed_origins: Vec::new(),
            static_root: None,
        }
    }
}

impl Config {
    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = text.parse::<Self>()?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let config: Config = "".parse().unwrap();
        assert_eq!(config, Config::default());
        assert!(config.allowed_methods.is_empty());
    }

    #[test]
    fn full_document_parses() {
        let config: Config = r#"
            bind = "0.0.0.0:3000"
            static_root = "public"
            allowed_methods = ["GET", "POST"]
            allowed_origins = ["https://example.com"]
            default_headers = [["x-frame-options", "SAMEORIGIN"], ["malformed"]]
        "#
        .parse()
        .unwrap();

        assert_eq!(config.bind, "0.0.0.0:3000");
        assert_eq!(config.static_root, Some(PathBuf::from("public")));
        assert_eq!(config.allowed_methods, ["GET", "POST"]);
        assert_eq!(config.allowed_origins, ["https://example.com"]);
        // Shape is checked when headers are applied, not when parsed.
        assert_eq!(config.default_headers.len(), 2);
    }

    #[test]
    fn syntax_errors_surface_as_config_errors() {
        let err = "allowed_methods = [".parse::<Config>().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.is_io_kind(std::io::ErrorKind::NotFound));
    }
}
