//! Content-Type by file extension.
//!
//! Unknown extensions yield `None` so the caller can sniff the bytes instead.

use std::path::Path;

/// MIME type for a file extension (without the dot, case-insensitive).
///
/// Lookup goes through `mime_guess`; textual types get `charset=utf-8`.
///
/// # Examples
/// ```
/// use webguard::files::mime::content_type_for;
/// assert_eq!(content_type_for("html"), Some("text/html; charset=utf-8"));
/// assert_eq!(content_type_for("PNG"), Some("image/png"));
/// assert_eq!(content_type_for("notaknownext"), None);
/// ```
pub fn content_type_for(extension: &str) -> Option<&'static str> {
    mime_guess::from_ext(&extension.to_ascii_lowercase())
        .first_raw()
        .map(with_charset)
}

fn with_charset(raw: &'static str) -> &'static str {
    match raw {
        "text/html" => "text/html; charset=utf-8",
        "text/css" => "text/css; charset=utf-8",
        "text/plain" => "text/plain; charset=utf-8",
        "text/xml" => "text/xml; charset=utf-8",
        "text/csv" => "text/csv; charset=utf-8",
        "text/markdown" => "text/markdown; charset=utf-8",
        "text/javascript" | "application/javascript" => "text/javascript; charset=utf-8",
        other => other,
    }
}

/// MIME type for the extension of `path`, if it has a known one.
pub fn content_type_for_path(path: &str) -> Option<&'static str> {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .and_then(content_type_for)
}
