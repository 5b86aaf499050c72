//! A filesystem root that slash-separated request paths are opened under.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// A directory whose contents may be opened by request path.
#[derive(Clone, Debug)]
pub struct Dir {
    root: PathBuf,
}

impl Dir {
    /// An empty root means the current directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = if root.as_os_str().is_empty() { PathBuf::from(".") } else { root };
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Opens `name` (a file or a directory) under the root.
    ///
    /// `name` is cleaned as if rooted at `/` first, so `..` segments can
    /// never climb above the root. Names containing NUL or a backslash are
    /// rejected with [`io::ErrorKind::InvalidInput`].
    pub fn open(&self, name: &str) -> io::Result<File> {
        File::open(self.resolve(name)?)
    }

    /// The on-disk path `name` maps to.
    pub fn resolve(&self, name: &str) -> io::Result<PathBuf> {
        if name.contains(['\0', '\\']) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid character in file path",
            ));
        }
        Ok(self.root.join(clean(name)))
    }
}

/// Lexically cleans `/`-separated `name` as if it were absolute and returns
/// it relative, without a leading slash. `""` means the root itself.
pub(crate) fn clean(name: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for seg in name.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            seg => parts.push(seg),
        }
    }
    parts.join("/")
}
