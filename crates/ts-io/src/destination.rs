//! Where a stream writes to.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::MemorySink;

/// The location a session's output stream is bound to.
#[derive(Clone, Debug)]
pub enum Destination {
    /// A file on the local filesystem.
    Local(PathBuf),
    /// An in-process buffer; bytes are inspected through the [`MemorySink`].
    Memory(MemorySink),
    // Future:
    // Hdfs { namenode: String, path: String },
}

impl Destination {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Destination::Local(path.into())
    }

    /// Fresh in-memory destination.  Clone the sink out of it before opening
    /// to read the bytes back.
    pub fn memory() -> Self {
        Destination::Memory(MemorySink::new())
    }

    /// Resolve a logical path into a destination.
    ///
    /// Plain paths and `file://` URIs map to [`Destination::Local`].  Any other
    /// `scheme://` has no client here and fails with `ErrorKind::Unsupported`.
    pub fn resolve(uri: &str) -> io::Result<Self> {
        if uri.trim().is_empty() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty destination"));
        }
        match uri.split_once("://") {
            None => Ok(Destination::local(uri)),
            Some(("file", rest)) if !rest.is_empty() => Ok(Destination::local(rest)),
            Some(("file", _)) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("`{uri}` has no path"),
            )),
            Some((scheme, _)) => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("no client available for scheme `{scheme}`"),
            )),
        }
    }

    /// Local path, if this destination is on the local filesystem.
    pub fn local_path(&self) -> Option<&Path> {
        match self {
            Destination::Local(p) => Some(p),
            Destination::Memory(_) => None,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Local(p) => write!(f, "{}", p.display()),
            Destination::Memory(_) => f.write_str("memory://"),
        }
    }
}
