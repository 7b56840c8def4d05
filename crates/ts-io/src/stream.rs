//! The `OutputStream` trait and its local-file and in-memory implementations.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;

use crate::{Destination, StreamConfig};

/// An appendable byte sink bound to one destination for one session.
///
/// `close` releases the underlying handle.  It is attempted at most once per
/// handle: if it fails the handle is still released, and later calls report
/// the earlier failure instead of pretending the stream closed cleanly.
/// Writing after `close` fails.
pub trait OutputStream: Write + Send {
    /// Number of bytes accepted by `write` so far.
    fn position(&self) -> u64;

    /// Flush everything written and release the handle.
    fn close(&mut self) -> io::Result<()>;
}

/// Open a fresh stream for `destination`.
///
/// `append = true` asks to continue an existing file and is not supported:
/// every session writes a new file.  With `append = false` the destination is
/// created, or truncated when [`StreamConfig::overwrite`] is set.
pub fn open(
    destination: &Destination,
    config:      &StreamConfig,
    append:      bool,
) -> io::Result<Box<dyn OutputStream>> {
    if append {
        return Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("cannot append to existing destination {destination}"),
        ));
    }
    match destination {
        Destination::Local(path) => Ok(Box::new(LocalOutputStream::create(path, config)?)),
        Destination::Memory(sink) => Ok(Box::new(MemoryOutputStream::create(sink.clone(), config)?)),
    }
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "output stream is closed")
}

fn failed_close_error() -> io::Error {
    io::Error::other("output stream failed to close; contents may be incomplete")
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum CloseState {
    Open,
    Closed,
    Failed,
}

// ── LocalOutputStream ─────────────────────────────────────────────────────────

/// Buffered writer over a local file.
pub struct LocalOutputStream {
    inner:         Option<BufWriter<File>>,
    path:          PathBuf,
    position:      u64,
    sync_on_close: bool,
    state:         CloseState,
}

impl LocalOutputStream {
    /// Create (or truncate, per `config.overwrite`) the file at `path`.
    pub fn create(path: &Path, config: &StreamConfig) -> io::Result<Self> {
        if config.create_parent_dirs {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
        }

        let mut options = OpenOptions::new();
        options.write(true);
        if config.overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }
        let file = options.open(path)?;
        debug!("opened local output stream {}", path.display());

        Ok(Self {
            inner:         Some(BufWriter::with_capacity(config.buffer_capacity.max(1), file)),
            path:          path.to_path_buf(),
            position:      0,
            sync_on_close: config.sync_on_close,
            state:         CloseState::Open,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Write for LocalOutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let inner = self.inner.as_mut().ok_or_else(closed_error)?;
        let n = inner.write(buf)?;
        self.position += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.inner.as_mut() {
            Some(inner) => inner.flush(),
            None => Ok(()),
        }
    }
}

impl OutputStream for LocalOutputStream {
    fn position(&self) -> u64 {
        self.position
    }

    fn close(&mut self) -> io::Result<()> {
        match self.state {
            CloseState::Closed => return Ok(()),
            CloseState::Failed => return Err(failed_close_error()),
            CloseState::Open => {}
        }
        // Taking the handle first releases it on every path below.
        let Some(inner) = self.inner.take() else {
            return Ok(());
        };
        self.state = CloseState::Failed;

        let file = inner.into_inner().map_err(io::IntoInnerError::into_error)?;
        if self.sync_on_close {
            file.sync_all()?;
        }

        self.state = CloseState::Closed;
        debug!("closed {} after {} bytes", self.path.display(), self.position);
        Ok(())
    }
}

// ── Memory ────────────────────────────────────────────────────────────────────

/// Shared handle to the bytes of an in-memory destination.
#[derive(Clone, Debug, Default)]
pub struct MemorySink(Arc<Mutex<Vec<u8>>>);

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        // A panic while holding the lock cannot leave a Vec<u8> half-updated.
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Stream writing into a [`MemorySink`].
pub struct MemoryOutputStream {
    sink:     MemorySink,
    position: u64,
    closed:   bool,
}

impl MemoryOutputStream {
    /// Bind to `sink`, clearing it (or failing if it holds bytes and
    /// `config.overwrite` is off).
    pub fn create(sink: MemorySink, config: &StreamConfig) -> io::Result<Self> {
        {
            let mut bytes = sink.lock();
            if !bytes.is_empty() && !config.overwrite {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "memory destination already holds data",
                ));
            }
            bytes.clear();
        }
        Ok(Self { sink, position: 0, closed: false })
    }

    pub fn sink(&self) -> &MemorySink {
        &self.sink
    }
}

impl Write for MemoryOutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.closed {
            return Err(closed_error());
        }
        self.sink.lock().extend_from_slice(buf);
        self.position += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl OutputStream for MemoryOutputStream {
    fn position(&self) -> u64 {
        self.position
    }

    fn close(&mut self) -> io::Result<()> {
        self.closed = true;
        Ok(())
    }
}
