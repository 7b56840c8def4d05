//! `RecordWriter`: the task-facing session around a [`TsFileWriter`].
//!
//! A task framework calls `write(record)` once per record, possibly from
//! several threads, and `close()` once at the end.  Calls are serialized by a
//! mutex held for the whole append, so one record is validated, buffered and
//! acknowledged before the next begins.  `close` takes the same lock and so
//! never overlaps an in-flight append.
//!
//! Unlike an observer that stores the first error for later, every error is
//! returned from the call that caused it.

use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;
use thiserror::Error;

use ts_core::{FileSchema, TsRecord};
use ts_io::Destination;

use crate::config::WriterConfig;
use crate::error::ErrorKind;
use crate::writer::{SessionState, TsFileWriter};
use crate::WriteError;

/// Error returned by [`RecordWriter`] calls.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{}: {}", .0.kind(), .0)]
    Write(#[from] WriteError),

    /// A thread panicked while holding the session; buffered state is suspect.
    #[error("I/O failure: session poisoned by a panicking writer")]
    Poisoned,
}

impl SessionError {
    /// Caller-facing error code.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Write(e) => e.kind(),
            SessionError::Poisoned => ErrorKind::IoFailure,
        }
    }

    pub fn as_write_error(&self) -> Option<&WriteError> {
        match self {
            SessionError::Write(e) => Some(e),
            SessionError::Poisoned => None,
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Thread-safe, single-writer session.  Share it through an `Arc`.
///
/// # Example
///
/// ```rust,ignore
/// let session = Arc::new(RecordWriter::open(&dest, schema, &WriterConfig::default())?);
/// session.write(TsRecord::new("A", 100).with_point("temperature", 21.5))?;
/// session.close()?;
/// ```
pub struct RecordWriter {
    inner: Mutex<TsFileWriter>,
}

impl RecordWriter {
    pub fn new(writer: TsFileWriter) -> Self {
        Self { inner: Mutex::new(writer) }
    }

    /// Create the file at `destination` and wrap its writer.
    pub fn open(
        destination: &Destination,
        schema:      Arc<FileSchema>,
        config:      &WriterConfig,
    ) -> SessionResult<Self> {
        Ok(Self::new(TsFileWriter::create(destination, schema, config)?))
    }

    fn lock(&self) -> SessionResult<MutexGuard<'_, TsFileWriter>> {
        self.inner.lock().map_err(|_| SessionError::Poisoned)
    }

    /// Append one record.  Blocks while another caller holds the session.
    pub fn write(&self, record: TsRecord) -> SessionResult<()> {
        self.lock()?.append(record)?;
        Ok(())
    }

    /// Finalize the file.  Waits for any in-flight `write` to finish first.
    pub fn close(&self) -> SessionResult<()> {
        let mut writer = self.lock()?;
        writer.close()?;
        debug!("session closed after {} records", writer.records_written());
        Ok(())
    }

    pub fn state(&self) -> SessionResult<SessionState> {
        Ok(self.lock()?.state())
    }

    pub fn records_written(&self) -> SessionResult<u64> {
        Ok(self.lock()?.records_written())
    }

    /// Unwrap the inner writer, e.g. to [`abandon`](TsFileWriter::abandon) it
    /// after a failed close.
    pub fn into_inner(self) -> SessionResult<TsFileWriter> {
        self.inner.into_inner().map_err(|_| SessionError::Poisoned)
    }
}
