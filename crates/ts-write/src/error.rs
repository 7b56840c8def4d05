//! Error types for ts-write.

use std::fmt;
use std::io;

use thiserror::Error;

use ts_core::{DataType, EntityId, TsError};

/// Caller-facing classification of a [`WriteError`].
///
/// This is the code a task framework reports; the full error stays available
/// as the source.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ErrorKind {
    /// The record does not fit the bound schema.  Local to one append.
    SchemaViolation,
    /// The output stream could not be opened, written, flushed or closed.
    IoFailure,
    /// The session is already closed (or finalized and awaiting close).
    AlreadyClosed,
    /// The session could not be initialised; no writer exists.
    ConstructionFailure,
    /// The columnar encoder rejected data for a reason other than I/O.
    Encoding,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::SchemaViolation     => "schema violation",
            ErrorKind::IoFailure           => "I/O failure",
            ErrorKind::AlreadyClosed       => "already closed",
            ErrorKind::ConstructionFailure => "construction failure",
            ErrorKind::Encoding            => "encoding failure",
        })
    }
}

/// Why a record was rejected.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Violation {
    Undeclared,
    TypeMismatch { expected: DataType, found: DataType },
    Duplicate,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Undeclared => f.write_str("not declared in the file schema"),
            Violation::TypeMismatch { expected, found } => {
                write!(f, "declared as {expected} but the record holds {found}")
            }
            Violation::Duplicate => f.write_str("appears more than once in the record"),
        }
    }
}

/// Errors that can occur while writing or reading a tsfile.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("measurement `{measurement}` {violation}")]
    SchemaViolation { measurement: String, violation: Violation },

    #[error("record for {entity} at {timestamp}ms has no measurements")]
    EmptyRecord { entity: EntityId, timestamp: i64 },

    #[error("record at {timestamp}ms has an empty entity id")]
    EmptyEntity { timestamp: i64 },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(parquet::errors::ParquetError),

    #[error("file writer is already closed")]
    AlreadyClosed,

    #[error("file footer already written; only close may be retried")]
    Finalized,

    /// An earlier flush or finish failed; buffered rows were lost and the
    /// file can no longer be completed.  `kind` is that of the first failure.
    #[error("file writer failed earlier and can only be abandoned: {reason}")]
    Broken { kind: ErrorKind, reason: String },

    #[error("invalid writer configuration: {0}")]
    Config(String),

    #[error("schema error: {0}")]
    Schema(#[from] TsError),

    #[error("failed to initialise file writer: {0}")]
    Construction(#[source] Box<WriteError>),

    #[error("not a tsfile: {0}")]
    Format(String),
}

impl WriteError {
    /// Wrap `err` as a construction failure (no writer was produced).
    pub fn construction(err: impl Into<WriteError>) -> Self {
        match err.into() {
            e @ WriteError::Construction(_) => e,
            e => WriteError::Construction(Box::new(e)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WriteError::SchemaViolation { .. }
            | WriteError::EmptyRecord { .. }
            | WriteError::EmptyEntity { .. } => ErrorKind::SchemaViolation,
            WriteError::Broken { kind, .. } => *kind,
            WriteError::Io(_) => ErrorKind::IoFailure,
            WriteError::AlreadyClosed | WriteError::Finalized => ErrorKind::AlreadyClosed,
            WriteError::Construction(_) | WriteError::Config(_) => ErrorKind::ConstructionFailure,
            WriteError::Arrow(_)
            | WriteError::Parquet(_)
            | WriteError::Schema(_)
            | WriteError::Format(_) => ErrorKind::Encoding,
        }
    }

    /// The offending measurement of a schema violation.
    pub fn measurement(&self) -> Option<&str> {
        match self {
            WriteError::SchemaViolation { measurement, .. } => Some(measurement),
            _ => None,
        }
    }
}

impl From<parquet::errors::ParquetError> for WriteError {
    /// Stream failures reach us wrapped by the Parquet writer; unwrap them so
    /// they classify as [`ErrorKind::IoFailure`].
    fn from(err: parquet::errors::ParquetError) -> Self {
        match err {
            parquet::errors::ParquetError::External(inner) if inner.is::<io::Error>() => {
                match inner.downcast::<io::Error>() {
                    Ok(io_err) => WriteError::Io(*io_err),
                    Err(inner) => WriteError::Parquet(parquet::errors::ParquetError::External(inner)),
                }
            }
            other => WriteError::Parquet(other),
        }
    }
}

/// Alias for `Result<T, WriteError>`.
pub type WriteResult<T> = Result<T, WriteError>;
