//! `ts-write`: the record-append write path.
//!
//! Records are validated against a [`FileSchema`](ts_core::FileSchema),
//! buffered column-wise and written as a single Parquet file through a
//! [`ts_io::OutputStream`].  The file is readable only after a successful
//! close, which writes the footer.
//!
//! | Type             | Role                                                      |
//! |------------------|-----------------------------------------------------------|
//! | [`TsFileWriter`] | owns stream + schema; `append`, `flush`, `close`           |
//! | [`RecordWriter`] | thread-safe session; serializes `write`/`close` calls      |
//! | [`TsFileReader`] | reads a finalized file back into records                  |
//! | [`loader`]       | CSV loaders for schemas and long-format records           |
//!
//! # Usage
//!
//! ```rust,ignore
//! use ts_write::{RecordWriter, WriterConfig};
//!
//! let session = RecordWriter::open(&Destination::local("out.tsfile"), schema, &WriterConfig::default())?;
//! session.write(TsRecord::new("A", 100).with_point("temperature", 21.5))?;
//! session.close()?;
//!
//! let records = TsFileReader::open(Path::new("out.tsfile"))?.read_all()?;
//! ```

mod buffer;
pub mod config;
pub mod error;
pub mod loader;
pub mod reader;
pub mod schema;
pub mod session;
pub mod writer;

#[cfg(test)]
mod tests;

pub use config::{Compression, WriterConfig};
pub use error::{ErrorKind, Violation, WriteError, WriteResult};
pub use loader::{load_records_csv, load_records_reader, load_schema_csv, load_schema_reader, LoadError};
pub use reader::TsFileReader;
pub use session::{RecordWriter, SessionError, SessionResult};
pub use writer::{SessionState, TsFileWriter};
