//! `TsFileWriter`: schema-checked append and finalization of one file.

use std::collections::HashSet;
use std::sync::Arc;

use arrow::datatypes::SchemaRef;
use log::{debug, warn};
use parquet::arrow::ArrowWriter;

use ts_core::{FileSchema, TsRecord};
use ts_io::{Destination, OutputStream, PartialFileGuard};

use crate::buffer::{RowBuffer, ValidatedRow};
use crate::config::WriterConfig;
use crate::error::{ErrorKind, Violation};
use crate::schema::arrow_schema;
use crate::{WriteError, WriteResult};

/// Lifecycle of a write session.  `Open` → `Closed` happens once, on a
/// successful [`TsFileWriter::close`]; there is no way back.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SessionState {
    Open,
    Closed,
}

/// Writes schema-validated records to a single Parquet file.
///
/// Appended rows are buffered in column builders and handed to the Parquet
/// writer every `max_buffered_rows` rows; the Parquet writer emits a row group
/// to the stream every `max_row_group_size` rows.  Nothing is guaranteed to
/// be on the stream, and the file is not readable, until [`close`] succeeds.
///
/// A writer dropped without a successful `close` leaves no footer behind, so
/// readers reject the file instead of seeing a truncated one.
///
/// If handing rows to the Parquet writer or writing the footer fails, the
/// rows in flight are lost and the file cannot be completed.  The writer
/// remembers the failure and answers every later `append`, `flush` and
/// `close` with [`WriteError::Broken`] carrying the original error kind;
/// only [`abandon`] remains.
///
/// [`abandon`]: Self::abandon
///
/// [`close`]: Self::close
pub struct TsFileWriter {
    schema:            Arc<FileSchema>,
    arrow_schema:      SchemaRef,
    writer:            Option<ArrowWriter<Box<dyn OutputStream>>>,
    buffer:            RowBuffer,
    max_buffered_rows: usize,
    records_written:   u64,
    footer_written:    bool,
    failure:           Option<Failure>,
}

/// First unrecoverable error seen by the writer.
struct Failure {
    kind:   ErrorKind,
    reason: String,
}

impl Failure {
    fn to_error(&self) -> WriteError {
        WriteError::Broken { kind: self.kind, reason: self.reason.clone() }
    }
}

impl TsFileWriter {
    /// Bind `stream` and `schema` and start the file.
    ///
    /// On error the stream has been dropped and no writer exists; the error
    /// is always [`WriteError::Construction`].
    pub fn new(
        stream: Box<dyn OutputStream>,
        schema: Arc<FileSchema>,
        config: &WriterConfig,
    ) -> WriteResult<Self> {
        config.validate().map_err(WriteError::construction)?;

        let arrow_schema = arrow_schema(&schema);
        let props = config.writer_properties(&schema);
        let writer = ArrowWriter::try_new(stream, Arc::clone(&arrow_schema), Some(props))
            .map_err(WriteError::construction)?;

        debug!(
            "opened tsfile writer: {} measurements, flush every {} rows",
            schema.len(),
            config.max_buffered_rows
        );

        Ok(Self {
            buffer:            RowBuffer::new(&schema),
            schema,
            arrow_schema,
            writer:            Some(writer),
            max_buffered_rows: config.max_buffered_rows,
            records_written:   0,
            footer_written:    false,
            failure:           None,
        })
    }

    /// Open a stream for `destination` and start the file.
    ///
    /// If anything fails after the destination was created, the partial file
    /// is removed before the error is returned.
    pub fn create(
        destination: &Destination,
        schema:      Arc<FileSchema>,
        config:      &WriterConfig,
    ) -> WriteResult<Self> {
        let stream = ts_io::open(destination, &config.stream, false).map_err(WriteError::construction)?;
        let mut guard = PartialFileGuard::new(destination);
        let writer = Self::new(stream, schema, config)?;
        guard.disarm();
        debug!("created tsfile at {destination}");
        Ok(writer)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn schema(&self) -> &Arc<FileSchema> {
        &self.schema
    }

    pub fn state(&self) -> SessionState {
        if self.writer.is_some() { SessionState::Open } else { SessionState::Closed }
    }

    pub fn is_open(&self) -> bool {
        self.state() == SessionState::Open
    }

    /// Kind of the failure that broke the writer, if any.
    pub fn failure(&self) -> Option<ErrorKind> {
        self.failure.as_ref().map(|f| f.kind)
    }

    /// Records accepted by [`append`](Self::append) so far.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Rows waiting in column builders, not yet handed to the Parquet writer.
    pub fn buffered_rows(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes that have reached the output stream.
    pub fn bytes_written(&self) -> u64 {
        self.writer.as_ref().map_or(0, |w| w.inner().position())
    }

    // ── Append ────────────────────────────────────────────────────────────

    /// Validate `record` against the schema and buffer it.
    ///
    /// A rejected record leaves no trace and the writer stays open: validation
    /// finishes before any buffer is touched.
    pub fn append(&mut self, record: TsRecord) -> WriteResult<()> {
        self.check_writable()?;

        let row = match validate(&self.schema, record) {
            Ok(row) => row,
            Err(e) => {
                warn!("rejected record: {e}");
                return Err(e);
            }
        };
        self.buffer.push(row);
        if self.buffer.len() >= self.max_buffered_rows {
            self.flush()?;
        }
        self.records_written += 1;
        Ok(())
    }

    /// Hand buffered rows to the Parquet writer.
    ///
    /// This does not make them readable; only [`close`](Self::close) does.
    pub fn flush(&mut self) -> WriteResult<()> {
        self.check_writable()?;
        let Some(writer) = self.writer.as_mut() else {
            return Err(WriteError::AlreadyClosed);
        };
        let written = match self.buffer.take_batch(&self.arrow_schema) {
            Ok(Some(batch)) => {
                debug!("flushing {} buffered rows", batch.num_rows());
                writer.write(&batch).map_err(WriteError::from)
            }
            Ok(None) => Ok(()),
            Err(e) => Err(WriteError::from(e)),
        };
        written.map_err(|e| self.fail(e))
    }

    fn check_writable(&self) -> WriteResult<()> {
        if self.writer.is_none() {
            return Err(WriteError::AlreadyClosed);
        }
        if let Some(failure) = &self.failure {
            return Err(failure.to_error());
        }
        if self.footer_written {
            return Err(WriteError::Finalized);
        }
        Ok(())
    }

    /// Remember `err` as the writer's unrecoverable failure and hand it back.
    fn fail(&mut self, err: WriteError) -> WriteError {
        warn!("tsfile writer broken after {} records: {err}", self.records_written);
        self.failure = Some(Failure { kind: err.kind(), reason: err.to_string() });
        err
    }

    // ── Close ─────────────────────────────────────────────────────────────

    /// Flush everything, write the footer and close the stream.
    ///
    /// On error the writer stays open.  If the footer was written and only
    /// closing the stream failed, `close` may be retried.  If flushing or the
    /// footer failed, the writer is broken: every retry returns
    /// [`WriteError::Broken`] and the caller should [`abandon`] it.
    /// A second call after success fails with [`WriteError::AlreadyClosed`].
    ///
    /// [`abandon`]: Self::abandon
    pub fn close(&mut self) -> WriteResult<()> {
        if self.writer.is_none() {
            return Err(WriteError::AlreadyClosed);
        }
        if let Some(failure) = &self.failure {
            return Err(failure.to_error());
        }

        if !self.footer_written {
            self.flush()?;
            let finished = match self.writer.as_mut() {
                Some(writer) => writer.finish().map(|_| ()),
                None => return Err(WriteError::AlreadyClosed),
            };
            if let Err(e) = finished {
                return Err(self.fail(e.into()));
            }
            self.footer_written = true;
        }

        let Some(writer) = self.writer.as_mut() else {
            return Err(WriteError::AlreadyClosed);
        };
        writer.inner_mut().close()?;
        let bytes = writer.inner().position();

        // Dropping the ArrowWriter releases the stream; it writes nothing more.
        self.writer = None;
        debug!("closed tsfile: {} records, {} bytes", self.records_written, bytes);
        Ok(())
    }

    /// Give up on the session without writing a footer.
    ///
    /// The stream is released; the destination is left incomplete and
    /// unreadable.  A no-op on a closed writer.
    pub fn abandon(mut self) {
        if self.writer.take().is_some() {
            warn!("abandoned tsfile after {} records; file has no footer", self.records_written);
        }
    }
}

impl Drop for TsFileWriter {
    fn drop(&mut self) {
        if self.writer.is_some() {
            warn!("tsfile writer dropped without close; file is incomplete");
        }
    }
}

/// Check every data point of `record` against `schema` and lay the values out
/// in column order.
fn validate(schema: &FileSchema, record: TsRecord) -> WriteResult<ValidatedRow> {
    if record.entity.as_str().is_empty() {
        return Err(WriteError::EmptyEntity { timestamp: record.timestamp.as_millis() });
    }
    if record.points.is_empty() {
        return Err(WriteError::EmptyRecord {
            entity:    record.entity,
            timestamp: record.timestamp.as_millis(),
        });
    }

    let mut seen = HashSet::with_capacity(record.points.len());
    for point in &record.points {
        let Some(declared) = schema.get(&point.measurement) else {
            return Err(violation(&point.measurement, Violation::Undeclared));
        };
        let found = point.value.data_type();
        if found != declared.data_type {
            return Err(violation(
                &point.measurement,
                Violation::TypeMismatch { expected: declared.data_type, found },
            ));
        }
        if !seen.insert(point.measurement.as_str()) {
            return Err(violation(&point.measurement, Violation::Duplicate));
        }
    }

    let mut slots = vec![None; schema.len()];
    for point in record.points {
        if let Some(i) = schema.position(&point.measurement) {
            slots[i] = Some(point.value);
        }
    }

    Ok(ValidatedRow { entity: record.entity, timestamp: record.timestamp, slots })
}

fn violation(measurement: &str, violation: Violation) -> WriteError {
    WriteError::SchemaViolation { measurement: measurement.to_owned(), violation }
}
