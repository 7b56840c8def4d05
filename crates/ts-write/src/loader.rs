//! CSV loaders for schemas and records.
//!
//! # Schema CSV
//!
//! ```csv
//! measurement,data_type,encoding
//! temperature,DOUBLE,GORILLA
//! status,BOOLEAN,RLE
//! firmware,TEXT,
//! ```
//!
//! `encoding` may be empty (defaults to `PLAIN`).
//!
//! # Record CSV
//!
//! Long format, one measurement value per row:
//!
//! ```csv
//! entity,timestamp,measurement,value
//! A,100,temperature,21.5
//! A,100,status,true
//! A,101,temperature,21.7
//! ```
//!
//! Consecutive rows with the same `(entity, timestamp)` form one record, so
//! the example yields two records.  Values are parsed with the type declared
//! in the schema.  A measurement the schema does not declare is kept as text
//! and left for the writer to reject, so the caller sees the same
//! `SchemaViolation` it would get from any other source.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use ts_core::{FileSchema, MeasurementSchema, TsError, TsRecord, Value};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {source}")]
    Line { line: u64, source: TsError },

    #[error("schema error: {0}")]
    Schema(#[from] TsError),
}

pub type LoadResult<T> = Result<T, LoadError>;

// ── CSV rows ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SchemaRow {
    measurement: String,
    data_type:   String,
    #[serde(default)]
    encoding:    Option<String>,
}

#[derive(Deserialize)]
struct RecordRow {
    entity:      String,
    timestamp:   i64,
    measurement: String,
    value:       String,
}

fn line_of(pos: Option<&csv::Position>) -> u64 {
    pos.map_or(0, csv::Position::line)
}

// ── Public API ────────────────────────────────────────────────────────────────

pub fn load_schema_csv(path: &Path) -> LoadResult<FileSchema> {
    load_schema_reader(std::fs::File::open(path)?)
}

/// Like [`load_schema_csv`] but accepts any `Read` source.
pub fn load_schema_reader<R: Read>(reader: R) -> LoadResult<FileSchema> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut raw = csv::StringRecord::new();
    let mut measurements = Vec::new();

    while csv_reader.read_record(&mut raw)? {
        let row: SchemaRow = raw.deserialize(Some(&headers))?;
        let line = line_of(raw.position());
        let at_line = |source| LoadError::Line { line, source };

        let data_type = row.data_type.parse().map_err(at_line)?;
        let mut m = MeasurementSchema::new(row.measurement.trim(), data_type);
        if let Some(enc) = row.encoding.as_deref().filter(|e| !e.trim().is_empty()) {
            m = m.with_encoding(enc.parse().map_err(at_line)?);
        }
        measurements.push(m);
    }

    Ok(FileSchema::from_measurements(measurements)?)
}

pub fn load_records_csv(path: &Path, schema: &FileSchema) -> LoadResult<Vec<TsRecord>> {
    load_records_reader(std::fs::File::open(path)?, schema)
}

/// Like [`load_records_csv`] but accepts any `Read` source.
pub fn load_records_reader<R: Read>(reader: R, schema: &FileSchema) -> LoadResult<Vec<TsRecord>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut raw = csv::StringRecord::new();
    let mut records: Vec<TsRecord> = Vec::new();

    while csv_reader.read_record(&mut raw)? {
        let row: RecordRow = raw.deserialize(Some(&headers))?;
        let line = line_of(raw.position());

        let value = match schema.get(&row.measurement) {
            Some(declared) => Value::parse(&row.value, declared.data_type)
                .map_err(|source| LoadError::Line { line, source })?,
            None => Value::Text(row.value),
        };

        match records.last_mut() {
            Some(last) if last.entity.as_str() == row.entity && last.timestamp.0 == row.timestamp => {
                last.push(row.measurement, value);
            }
            _ => records.push(TsRecord::new(row.entity, row.timestamp).with_point(row.measurement, value)),
        }
    }

    Ok(records)
}
