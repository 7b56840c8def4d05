//! Error type for schema and record construction.
//!
//! Writer-side failures (validation against a bound schema, I/O) live in
//! `ts-write`; this enum only covers building the core data types.

use thiserror::Error;

use crate::DataType;

#[derive(Debug, Error)]
pub enum TsError {
    #[error("schema declares no measurements")]
    EmptySchema,

    #[error("measurement name must not be empty")]
    EmptyMeasurementName,

    #[error("measurement `{0}` is declared more than once")]
    DuplicateMeasurement(String),

    #[error("measurement name `{0}` is reserved")]
    ReservedName(String),

    #[error("unknown data type `{0}`")]
    UnknownDataType(String),

    #[error("unknown encoding `{0}`")]
    UnknownEncoding(String),

    #[error("cannot parse `{input}` as {data_type}")]
    Parse { data_type: DataType, input: String },
}

/// Shorthand result type for `ts-core`.
pub type TsResult<T> = Result<T, TsError>;
