//! File schemas: which measurements a file may contain and how to encode them.
//!
//! A [`FileSchema`] is built once, validated, and then shared immutably
//! (`Arc<FileSchema>`) for the lifetime of a write session.  Measurement
//! order is declaration order; it fixes the column order of the file.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::{TsError, TsResult};

/// Column holding the entity id of each row.
pub const ENTITY_COLUMN: &str = "entity";

/// Column holding the timestamp of each row.
pub const TIMESTAMP_COLUMN: &str = "timestamp";

// ── DataType ──────────────────────────────────────────────────────────────────

/// Value type of a measurement.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataType {
    Boolean,
    Int32,
    Int64,
    Float,
    Double,
    Text,
}

impl DataType {
    pub const ALL: [DataType; 6] = [
        DataType::Boolean,
        DataType::Int32,
        DataType::Int64,
        DataType::Float,
        DataType::Double,
        DataType::Text,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DataType::Boolean => "BOOLEAN",
            DataType::Int32   => "INT32",
            DataType::Int64   => "INT64",
            DataType::Float   => "FLOAT",
            DataType::Double  => "DOUBLE",
            DataType::Text    => "TEXT",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = TsError;

    /// Case-insensitive; `BOOL`, `LONG`, `STRING` are accepted as aliases.
    fn from_str(s: &str) -> TsResult<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BOOLEAN" | "BOOL"   => Ok(DataType::Boolean),
            "INT32" | "INT"      => Ok(DataType::Int32),
            "INT64" | "LONG"     => Ok(DataType::Int64),
            "FLOAT"              => Ok(DataType::Float),
            "DOUBLE"             => Ok(DataType::Double),
            "TEXT" | "STRING"    => Ok(DataType::Text),
            _ => Err(TsError::UnknownDataType(s.to_owned())),
        }
    }
}

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Encoding hint for a measurement column.
///
/// Hints are advisory: the writer maps each to the closest encoding the
/// columnar format supports for the column's type and falls back to the
/// format default when there is none.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Encoding {
    #[default]
    Plain,
    Dictionary,
    Rle,
    DeltaBinaryPacked,
    Gorilla,
}

impl Encoding {
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Plain             => "PLAIN",
            Encoding::Dictionary        => "DICTIONARY",
            Encoding::Rle               => "RLE",
            Encoding::DeltaBinaryPacked => "DELTA_BINARY_PACKED",
            Encoding::Gorilla           => "GORILLA",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = TsError;

    fn from_str(s: &str) -> TsResult<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PLAIN"                        => Ok(Encoding::Plain),
            "DICTIONARY" | "DICT"          => Ok(Encoding::Dictionary),
            "RLE"                          => Ok(Encoding::Rle),
            "DELTA_BINARY_PACKED" | "TS_2DIFF" | "DELTA" => Ok(Encoding::DeltaBinaryPacked),
            "GORILLA"                      => Ok(Encoding::Gorilla),
            _ => Err(TsError::UnknownEncoding(s.to_owned())),
        }
    }
}

// ── MeasurementSchema ─────────────────────────────────────────────────────────

/// Declaration of one measurement (column).
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeasurementSchema {
    pub name:      String,
    pub data_type: DataType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub encoding:  Encoding,
}

impl MeasurementSchema {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self { name: name.into(), data_type, encoding: Encoding::default() }
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}

// ── FileSchema ────────────────────────────────────────────────────────────────

/// Validated, ordered set of measurement declarations.
///
/// Guarantees: at least one measurement, names non-empty and unique, no name
/// collides with [`ENTITY_COLUMN`] or [`TIMESTAMP_COLUMN`].
#[derive(Clone, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<MeasurementSchema>", into = "Vec<MeasurementSchema>")
)]
pub struct FileSchema {
    measurements: Vec<MeasurementSchema>,
    by_name:      HashMap<String, usize>,
}

impl FileSchema {
    pub fn builder() -> FileSchemaBuilder {
        FileSchemaBuilder::default()
    }

    /// Validate `measurements` and build a schema in the given order.
    pub fn from_measurements(measurements: Vec<MeasurementSchema>) -> TsResult<Self> {
        if measurements.is_empty() {
            return Err(TsError::EmptySchema);
        }

        let mut by_name = HashMap::with_capacity(measurements.len());
        for (i, m) in measurements.iter().enumerate() {
            if m.name.is_empty() {
                return Err(TsError::EmptyMeasurementName);
            }
            if m.name == ENTITY_COLUMN || m.name == TIMESTAMP_COLUMN {
                return Err(TsError::ReservedName(m.name.clone()));
            }
            if by_name.insert(m.name.clone(), i).is_some() {
                return Err(TsError::DuplicateMeasurement(m.name.clone()));
            }
        }

        Ok(Self { measurements, by_name })
    }

    pub fn get(&self, name: &str) -> Option<&MeasurementSchema> {
        self.by_name.get(name).map(|&i| &self.measurements[i])
    }

    /// Column position of `name` among the measurements (0-based).
    pub fn position(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn measurements(&self) -> &[MeasurementSchema] {
        &self.measurements
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    /// Always `false` for a validated schema; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }
}

impl PartialEq for FileSchema {
    fn eq(&self, other: &Self) -> bool {
        self.measurements == other.measurements
    }
}

impl Eq for FileSchema {}

impl TryFrom<Vec<MeasurementSchema>> for FileSchema {
    type Error = TsError;

    fn try_from(measurements: Vec<MeasurementSchema>) -> TsResult<Self> {
        Self::from_measurements(measurements)
    }
}

impl From<FileSchema> for Vec<MeasurementSchema> {
    fn from(schema: FileSchema) -> Self {
        schema.measurements
    }
}

// ── FileSchemaBuilder ─────────────────────────────────────────────────────────

/// Fluent builder for [`FileSchema`].
///
/// ```rust
/// use ts_core::{DataType, Encoding, FileSchema};
///
/// let schema = FileSchema::builder()
///     .measurement("temperature", DataType::Double)
///     .measurement_with_encoding("status", DataType::Int32, Encoding::Rle)
///     .build()
///     .unwrap();
/// assert_eq!(schema.len(), 2);
/// ```
#[derive(Default)]
pub struct FileSchemaBuilder {
    measurements: Vec<MeasurementSchema>,
}

impl FileSchemaBuilder {
    pub fn measurement(self, name: impl Into<String>, data_type: DataType) -> Self {
        self.push(MeasurementSchema::new(name, data_type))
    }

    pub fn measurement_with_encoding(
        self,
        name:      impl Into<String>,
        data_type: DataType,
        encoding:  Encoding,
    ) -> Self {
        self.push(MeasurementSchema::new(name, data_type).with_encoding(encoding))
    }

    pub fn push(mut self, measurement: MeasurementSchema) -> Self {
        self.measurements.push(measurement);
        self
    }

    pub fn build(self) -> TsResult<FileSchema> {
        FileSchema::from_measurements(self.measurements)
    }
}
