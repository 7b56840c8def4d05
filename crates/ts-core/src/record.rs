//! Records: one entity, one timestamp, one or more measurement values.

use std::fmt;

use crate::{DataType, EntityId, Timestamp, TsError, TsResult};

// ── Value ─────────────────────────────────────────────────────────────────────

/// A single typed measurement value.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Float(f32),
    Double(f64),
    Text(String),
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Boolean(_) => DataType::Boolean,
            Value::Int32(_)   => DataType::Int32,
            Value::Int64(_)   => DataType::Int64,
            Value::Float(_)   => DataType::Float,
            Value::Double(_)  => DataType::Double,
            Value::Text(_)    => DataType::Text,
        }
    }

    /// Parse `input` as a value of `data_type`.
    ///
    /// Booleans accept `true`/`false`/`1`/`0` (case-insensitive).  Text is
    /// taken verbatim; every other type is trimmed first.
    pub fn parse(input: &str, data_type: DataType) -> TsResult<Value> {
        let err = || TsError::Parse { data_type, input: input.to_owned() };
        let trimmed = input.trim();
        let value = match data_type {
            DataType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "1"  => Value::Boolean(true),
                "false" | "0" => Value::Boolean(false),
                _ => return Err(err()),
            },
            DataType::Int32  => Value::Int32(trimmed.parse().map_err(|_| err())?),
            DataType::Int64  => Value::Int64(trimmed.parse().map_err(|_| err())?),
            DataType::Float  => Value::Float(trimmed.parse().map_err(|_| err())?),
            DataType::Double => Value::Double(trimmed.parse().map_err(|_| err())?),
            DataType::Text   => Value::Text(input.to_owned()),
        };
        Ok(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Int32(v)   => write!(f, "{v}"),
            Value::Int64(v)   => write!(f, "{v}"),
            Value::Float(v)   => write!(f, "{v}"),
            Value::Double(v)  => write!(f, "{v}"),
            Value::Text(v)    => f.write_str(v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

// ── DataPoint ─────────────────────────────────────────────────────────────────

/// One `(measurement, value)` pair inside a record.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataPoint {
    pub measurement: String,
    pub value:       Value,
}

impl DataPoint {
    pub fn new(measurement: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { measurement: measurement.into(), value: value.into() }
    }
}

// ── TsRecord ──────────────────────────────────────────────────────────────────

/// A timestamped bundle of measurement values for one entity.
///
/// Records are plain data: nothing here checks them against a schema.  That
/// happens when a record is appended to a writer.
///
/// ```rust
/// use ts_core::TsRecord;
///
/// let record = TsRecord::new("A", 100).with_point("temperature", 21.5);
/// assert_eq!(record.len(), 1);
/// ```
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TsRecord {
    pub entity:    EntityId,
    pub timestamp: Timestamp,
    pub points:    Vec<DataPoint>,
}

impl TsRecord {
    pub fn new(entity: impl Into<EntityId>, timestamp: impl Into<Timestamp>) -> Self {
        Self { entity: entity.into(), timestamp: timestamp.into(), points: Vec::new() }
    }

    pub fn with_point(mut self, measurement: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(measurement, value);
        self
    }

    pub fn push(&mut self, measurement: impl Into<String>, value: impl Into<Value>) {
        self.points.push(DataPoint::new(measurement, value));
    }

    /// Value of `measurement`, if present.  First match wins.
    pub fn get(&self, measurement: &str) -> Option<&Value> {
        self.points.iter().find(|p| p.measurement == measurement).map(|p| &p.value)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
