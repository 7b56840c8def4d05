//! Per-measurement column buffers.
//!
//! Rows are accumulated in Arrow builders, one per column, and drained into a
//! `RecordBatch` when the writer flushes.  Only rows that already passed
//! validation reach this module, so every value matches its column type.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanBuilder, Float32Builder, Float64Builder, Int32Builder, Int64Builder,
    StringBuilder,
};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use arrow::datatypes::SchemaRef;

use ts_core::{DataType, EntityId, FileSchema, Timestamp, Value};

/// A record that passed validation: one slot per measurement, in schema order.
pub(crate) struct ValidatedRow {
    pub entity:    EntityId,
    pub timestamp: Timestamp,
    pub slots:     Vec<Option<Value>>,
}

enum ColumnBuilder {
    Boolean(BooleanBuilder),
    Int32(Int32Builder),
    Int64(Int64Builder),
    Float(Float32Builder),
    Double(Float64Builder),
    Text(StringBuilder),
}

impl ColumnBuilder {
    fn new(data_type: DataType) -> Self {
        match data_type {
            DataType::Boolean => ColumnBuilder::Boolean(BooleanBuilder::new()),
            DataType::Int32   => ColumnBuilder::Int32(Int32Builder::new()),
            DataType::Int64   => ColumnBuilder::Int64(Int64Builder::new()),
            DataType::Float   => ColumnBuilder::Float(Float32Builder::new()),
            DataType::Double  => ColumnBuilder::Double(Float64Builder::new()),
            DataType::Text    => ColumnBuilder::Text(StringBuilder::new()),
        }
    }

    fn append(&mut self, value: Option<Value>) {
        match (self, value) {
            (ColumnBuilder::Boolean(b), Some(Value::Boolean(v))) => b.append_value(v),
            (ColumnBuilder::Int32(b),   Some(Value::Int32(v)))   => b.append_value(v),
            (ColumnBuilder::Int64(b),   Some(Value::Int64(v)))   => b.append_value(v),
            (ColumnBuilder::Float(b),   Some(Value::Float(v)))   => b.append_value(v),
            (ColumnBuilder::Double(b),  Some(Value::Double(v)))  => b.append_value(v),
            (ColumnBuilder::Text(b),    Some(Value::Text(v)))    => b.append_value(v),
            (builder, None) => builder.append_null(),
            (_, Some(v)) => unreachable!("{} value reached a column of another type", v.data_type()),
        }
    }

    fn append_null(&mut self) {
        match self {
            ColumnBuilder::Boolean(b) => b.append_null(),
            ColumnBuilder::Int32(b)   => b.append_null(),
            ColumnBuilder::Int64(b)   => b.append_null(),
            ColumnBuilder::Float(b)   => b.append_null(),
            ColumnBuilder::Double(b)  => b.append_null(),
            ColumnBuilder::Text(b)    => b.append_null(),
        }
    }

    fn finish(&mut self) -> ArrayRef {
        match self {
            ColumnBuilder::Boolean(b) => Arc::new(b.finish()),
            ColumnBuilder::Int32(b)   => Arc::new(b.finish()),
            ColumnBuilder::Int64(b)   => Arc::new(b.finish()),
            ColumnBuilder::Float(b)   => Arc::new(b.finish()),
            ColumnBuilder::Double(b)  => Arc::new(b.finish()),
            ColumnBuilder::Text(b)    => Arc::new(b.finish()),
        }
    }
}

/// Buffered rows not yet handed to the Parquet writer.
pub(crate) struct RowBuffer {
    entities:   StringBuilder,
    timestamps: Int64Builder,
    columns:    Vec<ColumnBuilder>,
    rows:       usize,
}

impl RowBuffer {
    pub fn new(schema: &FileSchema) -> Self {
        Self {
            entities:   StringBuilder::new(),
            timestamps: Int64Builder::new(),
            columns:    schema.measurements().iter().map(|m| ColumnBuilder::new(m.data_type)).collect(),
            rows:       0,
        }
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn push(&mut self, row: ValidatedRow) {
        debug_assert_eq!(row.slots.len(), self.columns.len());
        self.entities.append_value(row.entity.as_str());
        self.timestamps.append_value(row.timestamp.as_millis());
        for (column, slot) in self.columns.iter_mut().zip(row.slots) {
            column.append(slot);
        }
        self.rows += 1;
    }

    /// Drain all buffered rows into a batch; `None` when nothing is buffered.
    pub fn take_batch(&mut self, schema: &SchemaRef) -> Result<Option<RecordBatch>, ArrowError> {
        if self.rows == 0 {
            return Ok(None);
        }
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(self.columns.len() + 2);
        arrays.push(Arc::new(self.entities.finish()));
        arrays.push(Arc::new(self.timestamps.finish()));
        arrays.extend(self.columns.iter_mut().map(ColumnBuilder::finish));
        self.rows = 0;
        RecordBatch::try_new(Arc::clone(schema), arrays).map(Some)
    }
}
