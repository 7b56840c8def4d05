//! `TsFileReader`: reads a finalized file back into records.
//!
//! The reader needs nothing but the file: the measurement schema (including
//! encoding hints) is recovered from the embedded Arrow schema.  Files
//! without a footer, or without the tsfile format stamp, are rejected.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::{Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::{ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder};
use parquet::file::reader::ChunkReader;

use ts_core::{DataPoint, DataType, FileSchema, TsRecord, Value};

use crate::config::{FORMAT_VERSION, FORMAT_VERSION_KEY};
use crate::schema::file_schema;
use crate::{WriteError, WriteResult};

pub struct TsFileReader {
    schema:      Arc<FileSchema>,
    num_records: u64,
    batches:     ParquetRecordBatchReader,
}

impl TsFileReader {
    pub fn open(path: &Path) -> WriteResult<Self> {
        let file = File::open(path)?;
        Self::from_builder(ParquetRecordBatchReaderBuilder::try_new(file)?)
    }

    /// Read a file held in memory (e.g. a [`ts_io::MemorySink`]'s contents).
    pub fn from_bytes(bytes: impl Into<Bytes>) -> WriteResult<Self> {
        Self::from_builder(ParquetRecordBatchReaderBuilder::try_new(bytes.into())?)
    }

    fn from_builder<T: ChunkReader + 'static>(
        builder: ParquetRecordBatchReaderBuilder<T>,
    ) -> WriteResult<Self> {
        let file_meta = builder.metadata().file_metadata();
        let version = file_meta
            .key_value_metadata()
            .and_then(|kvs| kvs.iter().find(|kv| kv.key == FORMAT_VERSION_KEY))
            .and_then(|kv| kv.value.as_deref());
        match version {
            Some(FORMAT_VERSION) => {}
            Some(other) => {
                return Err(WriteError::Format(format!("unsupported format version `{other}`")));
            }
            None => return Err(WriteError::Format(format!("missing `{FORMAT_VERSION_KEY}` metadata"))),
        }

        let num_records = file_meta.num_rows().max(0) as u64;
        let schema = Arc::new(file_schema(builder.schema())?);
        let batches = builder.build()?;
        Ok(Self { schema, num_records, batches })
    }

    pub fn schema(&self) -> &Arc<FileSchema> {
        &self.schema
    }

    /// Row count from the footer, without decoding any data.
    pub fn num_records(&self) -> u64 {
        self.num_records
    }

    /// Decode every record, in append order.
    pub fn read_all(self) -> WriteResult<Vec<TsRecord>> {
        let mut records = Vec::new();
        for batch in self.batches {
            decode_batch(&self.schema, &batch?, &mut records)?;
        }
        Ok(records)
    }
}

enum ColumnView<'a> {
    Boolean(&'a BooleanArray),
    Int32(&'a Int32Array),
    Int64(&'a Int64Array),
    Float(&'a Float32Array),
    Double(&'a Float64Array),
    Text(&'a StringArray),
}

impl<'a> ColumnView<'a> {
    fn new(column: &'a ArrayRef, data_type: DataType) -> Option<Self> {
        Some(match data_type {
            DataType::Boolean => ColumnView::Boolean(column.as_boolean_opt()?),
            DataType::Int32   => ColumnView::Int32(column.as_primitive_opt::<Int32Type>()?),
            DataType::Int64   => ColumnView::Int64(column.as_primitive_opt::<Int64Type>()?),
            DataType::Float   => ColumnView::Float(column.as_primitive_opt::<Float32Type>()?),
            DataType::Double  => ColumnView::Double(column.as_primitive_opt::<Float64Type>()?),
            DataType::Text    => ColumnView::Text(column.as_string_opt::<i32>()?),
        })
    }

    fn get(&self, row: usize) -> Option<Value> {
        let array: &dyn Array = match self {
            ColumnView::Boolean(a) => *a,
            ColumnView::Int32(a)   => *a,
            ColumnView::Int64(a)   => *a,
            ColumnView::Float(a)   => *a,
            ColumnView::Double(a)  => *a,
            ColumnView::Text(a)    => *a,
        };
        if array.is_null(row) {
            return None;
        }
        Some(match self {
            ColumnView::Boolean(a) => Value::Boolean(a.value(row)),
            ColumnView::Int32(a)   => Value::Int32(a.value(row)),
            ColumnView::Int64(a)   => Value::Int64(a.value(row)),
            ColumnView::Float(a)   => Value::Float(a.value(row)),
            ColumnView::Double(a)  => Value::Double(a.value(row)),
            ColumnView::Text(a)    => Value::Text(a.value(row).to_owned()),
        })
    }
}

fn decode_batch(schema: &FileSchema, batch: &RecordBatch, out: &mut Vec<TsRecord>) -> WriteResult<()> {
    let mismatch = |name: &str| WriteError::Format(format!("column `{name}` does not match its declared type"));

    let entities = batch.column(0).as_string_opt::<i32>().ok_or_else(|| mismatch("entity"))?;
    let timestamps = batch
        .column(1)
        .as_primitive_opt::<Int64Type>()
        .ok_or_else(|| mismatch("timestamp"))?;
    let columns = schema
        .measurements()
        .iter()
        .enumerate()
        .map(|(i, m)| ColumnView::new(batch.column(i + 2), m.data_type).ok_or_else(|| mismatch(&m.name)))
        .collect::<WriteResult<Vec<_>>>()?;

    for row in 0..batch.num_rows() {
        let mut record = TsRecord::new(entities.value(row), timestamps.value(row));
        for (m, column) in schema.measurements().iter().zip(&columns) {
            if let Some(value) = column.get(row) {
                record.points.push(DataPoint { measurement: m.name.clone(), value });
            }
        }
        out.push(record);
    }
    Ok(())
}
