//! Mapping between a [`FileSchema`] and the Arrow schema of the file.
//!
//! Column layout: `entity` (Utf8), `timestamp` (Int64), then one nullable
//! column per measurement in declaration order.  Each measurement field
//! carries its encoding hint in field metadata so a reader can rebuild the
//! exact `FileSchema` from the file alone.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::datatypes::{DataType as ArrowType, Field, Schema, SchemaRef};

use ts_core::{DataType, Encoding, FileSchema, MeasurementSchema, ENTITY_COLUMN, TIMESTAMP_COLUMN};

use crate::{WriteError, WriteResult};

/// Field-metadata key holding a measurement's encoding hint.
pub const ENCODING_METADATA_KEY: &str = "tsfile.encoding";

pub fn arrow_type(data_type: DataType) -> ArrowType {
    match data_type {
        DataType::Boolean => ArrowType::Boolean,
        DataType::Int32   => ArrowType::Int32,
        DataType::Int64   => ArrowType::Int64,
        DataType::Float   => ArrowType::Float32,
        DataType::Double  => ArrowType::Float64,
        DataType::Text    => ArrowType::Utf8,
    }
}

fn data_type_of(field: &Field) -> Option<DataType> {
    match field.data_type() {
        ArrowType::Boolean => Some(DataType::Boolean),
        ArrowType::Int32   => Some(DataType::Int32),
        ArrowType::Int64   => Some(DataType::Int64),
        ArrowType::Float32 => Some(DataType::Float),
        ArrowType::Float64 => Some(DataType::Double),
        ArrowType::Utf8    => Some(DataType::Text),
        _ => None,
    }
}

/// Arrow schema of a file written with `schema`.
pub fn arrow_schema(schema: &FileSchema) -> SchemaRef {
    let mut fields = Vec::with_capacity(schema.len() + 2);
    fields.push(Field::new(ENTITY_COLUMN,    ArrowType::Utf8,  false));
    fields.push(Field::new(TIMESTAMP_COLUMN, ArrowType::Int64, false));
    for m in schema.measurements() {
        let metadata = HashMap::from([(ENCODING_METADATA_KEY.to_owned(), m.encoding.name().to_owned())]);
        fields.push(Field::new(&m.name, arrow_type(m.data_type), true).with_metadata(metadata));
    }
    Arc::new(Schema::new(fields))
}

/// Rebuild the [`FileSchema`] of a file from its Arrow schema.
pub fn file_schema(arrow: &Schema) -> WriteResult<FileSchema> {
    let fields = arrow.fields();
    let leading_ok = fields.len() > 2
        && fields[0].name() == ENTITY_COLUMN
        && fields[0].data_type() == &ArrowType::Utf8
        && fields[1].name() == TIMESTAMP_COLUMN
        && fields[1].data_type() == &ArrowType::Int64;
    if !leading_ok {
        return Err(WriteError::Format(format!(
            "expected leading `{ENTITY_COLUMN}: Utf8, {TIMESTAMP_COLUMN}: Int64` columns and at least one measurement"
        )));
    }

    let measurements = fields[2..]
        .iter()
        .map(|field| {
            let data_type = data_type_of(field).ok_or_else(|| {
                WriteError::Format(format!(
                    "column `{}` has unsupported type {}",
                    field.name(),
                    field.data_type()
                ))
            })?;
            let encoding = match field.metadata().get(ENCODING_METADATA_KEY) {
                Some(hint) => hint.parse::<Encoding>()?,
                None => Encoding::default(),
            };
            Ok(MeasurementSchema::new(field.name().clone(), data_type).with_encoding(encoding))
        })
        .collect::<WriteResult<Vec<_>>>()?;

    Ok(FileSchema::from_measurements(measurements)?)
}
