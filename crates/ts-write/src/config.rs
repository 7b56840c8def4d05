//! Writer configuration and its mapping to Parquet writer properties.

use parquet::basic::{Compression as ParquetCompression, Encoding as ParquetEncoding, ZstdLevel};
use parquet::file::metadata::KeyValue;
use parquet::file::properties::WriterProperties;
use parquet::schema::types::ColumnPath;

use ts_core::{DataType, Encoding, FileSchema};
use ts_io::StreamConfig;

use crate::{WriteError, WriteResult};

/// Key/value metadata stamped into every file footer.
pub const FORMAT_VERSION_KEY: &str = "tsfile.format_version";
pub const FORMAT_VERSION:     &str = "1";
pub const WRITER_KEY:         &str = "tsfile.writer";

/// Page compression codec.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Compression {
    Uncompressed,
    #[default]
    Snappy,
    Zstd,
}

impl Compression {
    fn to_parquet(self) -> ParquetCompression {
        match self {
            Compression::Uncompressed => ParquetCompression::UNCOMPRESSED,
            Compression::Snappy       => ParquetCompression::SNAPPY,
            Compression::Zstd         => ParquetCompression::ZSTD(ZstdLevel::default()),
        }
    }
}

/// Tuning knobs for a [`TsFileWriter`](crate::TsFileWriter).
///
/// | Field                | Default | Meaning                                          |
/// |----------------------|---------|--------------------------------------------------|
/// | `max_buffered_rows`  | 1 024   | rows held in column builders before a flush      |
/// | `max_row_group_size` | 65 536  | rows per Parquet row group written to the stream |
/// | `compression`        | Snappy  | page codec                                       |
/// | `stream`             | default | options for opening the output stream            |
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WriterConfig {
    pub max_buffered_rows:  usize,
    pub max_row_group_size: usize,
    pub compression:        Compression,
    pub stream:             StreamConfig,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            max_buffered_rows:  1_024,
            max_row_group_size: 64 * 1024,
            compression:        Compression::default(),
            stream:             StreamConfig::default(),
        }
    }
}

impl WriterConfig {
    pub fn validate(&self) -> WriteResult<()> {
        if self.max_buffered_rows == 0 {
            return Err(WriteError::Config("max_buffered_rows must be at least 1".into()));
        }
        if self.max_row_group_size == 0 {
            return Err(WriteError::Config("max_row_group_size must be at least 1".into()));
        }
        Ok(())
    }

    /// Parquet properties for a file with `schema`.  Call [`validate`] first:
    /// the Parquet builder panics on a zero row-group size.
    ///
    /// [`validate`]: Self::validate
    pub(crate) fn writer_properties(&self, schema: &FileSchema) -> WriterProperties {
        let mut builder = WriterProperties::builder()
            .set_compression(self.compression.to_parquet())
            .set_max_row_group_size(self.max_row_group_size)
            .set_key_value_metadata(Some(vec![
                KeyValue::new(FORMAT_VERSION_KEY.to_owned(), FORMAT_VERSION.to_owned()),
                KeyValue::new(WRITER_KEY.to_owned(), format!("ts-write {}", env!("CARGO_PKG_VERSION"))),
            ]));

        for m in schema.measurements() {
            let path = ColumnPath::from(m.name.as_str());
            builder = match column_encoding(m.data_type, m.encoding) {
                ColumnEncoding::Dictionary => builder.set_column_dictionary_enabled(path, true),
                ColumnEncoding::Explicit(enc) => builder
                    .set_column_dictionary_enabled(path.clone(), false)
                    .set_column_encoding(path, enc),
                ColumnEncoding::FormatDefault => builder,
            };
        }
        builder.build()
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum ColumnEncoding {
    Dictionary,
    Explicit(ParquetEncoding),
    FormatDefault,
}

/// Closest Parquet encoding for a hint on a column of `data_type`.
///
/// Parquet only supports RLE for booleans and delta packing for integers;
/// Gorilla has no Parquet counterpart.  Unsupported pairs fall back to plain
/// or to the format default so the writer never fails at encode time.
pub(crate) fn column_encoding(data_type: DataType, hint: Encoding) -> ColumnEncoding {
    match (hint, data_type) {
        (Encoding::Dictionary, _) => ColumnEncoding::Dictionary,
        (Encoding::Plain, _) | (Encoding::Gorilla, _) => ColumnEncoding::Explicit(ParquetEncoding::PLAIN),
        (Encoding::Rle, DataType::Boolean) => ColumnEncoding::Explicit(ParquetEncoding::RLE),
        (Encoding::Rle, _) => ColumnEncoding::FormatDefault,
        (Encoding::DeltaBinaryPacked, DataType::Int32 | DataType::Int64) => {
            ColumnEncoding::Explicit(ParquetEncoding::DELTA_BINARY_PACKED)
        }
        (Encoding::DeltaBinaryPacked, _) => ColumnEncoding::Explicit(ParquetEncoding::PLAIN),
    }
}
