//! `ts-core`: foundational types for the tsfile writer.
//!
//! Everything here is plain data shared by `ts-io`, `ts-write` and callers
//! building records.  No I/O happens in this crate.
//!
//! # Modules
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `EntityId`                                            |
//! | [`time`]        | `Timestamp`                                           |
//! | [`schema`]      | `DataType`, `Encoding`, `MeasurementSchema`, `FileSchema` |
//! | [`record`]      | `Value`, `DataPoint`, `TsRecord`                      |
//! | [`operator`]    | `Operator` query tokens                               |
//! | [`error`]       | `TsError`, `TsResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to public data types.       |

pub mod error;
pub mod ids;
pub mod operator;
pub mod record;
pub mod schema;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{TsError, TsResult};
pub use ids::EntityId;
pub use operator::Operator;
pub use record::{DataPoint, TsRecord, Value};
pub use schema::{
    DataType, Encoding, FileSchema, FileSchemaBuilder, MeasurementSchema, ENTITY_COLUMN,
    TIMESTAMP_COLUMN,
};
pub use time::Timestamp;
