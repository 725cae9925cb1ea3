//! schema/mod.rs
//! Fixed 64-byte instruction trace record layout.
//!
//! Responsibilities:
//! - Define the closed set of field tags
//! - Define offsets, sizes and element widths once
//! - Provide a typed record view for tooling and tests
//!
//! Non-responsibilities:
//! - Splitting or merging streams (see `dispatch`)
//! - Compression

pub mod types;
pub mod record;

pub use types::{
    FieldSpec,
    FieldTag,
    NUM_FIELDS,
    RECORD_SCHEMA,
    RECORD_SIZE,
    SCHEMA_VERSION,
    field_spec,
};
pub use record::TraceRecord;
