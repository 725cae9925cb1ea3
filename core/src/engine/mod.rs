//! engine/mod.rs
//! Unit engine: turns one raw chunk into one self-describing compressed unit.
//!
//! Responsibilities:
//! - Transform configuration (serialized form, validation, baseline)
//! - Transform registry and configuration compile step
//! - Per-worker encode/decode contexts over a shared compiled config
//! - Unit wire format, `compress_bound`, `compressed_size`
//!
//! Non-responsibilities:
//! - Chunking, framing conventions, threading (see `stream`)
//! - Choosing codecs (see `training`)

pub mod types;
pub mod config;
pub mod registry;
pub mod compiled;
pub mod unit;
pub mod context;

pub use types::{ConfigError, EngineError};
pub use config::{
    ClusterSpec,
    CodecSpec,
    FieldStrategy,
    TransformConfig,
    CONFIG_FORMAT_VERSION,
    CONFIG_MAGIC,
};
pub use registry::TransformRegistry;
pub use compiled::{CompiledConfig, SectionPlan};
pub use unit::{
    compress_bound,
    compressed_size,
    probe_unit,
    SectionKind,
    UnitFlags,
    UnitHeader,
    UNIT_MAGIC,
    UNIT_VERSION,
};
pub use context::{DecodeContext, EncodeContext};
