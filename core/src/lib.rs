//! fieldpack-core
//!
//! Schema-aware compression for fixed-layout trace logs.
//! Records are split into per-field streams, coded per field, and streamed
//! through an ordered parallel pipeline.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;

// Data model and codec engine
pub mod schema;
pub mod dispatch;
pub mod compression;
pub mod engine;
pub mod telemetry;

// Stream layers
pub mod stream;
pub mod training;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::engine::{CompiledConfig, TransformConfig};
    pub use crate::stream::{
        compress_file, decompress_file, verify_file, FrameConvention, ParallelismProfile,
        StreamOptions,
    };
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::training::{train_file, TrainParams};
    pub use crate::types::StreamError;
}
