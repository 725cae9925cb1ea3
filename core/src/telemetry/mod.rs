//! telemetry/mod.rs
//! Counters, stage timers and immutable snapshots for stream operations.
//!
//! Every compress/decompress/verify/train call returns a `TelemetrySnapshot`;
//! the CLI prints it as a summary line or as JSON.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
