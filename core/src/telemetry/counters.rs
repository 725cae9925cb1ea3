//! telemetry/counters.rs
//! Mutable counters used during streaming pipelines.
//!
//! Updated only by the draining thread, then converted into an immutable
//! `TelemetrySnapshot` at the end of the run.
use bincode::{Decode, Encode};

/// Deterministic counters collected during stream processing.
#[derive(Default, Clone, Debug, Encode, Decode, PartialEq, Eq)]
pub struct TelemetryCounters {
    /// Units written or decoded; one per chunk.
    pub frames: u64,
    /// Raw trace bytes read or reproduced.
    pub bytes_raw: u64,
    /// Bytes of compressed units, excluding framing.
    pub bytes_compressed: u64,
    /// Length prefixes and unit headers.
    pub bytes_overhead: u64,
    /// Original bytes confirmed equal by the verifier.
    pub bytes_verified: u64,
}

impl TelemetryCounters {
    /// Record one frame.
    ///
    /// - `raw_len`: chunk length before compression
    /// - `unit_len`: compressed unit length
    /// - `overhead_len`: structural bytes (prefix + unit header)
    pub fn add_frame(&mut self, raw_len: usize, unit_len: usize, overhead_len: usize) {
        self.frames += 1;
        self.bytes_raw += raw_len as u64;
        self.bytes_compressed += unit_len as u64;
        self.bytes_overhead += overhead_len as u64;
    }

    pub fn add_verified(&mut self, len: usize) {
        self.bytes_verified += len as u64;
    }
}
