//! telemetry/snapshot.rs
//! Immutable telemetry snapshot returned by every stream operation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::UnitHeader;
use crate::utils::format_bytes;
use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{Stage, StageTimes, TelemetryTimer};

/// Counters, ratio, throughput, stage timings and elapsed duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub frames: u64,
    pub bytes_raw: u64,
    pub bytes_compressed: u64,
    pub bytes_overhead: u64,
    pub bytes_verified: u64,
    /// `bytes_compressed / bytes_raw`; zero for an empty stream.
    pub compression_ratio: f64,
    pub throughput_raw_bytes_per_sec: f64,
    pub workers: usize,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(counters: &TelemetryCounters, timer: &TelemetryTimer, workers: usize) -> Self {
        let elapsed = timer.elapsed();

        let compression_ratio = if counters.bytes_raw > 0 {
            counters.bytes_compressed as f64 / counters.bytes_raw as f64
        } else {
            0.0
        };

        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_raw as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            frames: counters.frames,
            bytes_raw: counters.bytes_raw,
            bytes_compressed: counters.bytes_compressed,
            bytes_overhead: counters.bytes_overhead,
            bytes_verified: counters.bytes_verified,
            compression_ratio,
            throughput_raw_bytes_per_sec: throughput,
            workers,
            elapsed,
            stage_times: timer.stage_times.clone(),
        }
    }

    pub fn total_stage_time(&self) -> Duration {
        self.stage_times.total()
    }

    pub fn has_all_stages(&self, expected: &[Stage]) -> bool {
        self.stage_times.has_all(expected)
    }

    /// Internal consistency: every frame carries a unit header and nothing
    /// was verified beyond what was produced.
    pub fn sanity_check(&self) -> bool {
        self.bytes_overhead >= self.unit_header_bytes()
            && (self.bytes_verified == 0 || self.bytes_verified == self.bytes_raw)
    }

    /// Bytes of the compressed file (units plus length prefixes).
    pub fn output_bytes(&self) -> u64 {
        self.bytes_compressed + self.bytes_overhead.saturating_sub(self.unit_header_bytes())
    }

    fn unit_header_bytes(&self) -> u64 {
        self.frames * UnitHeader::LEN as u64
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        format!(
            "{} frames, {} raw -> {} compressed (ratio {:.4}), {:.1} MiB/s, {:.3}s",
            self.frames,
            format_bytes(self.bytes_raw),
            format_bytes(self.bytes_compressed),
            self.compression_ratio,
            self.throughput_raw_bytes_per_sec / (1024.0 * 1024.0),
            self.elapsed.as_secs_f64(),
        )
    }
}
