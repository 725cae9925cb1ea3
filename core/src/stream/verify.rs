//! stream/verify.rs
//! Streamed byte-exact comparison of decoded output against the original.

use std::io::{self, Read};
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::engine::CompiledConfig;
use crate::stream::decompress::decode_frames;
use crate::stream::io::open_input;
use crate::stream::options::StreamOptions;
use crate::telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::StreamError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("content mismatch at offset {offset} (chunk {range_start}..{range_end})")]
    Mismatch { offset: u64, range_start: u64, range_end: u64 },

    #[error("decoded output exceeds original at offset {offset}")]
    ExceedsOriginal { offset: u64 },

    #[error("verification incomplete: {verified} of {expected} bytes verified")]
    Incomplete { verified: u64, expected: u64 },
}

/// Compares decoded chunks, in order, against an original byte source.
pub struct Verifier<R: Read> {
    original: R,
    offset: u64,
    expected: Option<u64>,
    scratch: Vec<u8>,
}

impl<R: Read> Verifier<R> {
    /// `expected_len` is the original's length when known up front.
    pub fn new(original: R, expected_len: Option<u64>) -> Self {
        Self { original, offset: 0, expected: expected_len, scratch: Vec::new() }
    }

    /// Bytes confirmed so far.
    pub fn verified(&self) -> u64 {
        self.offset
    }

    /// Check the next decoded region against the same region of the original.
    pub fn check(&mut self, decoded: &[u8]) -> Result<(), StreamError> {
        let range: Range<u64> = self.offset..self.offset + decoded.len() as u64;

        self.scratch.clear();
        let got = (&mut self.original)
            .take(decoded.len() as u64)
            .read_to_end(&mut self.scratch)?;

        if let Some(i) = self.scratch.iter().zip(decoded).position(|(a, b)| a != b) {
            return Err(VerifyError::Mismatch {
                offset: range.start + i as u64,
                range_start: range.start,
                range_end: range.end,
            }
            .into());
        }
        if got < decoded.len() {
            return Err(VerifyError::ExceedsOriginal { offset: range.start + got as u64 }.into());
        }

        self.offset = range.end;
        Ok(())
    }

    /// Confirm the whole original was covered; returns the verified length.
    pub fn finish(mut self) -> Result<u64, StreamError> {
        let expected = match self.expected {
            Some(n) => n,
            None => self.offset + io::copy(&mut self.original, &mut io::sink())?,
        };
        if self.offset != expected {
            return Err(VerifyError::Incomplete { verified: self.offset, expected }.into());
        }
        Ok(self.offset)
    }
}

/// Decode `compressed` and compare it with `original` chunk by chunk.
pub fn verify_stream<O: Read, C: Read>(
    original: O,
    original_len: Option<u64>,
    compressed: C,
    config: &Arc<CompiledConfig>,
    opts: &StreamOptions,
) -> Result<TelemetrySnapshot, StreamError> {
    opts.validate()?;
    let mut timer = TelemetryTimer::new();
    let mut counters = TelemetryCounters::default();
    let mut verifier = Verifier::new(original, original_len);
    let mut verify_time = Duration::ZERO;

    log::info!("[PIPELINE] verify with {} workers", opts.profile.workers);

    let stats = decode_frames(compressed, config, opts, &mut counters, &mut timer, |index, raw| {
        let t = Instant::now();
        let res = verifier.check(raw);
        verify_time += t.elapsed();
        if let Err(e) = &res {
            log::debug!("[VERIFY] chunk {} failed: {}", index, e);
        }
        res
    })?;

    let verified = verifier.finish()?;
    counters.add_verified(verified as usize);
    timer.add_stage_time(Stage::Verify, verify_time);
    timer.finish();

    let snapshot = TelemetrySnapshot::from(&counters, &timer, opts.profile.workers);
    log::info!("[VERIFY] {} frames, {} bytes identical", stats.drained, verified);
    Ok(snapshot)
}

pub fn verify_file(
    trace: impl AsRef<Path>,
    compressed: impl AsRef<Path>,
    config: &Arc<CompiledConfig>,
    opts: &StreamOptions,
) -> Result<TelemetrySnapshot, StreamError> {
    opts.validate()?;
    let (original, original_len) = open_input(trace.as_ref())?;
    let (compressed, _) = open_input(compressed.as_ref())?;
    verify_stream(
        io::BufReader::new(original),
        Some(original_len),
        compressed,
        config,
        opts,
    )
}
