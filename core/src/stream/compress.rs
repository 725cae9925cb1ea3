//! stream/compress.rs
//! Trace file -> compressed frame stream.

use std::cell::Cell;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::engine::{CompiledConfig, EncodeContext, UnitHeader};
use crate::stream::chunking::{Chunk, ChunkReader};
use crate::stream::frame_codec::encode_chunk;
use crate::stream::framing::write_frame;
use crate::stream::io::{create_output, finish_output, open_input};
use crate::stream::options::StreamOptions;
use crate::stream::pipeline::run_ordered;
use crate::telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::StreamError;
use crate::utils::format_bytes;

/// Compress `total_len` bytes from `reader` into `writer`, one frame per chunk.
pub fn compress_stream<R: Read, W: Write>(
    reader: R,
    total_len: u64,
    writer: &mut W,
    config: &Arc<CompiledConfig>,
    opts: &StreamOptions,
) -> Result<TelemetrySnapshot, StreamError> {
    opts.validate()?;
    let mut timer = TelemetryTimer::new();
    let mut counters = TelemetryCounters::default();
    let convention = opts.convention;
    let overhead = convention.prefix_len() + UnitHeader::LEN;

    log::info!(
        "[PIPELINE] compress {} in chunks of {} with {} workers ({:?})",
        format_bytes(total_len),
        format_bytes(opts.chunk_size as u64),
        opts.profile.workers,
        convention
    );

    let read_time = Cell::new(Duration::ZERO);
    let mut chunks = ChunkReader::new(reader, total_len, opts.chunk_size)?;
    let inputs = std::iter::from_fn(|| {
        let t = Instant::now();
        let next = chunks.next();
        read_time.set(read_time.get() + t.elapsed());
        next
    });

    let stats = run_ordered(
        &opts.profile,
        inputs,
        |_| Ok(EncodeContext::new(Arc::clone(config))?),
        |ctx, chunk: Chunk| {
            let t = Instant::now();
            let unit = encode_chunk(ctx, &chunk.bytes)?;
            Ok((chunk.len(), unit, t.elapsed()))
        },
        |index, (raw_len, unit, took)| {
            timer.add_stage_time(Stage::Compress, took);
            let t = Instant::now();
            write_frame(&mut *writer, convention, &unit)?;
            timer.add_stage_time(Stage::Write, t.elapsed());
            counters.add_frame(raw_len, unit.len(), overhead);
            log::trace!("[WRITER] frame {}: {} -> {} bytes", index, raw_len, unit.len());
            Ok(())
        },
    )?;

    timer.add_stage_time(Stage::Read, read_time.get());
    timer.finish();
    let snapshot = TelemetrySnapshot::from(&counters, &timer, opts.profile.workers);
    log::info!("[PIPELINE] compressed {} chunks: {}", stats.drained, snapshot.summary());
    Ok(snapshot)
}

/// Compress the trace at `input` into `output`.
pub fn compress_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &Arc<CompiledConfig>,
    opts: &StreamOptions,
) -> Result<TelemetrySnapshot, StreamError> {
    let (input, output) = (input.as_ref(), output.as_ref());
    opts.validate()?;
    let (file, len) = open_input(input)?;
    let mut writer = create_output(output)?;
    let snapshot = compress_stream(file, len, &mut writer, config, opts)?;
    finish_output(writer, output)?;
    Ok(snapshot)
}
