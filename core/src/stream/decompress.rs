//! stream/decompress.rs
//! Compressed frame stream -> trace bytes.

use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::engine::{CompiledConfig, DecodeContext, UnitHeader};
use crate::stream::frame_codec::decode_frame;
use crate::stream::framing::{max_frame_len, Frame, FrameScanner};
use crate::stream::io::{create_output, finish_output, open_input};
use crate::stream::options::StreamOptions;
use crate::stream::pipeline::{run_ordered, PipelineStats};
use crate::telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::StreamError;

/// Decode every frame from `reader` through the worker pool, handing raw
/// chunks to `on_chunk` in stream order. Shared by decompress and verify.
pub(crate) fn decode_frames<R: Read>(
    reader: R,
    config: &Arc<CompiledConfig>,
    opts: &StreamOptions,
    counters: &mut TelemetryCounters,
    timer: &mut TelemetryTimer,
    mut on_chunk: impl FnMut(u64, &[u8]) -> Result<(), StreamError>,
) -> Result<PipelineStats, StreamError> {
    let chunk_size = opts.chunk_size;
    let mut scanner = FrameScanner::new(reader, max_frame_len(chunk_size));
    let mut read_time = Duration::ZERO;

    let stats = {
        let inputs = std::iter::from_fn(|| {
            let t = Instant::now();
            let next = scanner.next().map(|r| r.map_err(StreamError::from));
            read_time += t.elapsed();
            next
        });

        run_ordered(
            &opts.profile,
            inputs,
            |_| Ok(DecodeContext::new(Arc::clone(config)).with_max_raw_len(chunk_size)),
            |ctx, frame: Frame| {
                let t = Instant::now();
                let raw = decode_frame(ctx, &frame.bytes)
                    .map_err(|e| frame_context(e, &frame))?;
                Ok((frame.bytes.len(), raw, t.elapsed()))
            },
            |index, (unit_len, raw, took)| {
                timer.add_stage_time(Stage::Decompress, took);
                counters.add_frame(raw.len(), unit_len, UnitHeader::LEN);
                on_chunk(index, &raw)
            },
        )?
    };

    if let Some(convention) = scanner.convention() {
        counters.bytes_overhead += counters.frames * convention.prefix_len() as u64;
    }
    timer.add_stage_time(Stage::Read, read_time);
    Ok(stats)
}

fn frame_context(err: StreamError, frame: &Frame) -> StreamError {
    log::debug!("[WORKER] frame {} at offset {} failed: {}", frame.index, frame.offset, err);
    err
}

pub fn decompress_stream<R: Read, W: Write>(
    reader: R,
    writer: &mut W,
    config: &Arc<CompiledConfig>,
    opts: &StreamOptions,
) -> Result<TelemetrySnapshot, StreamError> {
    opts.validate()?;
    let mut timer = TelemetryTimer::new();
    let mut counters = TelemetryCounters::default();
    let mut write_time = Duration::ZERO;

    log::info!("[PIPELINE] decompress with {} workers", opts.profile.workers);

    let stats = decode_frames(reader, config, opts, &mut counters, &mut timer, |_, raw| {
        let t = Instant::now();
        writer.write_all(raw)?;
        write_time += t.elapsed();
        Ok(())
    })?;

    timer.add_stage_time(Stage::Write, write_time);
    timer.finish();
    let snapshot = TelemetrySnapshot::from(&counters, &timer, opts.profile.workers);
    log::info!("[PIPELINE] decompressed {} frames: {}", stats.drained, snapshot.summary());
    Ok(snapshot)
}

pub fn decompress_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &Arc<CompiledConfig>,
    opts: &StreamOptions,
) -> Result<TelemetrySnapshot, StreamError> {
    let (input, output) = (input.as_ref(), output.as_ref());
    opts.validate()?;
    let (file, _) = open_input(input)?;
    let mut writer = create_output(output)?;
    let snapshot = decompress_stream(file, &mut writer, config, opts)?;
    finish_output(writer, output)?;
    Ok(snapshot)
}
