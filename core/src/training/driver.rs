//! training/driver.rs
//! Sample loading, optimizer invocation and config selection.

use std::io::Read;
use std::path::Path;

use crate::constants::TRAIN_SAMPLE_LIMIT;
use crate::engine::{CompiledConfig, TransformConfig};
use crate::stream::io::open_input;
use crate::telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::training::optimizer::Optimizer;
use crate::training::trial::TrialOptimizer;
use crate::training::types::{GraphTemplate, TrainError, TrainParams};
use crate::types::StreamError;
use crate::utils::{align_down_to_record, format_bytes};

/// Run `optimizer` over `corpus` with the baseline template and return the
/// top-ranked configuration.
pub fn train_config(
    corpus: &[&[u8]],
    params: &TrainParams,
    optimizer: &dyn Optimizer,
) -> Result<TransformConfig, TrainError> {
    let template = GraphTemplate::baseline(params);
    log::debug!(
        "[TRAIN] optimizer={} entry={} clustering={} pareto={}",
        optimizer.name(),
        template.entry_transform,
        params.clustering,
        params.pareto_frontier
    );

    let candidates = optimizer.train(corpus, &template, params)?;
    log::info!("[TRAIN] {} candidate configurations", candidates.len());

    let best = candidates.into_iter().next().ok_or(TrainError::NoCandidate)?;
    // Reject anything the engine could not load back.
    CompiledConfig::compile_builtin(best.clone())?;
    Ok(best)
}

/// Read the record-aligned training sample: at most `TRAIN_SAMPLE_LIMIT`
/// bytes from the start of `reader`.
pub fn load_sample<R: Read>(mut reader: R, total_len: u64) -> Result<Vec<u8>, StreamError> {
    let want = align_down_to_record(total_len.min(TRAIN_SAMPLE_LIMIT as u64) as usize);
    let mut sample = vec![0u8; want];
    reader.read_exact(&mut sample)?;
    Ok(sample)
}

/// Train on `trace` with the built-in optimizer and write the chosen
/// configuration to `output`.
pub fn train_file(
    trace: impl AsRef<Path>,
    output: impl AsRef<Path>,
    params: &TrainParams,
) -> Result<TelemetrySnapshot, StreamError> {
    let (trace, output) = (trace.as_ref(), output.as_ref());
    let mut timer = TelemetryTimer::new();
    let mut counters = TelemetryCounters::default();

    let (file, total_len) = open_input(trace)?;
    let sample = timer.measure(Stage::Read, || load_sample(file, total_len))?;
    if sample.is_empty() {
        return Err(TrainError::EmptyCorpus.into());
    }
    log::info!(
        "[TRAIN] sample {} of {} from {}",
        format_bytes(sample.len() as u64),
        format_bytes(total_len),
        trace.display()
    );

    let config = timer.measure(Stage::Train, || {
        train_config(&[sample.as_slice()], params, &TrialOptimizer)
    })?;
    for line in config.describe() {
        log::debug!("[TRAIN]   {}", line);
    }

    let written = config.save(output)?;
    log::info!("[TRAIN] wrote {} config to {}", format_bytes(written as u64), output.display());

    counters.bytes_raw = sample.len() as u64;
    counters.bytes_compressed = written as u64;
    timer.finish();
    Ok(TelemetrySnapshot::from(&counters, &timer, params.threads))
}
