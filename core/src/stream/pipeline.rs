//! stream/pipeline.rs
//! Ordered parallel pipeline: fixed worker pool + bounded FIFO of tasks.
//!
//! The caller's thread admits inputs and is the only one touching `sink`.
//! Each admitted task gets a one-shot result channel; the FIFO of those
//! channels is capped at `profile.inflight`. When the FIFO is full the
//! oldest task is awaited and drained before the next input is even pulled
//! from the source, so results reach `sink` in submission order and no more
//! than `inflight` inputs are held at once.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::thread;

use crossbeam::channel::{bounded, Receiver, Sender};

use crate::stream::parallelism::ParallelismProfile;
use crate::types::StreamError;

/// Counts reported by one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub submitted: u64,
    pub drained: u64,
    /// Peak number of admitted-but-undrained tasks.
    pub max_inflight: usize,
}

struct Job<In, Out> {
    index: u64,
    input: In,
    reply: Sender<Result<Out, StreamError>>,
}

/// Shared abort state: the flag stops workers from starting queued jobs and
/// the slot keeps the first task error.
struct AbortState {
    aborted: AtomicBool,
    first_error: Mutex<Option<String>>,
}

impl AbortState {
    fn new() -> Self {
        Self { aborted: AtomicBool::new(false), first_error: Mutex::new(None) }
    }

    fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    /// Records the reason before raising the flag, so a task skipped because
    /// of the flag always finds it.
    fn abort(&self, reason: Option<&StreamError>) {
        if let (Some(err), Ok(mut slot)) = (reason, self.first_error.lock()) {
            if slot.is_none() {
                *slot = Some(err.to_string());
            }
        }
        self.aborted.store(true, Ordering::Release);
    }

    fn disconnected(&self, index: u64) -> StreamError {
        let first = self.first_error.lock().ok().and_then(|s| s.clone());
        match first {
            Some(msg) => StreamError::Pipeline(format!("task {} abandoned after failure: {}", index, msg)),
            None => StreamError::Pipeline(format!("worker disconnected before task {} completed", index)),
        }
    }
}

/// Run `work` over `inputs` on `profile.workers` threads and hand results
/// to `sink` in input order.
///
/// - `make_context(i)` builds worker `i`'s private context up front.
/// - Any error (input, context, task, sink) aborts the run: nothing more is
///   admitted, queued tasks are skipped, and the first error is returned.
pub fn run_ordered<I, In, Out, Ctx, MakeCtx, Work, Sink>(
    profile: &ParallelismProfile,
    inputs: I,
    make_context: MakeCtx,
    work: Work,
    mut sink: Sink,
) -> Result<PipelineStats, StreamError>
where
    I: IntoIterator<Item = Result<In, StreamError>>,
    In: Send,
    Out: Send,
    Ctx: Send,
    MakeCtx: Fn(usize) -> Result<Ctx, StreamError>,
    Work: Fn(&mut Ctx, In) -> Result<Out, StreamError> + Sync,
    Sink: FnMut(u64, Out) -> Result<(), StreamError>,
{
    let workers = profile.workers.max(1);
    let inflight = profile.inflight.max(workers);

    let contexts = (0..workers).map(&make_context).collect::<Result<Vec<Ctx>, _>>()?;

    let state = AbortState::new();
    let (job_tx, job_rx) = bounded::<Job<In, Out>>(inflight);
    let mut stats = PipelineStats::default();

    log::debug!("[PIPELINE] start: workers={} inflight={}", workers, inflight);

    let result = thread::scope(|scope| {
        // ---- Workers ----
        for (i, mut ctx) in contexts.into_iter().enumerate() {
            let rx = job_rx.clone();
            let work = &work;
            let state = &state;
            scope.spawn(move || {
                log::trace!("[WORKER-{i}] starting");
                for job in rx.iter() {
                    if state.is_aborted() {
                        log::trace!("[WORKER-{i}] skipping task {}", job.index);
                        continue;
                    }
                    let res = work(&mut ctx, job.input);
                    if let Err(e) = &res {
                        log::debug!("[WORKER-{i}] task {} failed: {}", job.index, e);
                        state.abort(Some(e));
                    }
                    // Receiver is gone only when the run is already aborting.
                    let _ = job.reply.send(res);
                }
                log::trace!("[WORKER-{i}] finished");
            });
        }
        drop(job_rx);

        // ---- Admission + ordered drain ----
        let mut queue: VecDeque<(u64, Receiver<Result<Out, StreamError>>)> =
            VecDeque::with_capacity(inflight);

        let mut drain_oldest = |queue: &mut VecDeque<(u64, Receiver<Result<Out, StreamError>>)>,
                                stats: &mut PipelineStats|
         -> Result<(), StreamError> {
            if let Some((index, rx)) = queue.pop_front() {
                let out = rx.recv().map_err(|_| state.disconnected(index))??;
                sink(index, out)?;
                stats.drained += 1;
                log::trace!("[WRITER] drained task {}", index);
            }
            Ok(())
        };

        let run = (|| -> Result<(), StreamError> {
            let mut inputs = inputs.into_iter();
            let mut index = 0u64;
            loop {
                // Make room before pulling, so at most `inflight` inputs are ever buffered.
                while queue.len() >= inflight {
                    drain_oldest(&mut queue, &mut stats)?;
                }
                let Some(input) = inputs.next() else { break };
                let input = input?;
                let (reply, rx) = bounded(1);
                job_tx
                    .send(Job { index, input, reply })
                    .map_err(|_| StreamError::Pipeline("worker pool disconnected".into()))?;
                queue.push_back((index, rx));
                index += 1;
                stats.submitted += 1;
                stats.max_inflight = stats.max_inflight.max(queue.len());
            }
            while !queue.is_empty() {
                drain_oldest(&mut queue, &mut stats)?;
            }
            Ok(())
        })();

        if let Err(e) = &run {
            state.abort(Some(e));
        }
        // Closing the job channel lets workers finish (or skip) what is queued and exit.
        drop(job_tx);
        run
    });

    match &result {
        Ok(()) => log::debug!(
            "[PIPELINE] done: submitted={} drained={} max_inflight={}",
            stats.submitted,
            stats.drained,
            stats.max_inflight
        ),
        Err(e) => log::debug!("[PIPELINE] aborted after {} drained: {}", stats.drained, e),
    }
    result.map(|()| stats)
}
