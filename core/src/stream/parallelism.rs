use serde::{Deserialize, Serialize};

use crate::constants::INFLIGHT_PER_WORKER;
use crate::utils::default_thread_count;

/// Worker pool shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelismProfile {
    pub workers: usize,
    /// Admitted-but-undrained task limit.
    pub inflight: usize,
}

impl ParallelismProfile {
    /// `workers` threads (at least one) with `2 * workers` tasks in flight.
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        Self { workers, inflight: workers * INFLIGHT_PER_WORKER }
    }

    pub fn single_threaded() -> Self {
        Self::new(1)
    }

    /// One worker per detected hardware thread.
    pub fn from_hardware() -> Self {
        Self::new(default_thread_count())
    }
}

impl Default for ParallelismProfile {
    fn default() -> Self {
        Self::from_hardware()
    }
}
