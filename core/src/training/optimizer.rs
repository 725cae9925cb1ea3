//! training/optimizer.rs

use crate::engine::TransformConfig;
use crate::training::types::{GraphTemplate, TrainError, TrainParams};

/// Search strategy mapping a sample corpus to candidate configurations.
///
/// Implementations return candidates best-first; an empty list is allowed
/// and reported by the driver as `TrainError::NoCandidate`.
pub trait Optimizer: Send + Sync {
    fn name(&self) -> &'static str;

    fn train(
        &self,
        samples: &[&[u8]],
        template: &GraphTemplate,
        params: &TrainParams,
    ) -> Result<Vec<TransformConfig>, TrainError>;
}
