use thiserror::Error;

use crate::compression::{CompressionCodec, CompressionError, ElementFilter};
use crate::dispatch::{DispatchError, RECORD_DISPATCH_NAME};
use crate::engine::{CodecSpec, ConfigError};
use crate::utils::default_thread_count;

/// Knobs exposed by `fieldpack train`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainParams {
    /// Worker threads used to score fields.
    pub threads: usize,
    /// Try equal-width fields as one concatenated stream.
    pub clustering: bool,
    /// Emit one configuration per size/time trade-off instead of only the smallest.
    pub pareto_frontier: bool,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            threads: default_thread_count(),
            clustering: false,
            pareto_frontier: true,
        }
    }
}

/// Parameterized search space handed to an optimizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphTemplate {
    /// Registered transform that produces the field streams.
    pub entry_transform: String,
    /// Codec choices tried on every stream.
    pub candidates: Vec<CodecSpec>,
    pub clustering: bool,
}

impl GraphTemplate {
    /// Record dispatch feeding every built-in codec at a few levels, each
    /// with and without an element filter.
    pub fn baseline(params: &TrainParams) -> Self {
        let codecs = [
            CodecSpec::raw(),
            CodecSpec::new(CompressionCodec::Lz4, 0, ElementFilter::None),
            CodecSpec::new(CompressionCodec::Deflate, 6, ElementFilter::None),
            CodecSpec::zstd(1),
            CodecSpec::zstd(3),
            CodecSpec::zstd(9),
            CodecSpec::zstd(19),
        ];

        let mut candidates = Vec::with_capacity(codecs.len() * ElementFilter::ALL.len());
        for spec in codecs {
            if spec.codec == CompressionCodec::Raw {
                candidates.push(spec);
                continue;
            }
            for filter in ElementFilter::ALL {
                candidates.push(spec.with_filter(filter));
            }
        }

        Self {
            entry_transform: RECORD_DISPATCH_NAME.to_string(),
            candidates,
            clustering: params.clustering,
        }
    }
}

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("optimizer produced no candidate configuration")]
    NoCandidate,

    #[error("training corpus is empty")]
    EmptyCorpus,

    #[error("graph template has no codec candidates")]
    NoCodecCandidates,

    #[error("training worker failed: {0}")]
    Worker(String),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Codec(#[from] CompressionError),
}
