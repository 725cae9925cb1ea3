use crate::constants::{DEFAULT_CHUNK_SIZE, MIN_CHUNK_SIZE};
use crate::stream::framing::FrameConvention;
use crate::stream::parallelism::ParallelismProfile;
use crate::types::StreamError;

/// Options shared by compress, decompress and verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOptions {
    /// Upper bound on raw bytes per chunk.
    pub chunk_size: usize,
    pub profile: ParallelismProfile,
    /// Convention used when writing; readers probe instead.
    pub convention: FrameConvention,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            profile: ParallelismProfile::default(),
            convention: FrameConvention::SelfDescribing,
        }
    }
}

impl StreamOptions {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.profile = ParallelismProfile::new(threads);
        self
    }

    pub fn with_convention(mut self, convention: FrameConvention) -> Self {
        self.convention = convention;
        self
    }

    pub fn validate(&self) -> Result<(), StreamError> {
        if self.chunk_size < MIN_CHUNK_SIZE {
            return Err(StreamError::Validation(format!(
                "chunk size {} is below the minimum of {} bytes",
                self.chunk_size, MIN_CHUNK_SIZE
            )));
        }
        if self.profile.workers == 0 {
            return Err(StreamError::Validation("thread count must be at least 1".into()));
        }
        if self.profile.inflight < self.profile.workers {
            return Err(StreamError::Validation(format!(
                "in-flight limit {} is below worker count {}",
                self.profile.inflight, self.profile.workers
            )));
        }
        Ok(())
    }
}
