//! types.rs
//! Unified error type for the stream layer.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::{
    compression::CompressionError,
    dispatch::DispatchError,
    engine::{ConfigError, EngineError},
    stream::{framing::FrameError, verify::VerifyError},
    training::TrainError,
};

/// Unified stream error covering I/O, framing, engine, codec, dispatch,
/// verification, training and option validation.
/// - `From<T>` impls enable `?` across layers.
/// - Engine and codec diagnostics are carried verbatim.
#[derive(Debug, Error)]
pub enum StreamError {
    /// I/O failure on a named file.
    #[error("failed to {op} {}: {source}", .path.display())]
    File {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("compression error: {0}")]
    Compression(#[from] CompressionError),

    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("verification failed: {0}")]
    Verify(#[from] VerifyError),

    #[error("training failed: {0}")]
    Train(#[from] TrainError),

    /// A worker or channel went away before delivering its result.
    #[error("pipeline error: {0}")]
    Pipeline(String),

    #[error("validation error: {0}")]
    Validation(String),
}

impl StreamError {
    pub fn file(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        StreamError::File { op, path: path.into(), source }
    }
}
