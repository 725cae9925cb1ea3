use std::path::PathBuf;

use thiserror::Error;

use crate::compression::CompressionError;
use crate::dispatch::DispatchError;

/// Problems loading, decoding or validating a transform configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {} does not exist", .path.display())]
    Missing { path: PathBuf },

    #[error("config file {} is empty", .path.display())]
    Empty { path: PathBuf },

    #[error("bad config magic {}", hex::encode(.found))]
    BadMagic { found: [u8; 4] },

    #[error("unsupported config format version {found}")]
    UnsupportedVersion { found: u8 },

    #[error("config targets schema version {found}, this build supports {expected}")]
    SchemaMismatch { found: u8, expected: u8 },

    #[error("config could not be decoded: {0}")]
    Decode(String),

    #[error("config could not be encoded: {0}")]
    Encode(String),

    #[error("unknown transform '{0}'")]
    UnknownTransform(String),

    #[error("invalid field strategy: {0}")]
    InvalidStrategy(String),

    #[error("invalid codec settings: {0}")]
    Codec(#[from] CompressionError),
}

/// Content errors raised while encoding or decoding a unit.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unit truncated: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },

    #[error("bad unit magic {}", hex::encode(.found))]
    BadMagic { found: [u8; 4] },

    #[error("unsupported unit version {0}")]
    UnsupportedVersion(u8),

    #[error("unknown section kind {0}")]
    UnknownSection(u8),

    #[error("unit length mismatch: header declares {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("decoded {actual} bytes, unit declares {expected}")]
    RawLengthMismatch { expected: u64, actual: u64 },

    #[error("checksum mismatch: expected {expected:08x}, actual {actual:08x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("unit raw length {raw_len} exceeds limit {max}")]
    TooLarge { raw_len: u64, max: u64 },

    #[error("destination buffer too small: need {need}, have {have}")]
    DstTooSmall { need: usize, have: usize },

    #[error("malformed unit: {0}")]
    Malformed(String),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Codec(#[from] CompressionError),
}
