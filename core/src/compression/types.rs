//! compression/types.rs
//! Codec identifiers, codec errors and the compressor/decompressor traits.
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compression::constants::codec_ids;
use crate::utils::enum_name_or_hex;

/// Codec identifiers as stored in section headers.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
pub enum CompressionCodec {
    Raw     = codec_ids::RAW,
    Zstd    = codec_ids::ZSTD,
    Lz4     = codec_ids::LZ4,
    Deflate = codec_ids::DEFLATE,
}

impl CompressionCodec {
    pub const ALL: [CompressionCodec; 4] = [
        CompressionCodec::Raw,
        CompressionCodec::Zstd,
        CompressionCodec::Lz4,
        CompressionCodec::Deflate,
    ];

    pub fn from_id(raw: u8) -> Result<Self, CompressionError> {
        Self::try_from(raw).map_err(|_| CompressionError::UnsupportedCodec { codec_id: raw })
    }

    pub fn name(self) -> &'static str {
        match self {
            CompressionCodec::Raw => "raw",
            CompressionCodec::Zstd => "zstd",
            CompressionCodec::Lz4 => "lz4",
            CompressionCodec::Deflate => "deflate",
        }
    }
}

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("unsupported compression codec: {}", codec_label(.codec_id))]
    UnsupportedCodec { codec_id: u8 },

    #[error("unsupported element filter: 0x{filter_id:02x}")]
    UnsupportedFilter { filter_id: u8 },

    #[error("codec {codec} rejects level {level}")]
    InvalidLevel { codec: &'static str, level: i32 },

    #[error("codec {codec} process failed: {msg}")]
    CodecProcessFailed { codec: &'static str, msg: String },

    #[error("codec {codec} decoded {have} bytes, expected {expected}")]
    SizeMismatch { codec: &'static str, have: usize, expected: usize },

    #[error("filter input length {len} is not a multiple of element width {width}")]
    FilterAlignment { len: usize, width: usize },
}

fn codec_label(codec_id: &u8) -> String {
    enum_name_or_hex::<CompressionCodec>(*codec_id)
}

impl From<std::io::Error> for CompressionError {
    fn from(e: std::io::Error) -> Self {
        CompressionError::CodecProcessFailed { codec: "io", msg: e.to_string() }
    }
}

// Require Send so trait objects can move into worker threads.
pub trait Compressor: Send {
    fn codec(&self) -> CompressionCodec;

    /// Compress `input` as one independent block, appending to `out`.
    fn compress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError>;
}

pub trait Decompressor: Send {
    fn codec(&self) -> CompressionCodec;

    /// Decompress one block that must expand to exactly `raw_len` bytes.
    fn decompress_chunk(
        &mut self,
        input: &[u8],
        raw_len: usize,
        out: &mut Vec<u8>,
    ) -> Result<(), CompressionError>;
}

/// Shared post-decode length check.
pub(crate) fn check_decoded_len(
    codec: &'static str,
    have: usize,
    expected: usize,
) -> Result<(), CompressionError> {
    if have != expected {
        return Err(CompressionError::SizeMismatch { codec, have, expected });
    }
    Ok(())
}
