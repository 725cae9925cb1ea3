use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::{compress_bound, probe_unit};

/// How units are delimited inside a compressed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameConvention {
    /// 8-byte little-endian length before each unit.
    LengthPrefixed,
    /// Units are written back to back; each header carries its own length.
    SelfDescribing,
}

impl FrameConvention {
    /// Bytes written before each unit.
    pub fn prefix_len(self) -> usize {
        match self {
            FrameConvention::LengthPrefixed => crate::constants::LENGTH_PREFIX_LEN,
            FrameConvention::SelfDescribing => 0,
        }
    }
}

/// Pick the convention from the first bytes of a stream.
///
/// Unit magic followed by a supported unit version means self-describing;
/// anything else is treated as length-prefixed.
pub fn probe_convention(head: &[u8]) -> FrameConvention {
    if probe_unit(head) {
        FrameConvention::SelfDescribing
    } else {
        FrameConvention::LengthPrefixed
    }
}

/// Largest unit a decoder accepts for the configured chunk size.
pub fn max_frame_len(chunk_size: usize) -> usize {
    compress_bound(chunk_size)
}

/// One located unit (framing prefix stripped).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub index: u64,
    /// Stream offset of the frame start, prefix included.
    pub offset: u64,
    pub bytes: Bytes,
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("truncated frame header at offset {offset}")]
    Truncated { offset: u64 },

    #[error("unexpected end of stream in frame at offset {offset}: need {need} bytes, have {have}")]
    UnexpectedEof { offset: u64, need: usize, have: usize },

    #[error("corrupt frame at offset {offset}: declared length {len} exceeds maximum {max}")]
    Corrupt { offset: u64, len: u64, max: usize },

    #[error("invalid unit magic at offset {offset}")]
    InvalidMagic { offset: u64 },

    #[error("malformed frame header at offset {offset}: {msg}")]
    Malformed { offset: u64, msg: String },

    #[error("read failed at offset {offset}: {source}")]
    Read {
        offset: u64,
        #[source]
        source: std::io::Error,
    },
}
