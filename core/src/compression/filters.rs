//! compression/filters.rs
//! Reversible element filters applied to a field stream before coding.
//!
//! Streams are viewed as little-endian unsigned elements of a fixed width
//! (1, 2, 4 or 8 bytes). Filters never change the byte length.

use byteorder::{ByteOrder, LittleEndian};
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::compression::constants::filter_ids;
use crate::compression::types::CompressionError;

#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
pub enum ElementFilter {
    #[default]
    None    = filter_ids::NONE,
    /// Wrapping difference to the previous element.
    Delta   = filter_ids::DELTA,
    /// Byte-plane transpose: all first bytes, then all second bytes, ...
    Shuffle = filter_ids::SHUFFLE,
}

impl ElementFilter {
    pub const ALL: [ElementFilter; 3] = [ElementFilter::None, ElementFilter::Delta, ElementFilter::Shuffle];

    pub fn from_id(raw: u8) -> Result<Self, CompressionError> {
        Self::try_from(raw).map_err(|_| CompressionError::UnsupportedFilter { filter_id: raw })
    }

    pub fn name(self) -> &'static str {
        match self {
            ElementFilter::None => "none",
            ElementFilter::Delta => "delta",
            ElementFilter::Shuffle => "shuffle",
        }
    }

    /// Whether the filter can change anything for elements of `width` bytes.
    pub fn is_effective(self, width: usize) -> bool {
        match self {
            ElementFilter::None => false,
            ElementFilter::Delta => true,
            ElementFilter::Shuffle => width > 1,
        }
    }

    pub fn apply(self, input: &[u8], width: usize) -> Result<Vec<u8>, CompressionError> {
        check_alignment(input, width)?;
        Ok(match self {
            ElementFilter::None => input.to_vec(),
            ElementFilter::Delta => delta_encode(input, width),
            ElementFilter::Shuffle => shuffle(input, width),
        })
    }

    pub fn invert(self, input: &[u8], width: usize) -> Result<Vec<u8>, CompressionError> {
        check_alignment(input, width)?;
        Ok(match self {
            ElementFilter::None => input.to_vec(),
            ElementFilter::Delta => delta_decode(input, width),
            ElementFilter::Shuffle => unshuffle(input, width),
        })
    }
}

fn check_alignment(input: &[u8], width: usize) -> Result<(), CompressionError> {
    if width == 0 || width > 8 || input.len() % width != 0 {
        return Err(CompressionError::FilterAlignment { len: input.len(), width });
    }
    Ok(())
}

#[inline]
fn mask(width: usize) -> u64 {
    if width >= 8 { u64::MAX } else { (1u64 << (width * 8)) - 1 }
}

// ===== Delta =====

fn delta_encode(input: &[u8], width: usize) -> Vec<u8> {
    let m = mask(width);
    let mut out = vec![0u8; input.len()];
    let mut prev = 0u64;
    for (src, dst) in input.chunks_exact(width).zip(out.chunks_exact_mut(width)) {
        let cur = LittleEndian::read_uint(src, width);
        LittleEndian::write_uint(dst, cur.wrapping_sub(prev) & m, width);
        prev = cur;
    }
    out
}

fn delta_decode(input: &[u8], width: usize) -> Vec<u8> {
    let m = mask(width);
    let mut out = vec![0u8; input.len()];
    let mut acc = 0u64;
    for (src, dst) in input.chunks_exact(width).zip(out.chunks_exact_mut(width)) {
        acc = acc.wrapping_add(LittleEndian::read_uint(src, width)) & m;
        LittleEndian::write_uint(dst, acc, width);
    }
    out
}

// ===== Byte shuffle =====

fn shuffle(input: &[u8], width: usize) -> Vec<u8> {
    if width <= 1 {
        return input.to_vec();
    }
    let n = input.len() / width;
    let mut out = vec![0u8; input.len()];
    for (j, elem) in input.chunks_exact(width).enumerate() {
        for (i, &byte) in elem.iter().enumerate() {
            out[i * n + j] = byte;
        }
    }
    out
}

fn unshuffle(input: &[u8], width: usize) -> Vec<u8> {
    if width <= 1 {
        return input.to_vec();
    }
    let n = input.len() / width;
    let mut out = vec![0u8; input.len()];
    for (j, elem) in out.chunks_exact_mut(width).enumerate() {
        for (i, byte) in elem.iter_mut().enumerate() {
            *byte = input[i * n + j];
        }
    }
    out
}
