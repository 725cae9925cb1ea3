//! stream/frame_codec.rs
//! One chunk in, one unit out (and back).

use crate::engine::{compress_bound, DecodeContext, EncodeContext};
use crate::types::StreamError;

/// Compress `chunk` into a freshly allocated unit.
///
/// The buffer is sized with `compress_bound` and truncated to the length the
/// engine reports.
pub fn encode_chunk(ctx: &mut EncodeContext, chunk: &[u8]) -> Result<Vec<u8>, StreamError> {
    let mut dst = vec![0u8; compress_bound(chunk.len())];
    let written = ctx.compress(chunk, &mut dst)?;
    dst.truncate(written);
    Ok(dst)
}

/// Decode one unit back into its raw chunk.
pub fn decode_frame(ctx: &mut DecodeContext, unit: &[u8]) -> Result<Vec<u8>, StreamError> {
    Ok(ctx.decompress(unit)?)
}
