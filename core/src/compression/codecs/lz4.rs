//! codecs/lz4.rs
//! LZ4 block compressor/decompressor (deterministic, no level knob).
use lz4_flex::block::{compress, decompress};

use crate::compression::types::{
    check_decoded_len, CompressionCodec, CompressionError, Compressor, Decompressor,
};

/// LZ4 compressor using the lz4_flex block API.
/// Each section is compressed independently; the size is carried by the section header.
#[derive(Debug, Default)]
pub struct Lz4Compressor;

#[derive(Debug, Default)]
pub struct Lz4Decompressor;

impl Lz4Compressor {
    pub fn new() -> Self {
        Self
    }
}

impl Compressor for Lz4Compressor {
    fn codec(&self) -> CompressionCodec {
        CompressionCodec::Lz4
    }

    fn compress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
        out.extend_from_slice(&compress(input));
        Ok(())
    }
}

impl Lz4Decompressor {
    pub fn new() -> Self {
        Self
    }
}

impl Decompressor for Lz4Decompressor {
    fn codec(&self) -> CompressionCodec {
        CompressionCodec::Lz4
    }

    fn decompress_chunk(
        &mut self,
        input: &[u8],
        raw_len: usize,
        out: &mut Vec<u8>,
    ) -> Result<(), CompressionError> {
        let decompressed = decompress(input, raw_len)
            .map_err(|e| CompressionError::CodecProcessFailed { codec: "lz4", msg: e.to_string() })?;
        check_decoded_len("lz4", decompressed.len(), raw_len)?;
        out.extend_from_slice(&decompressed);
        Ok(())
    }
}
