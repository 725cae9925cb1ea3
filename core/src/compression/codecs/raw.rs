//! codecs/raw.rs
//! Pass-through codec.

use crate::compression::types::{
    check_decoded_len, CompressionCodec, CompressionError, Compressor, Decompressor,
};

#[derive(Debug, Default)]
pub struct RawCompressor;

#[derive(Debug, Default)]
pub struct RawDecompressor;

impl RawCompressor {
    pub fn new() -> Self { Self }
}

impl RawDecompressor {
    pub fn new() -> Self { Self }
}

impl Compressor for RawCompressor {
    fn codec(&self) -> CompressionCodec {
        CompressionCodec::Raw
    }

    fn compress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
        out.extend_from_slice(input);
        Ok(())
    }
}

impl Decompressor for RawDecompressor {
    fn codec(&self) -> CompressionCodec {
        CompressionCodec::Raw
    }

    fn decompress_chunk(
        &mut self,
        input: &[u8],
        raw_len: usize,
        out: &mut Vec<u8>,
    ) -> Result<(), CompressionError> {
        check_decoded_len("raw", input.len(), raw_len)?;
        out.extend_from_slice(input);
        Ok(())
    }
}
