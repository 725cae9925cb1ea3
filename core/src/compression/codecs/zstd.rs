//! src/compression/codecs/zstd.rs
//!
//! Zstd block compressor/decompressor.
//!
//! Design notes:
//! - Uses the bulk API: every section is a standalone zstd frame.
//! - The expected decoded size comes from the section header, so no
//!   length prefix is written here.

use crate::compression::types::{
    check_decoded_len, CompressionCodec, CompressionError, Compressor, Decompressor,
};

pub struct ZstdCompressor {
    level: i32,
}

impl ZstdCompressor {
    pub fn new(level: i32) -> Self {
        Self { level }
    }
}

impl Compressor for ZstdCompressor {
    fn codec(&self) -> CompressionCodec {
        CompressionCodec::Zstd
    }

    fn compress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let compressed = zstd::bulk::compress(input, self.level)
            .map_err(|e| CompressionError::CodecProcessFailed { codec: "zstd", msg: e.to_string() })?;
        out.extend_from_slice(&compressed);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ZstdDecompressor;

impl ZstdDecompressor {
    pub fn new() -> Self {
        Self
    }
}

impl Decompressor for ZstdDecompressor {
    fn codec(&self) -> CompressionCodec {
        CompressionCodec::Zstd
    }

    fn decompress_chunk(
        &mut self,
        input: &[u8],
        raw_len: usize,
        out: &mut Vec<u8>,
    ) -> Result<(), CompressionError> {
        let decompressed = zstd::bulk::decompress(input, raw_len)
            .map_err(|e| CompressionError::CodecProcessFailed { codec: "zstd", msg: e.to_string() })?;
        check_decoded_len("zstd", decompressed.len(), raw_len)?;
        out.extend_from_slice(&decompressed);
        Ok(())
    }
}
