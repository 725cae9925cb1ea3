//! Deflate (zlib wrapper) via flate2, one zlib stream per section.

use std::io::{Read, Write};

use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};

use crate::compression::types::{
    check_decoded_len, CompressionCodec, CompressionError, Compressor, Decompressor,
};

pub struct DeflateCompressor {
    level: Compression,
}

impl DeflateCompressor {
    pub fn new(level: i32) -> Self {
        let level = match level {
            0..=9 => Compression::new(level as u32),
            _ => Compression::default(),
        };
        Self { level }
    }
}

impl Compressor for DeflateCompressor {
    fn codec(&self) -> CompressionCodec {
        CompressionCodec::Deflate
    }

    fn compress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let mut enc = ZlibEncoder::new(Vec::with_capacity(input.len() / 2), self.level);
        enc.write_all(input)
            .map_err(|e| CompressionError::CodecProcessFailed { codec: "deflate", msg: e.to_string() })?;
        let compressed = enc.finish()
            .map_err(|e| CompressionError::CodecProcessFailed { codec: "deflate", msg: e.to_string() })?;
        out.extend_from_slice(&compressed);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct DeflateDecompressor;

impl DeflateDecompressor {
    pub fn new() -> Self {
        Self
    }
}

impl Decompressor for DeflateDecompressor {
    fn codec(&self) -> CompressionCodec {
        CompressionCodec::Deflate
    }

    fn decompress_chunk(
        &mut self,
        input: &[u8],
        raw_len: usize,
        out: &mut Vec<u8>,
    ) -> Result<(), CompressionError> {
        // Bound the read so a corrupt stream cannot expand past the declared size.
        let mut dec = ZlibDecoder::new(input).take(raw_len as u64 + 1);
        let mut decompressed = Vec::with_capacity(raw_len);
        dec.read_to_end(&mut decompressed)
            .map_err(|e| CompressionError::CodecProcessFailed { codec: "deflate", msg: e.to_string() })?;
        check_decoded_len("deflate", decompressed.len(), raw_len)?;
        out.extend_from_slice(&decompressed);
        Ok(())
    }
}
