//! compression/registry.rs
//! Codec registry and factory functions.

use crate::compression::codecs::{deflate, lz4, raw, zstd};
use crate::compression::constants::*;
use crate::compression::types::{CompressionCodec, CompressionError, Compressor, Decompressor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecInfo {
    pub name: &'static str,
    pub default_level: i32,
    /// Whether the level knob changes the output.
    pub uses_level: bool,
}

pub fn resolve(codec: CompressionCodec) -> CodecInfo {
    match codec {
        CompressionCodec::Raw =>
            CodecInfo { name: "raw", default_level: 0, uses_level: false },
        CompressionCodec::Zstd =>
            CodecInfo { name: "zstd", default_level: DEFAULT_LEVEL_ZSTD, uses_level: true },
        CompressionCodec::Lz4 =>
            CodecInfo { name: "lz4", default_level: DEFAULT_LEVEL_LZ4, uses_level: false },
        CompressionCodec::Deflate =>
            CodecInfo { name: "deflate", default_level: DEFAULT_LEVEL_DEFLATE, uses_level: true },
    }
}

/// Reject levels the codec cannot honour.
pub fn validate_level(codec: CompressionCodec, level: i32) -> Result<(), CompressionError> {
    let ok = match codec {
        CompressionCodec::Zstd => (MIN_LEVEL_ZSTD..=MAX_LEVEL_ZSTD).contains(&level),
        CompressionCodec::Deflate => (0..=9).contains(&level),
        CompressionCodec::Raw | CompressionCodec::Lz4 => true,
    };
    if ok {
        Ok(())
    } else {
        Err(CompressionError::InvalidLevel { codec: codec.name(), level })
    }
}

pub fn create_compressor(codec: CompressionCodec, level: i32)
    -> Result<Box<dyn Compressor>, CompressionError>
{
    validate_level(codec, level)?;
    match codec {
        CompressionCodec::Raw => Ok(Box::new(raw::RawCompressor::new())),
        CompressionCodec::Zstd => Ok(Box::new(zstd::ZstdCompressor::new(level))),
        CompressionCodec::Lz4 => Ok(Box::new(lz4::Lz4Compressor::new())),
        CompressionCodec::Deflate => Ok(Box::new(deflate::DeflateCompressor::new(level))),
    }
}

pub fn create_decompressor(codec: CompressionCodec) -> Box<dyn Decompressor> {
    match codec {
        CompressionCodec::Raw => Box::new(raw::RawDecompressor::new()),
        CompressionCodec::Zstd => Box::new(zstd::ZstdDecompressor::new()),
        CompressionCodec::Lz4 => Box::new(lz4::Lz4Decompressor::new()),
        CompressionCodec::Deflate => Box::new(deflate::DeflateDecompressor::new()),
    }
}

/// Decompressor lookup by wire id.
pub fn create_decompressor_by_id(codec_id: u8) -> Result<Box<dyn Decompressor>, CompressionError> {
    Ok(create_decompressor(CompressionCodec::from_id(codec_id)?))
}
