/// Stable codec IDs (u8) for section headers and the config file.
pub mod codec_ids {
    pub const RAW: u8     = 0x00;
    pub const ZSTD: u8    = 0x01;
    pub const LZ4: u8     = 0x02;
    pub const DEFLATE: u8 = 0x03;
}

/// Stable element filter IDs (u8).
pub mod filter_ids {
    pub const NONE: u8    = 0x00;
    pub const DELTA: u8   = 0x01;
    pub const SHUFFLE: u8 = 0x02;
}

/// Default compression levels (balanced).
pub const DEFAULT_LEVEL_ZSTD: i32 = 3;
pub const DEFAULT_LEVEL_LZ4: i32 = 0; // level is ignored by lz4 block mode
pub const DEFAULT_LEVEL_DEFLATE: i32 = 6;

/// Highest level accepted for zstd; lower bound is the negative "fast" range.
pub const MAX_LEVEL_ZSTD: i32 = 22;
pub const MIN_LEVEL_ZSTD: i32 = -7;
