//! compression/codecs/mod.rs
//! One-shot block codecs. Each call codes a whole section independently,
//! so output never depends on previously coded data.

pub mod raw;
pub mod deflate;
pub mod lz4;
pub mod zstd;

pub use self::raw::*;
pub use self::deflate::*;
pub use self::lz4::*;
pub use self::zstd::*;
