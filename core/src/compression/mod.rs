//! compression/mod.rs
//! Codec library used by the unit engine.
//!
//! Responsibilities:
//! - Stable codec and filter identifiers for the wire format
//! - Registry resolving codec IDs to compressor/decompressor implementations
//! - Reversible element filters (delta, byte shuffle) over little-endian elements
//!
//! Non-responsibilities:
//! - Section layout and checksums (see `engine::unit`)
//! - Choosing codecs (see `training`)

pub mod constants;
pub mod types;
pub mod registry;
pub mod codecs;
pub mod filters;

pub use constants::*;
pub use types::*;
pub use registry::*;
pub use filters::ElementFilter;
