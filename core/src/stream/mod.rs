//! stream/mod.rs
//! Chunked, ordered, parallel compression of trace files.
//!
//! Encode: ChunkReader -> run_ordered(EncodeContext) -> write_frame.
//! Decode: FrameScanner -> run_ordered(DecodeContext) -> writer or Verifier.

pub mod parallelism;
pub mod options;
pub mod io;
pub mod chunking;
pub mod framing;
pub mod frame_codec;
pub mod pipeline;
pub mod compress;
pub mod decompress;
pub mod verify;

pub use parallelism::ParallelismProfile;
pub use options::StreamOptions;
pub use chunking::{plan_chunks, Chunk, ChunkReader};
pub use framing::{
    max_frame_len,
    probe_convention,
    write_frame,
    Frame,
    FrameConvention,
    FrameError,
    FrameScanner,
};
pub use frame_codec::{decode_frame, encode_chunk};
pub use pipeline::{run_ordered, PipelineStats};
pub use compress::{compress_file, compress_stream};
pub use decompress::{decompress_file, decompress_stream};
pub use verify::{verify_file, verify_stream, Verifier, VerifyError};
