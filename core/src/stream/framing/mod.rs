//! stream/framing/mod.rs
//! Frame conventions, the incremental frame scanner and the frame writer.
//!
//! Responsibilities:
//! - Probe which framing convention a compressed stream uses
//! - Locate frame boundaries with bounded, incremental reads
//! - Reject truncated or implausible frames with their stream offset
//!
//! Non-responsibilities:
//! - Decoding unit contents (see `engine`)

pub mod types;
pub mod scanner;
pub mod writer;

pub use types::{max_frame_len, probe_convention, Frame, FrameConvention, FrameError};
pub use scanner::FrameScanner;
pub use writer::write_frame;
