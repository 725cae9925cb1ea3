//! constants.rs
//! Stream-level defaults and sanity bounds shared by the pipeline, the
//! framing layer and the CLI.

/// Default chunk size handed to one worker (100 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 100 * 1024 * 1024;

/// Smallest chunk size that can still make progress on a record-aligned stream.
pub const MIN_CHUNK_SIZE: usize = crate::schema::RECORD_SIZE;

/// In-flight tasks allowed per worker before the submitter blocks.
pub const INFLIGHT_PER_WORKER: usize = 2;

/// First read issued by the frame scanner when its lookahead is empty.
pub const SCAN_INITIAL_READ: usize = 64 * 1024;

/// Read size used when a frame header needs more bytes to be parsed.
pub const SCAN_HEADER_READ: usize = 1024 * 1024;

/// Upper bound on a single scanner read while completing a frame body.
pub const SCAN_MAX_READ: usize = 64 * 1024 * 1024;

/// Length prefix width for the length-prefixed framing convention.
pub const LENGTH_PREFIX_LEN: usize = 8;

/// Bytes of training input loaded into memory as the sample corpus (64 MiB).
pub const TRAIN_SAMPLE_LIMIT: usize = 64 * 1024 * 1024;
