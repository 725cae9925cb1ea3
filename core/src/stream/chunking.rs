//! stream/chunking.rs
//! Record-aligned chunking of a raw trace stream.
//!
//! Every chunk except possibly the last is a whole number of records and at
//! most `chunk_size` bytes. The last chunk takes whatever remains.

use std::io::{self, Read};
use std::ops::Range;

use bytes::Bytes;

use crate::constants::MIN_CHUNK_SIZE;
use crate::schema::RECORD_SIZE;
use crate::types::StreamError;

/// One slice of the input handed to a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: u64,
    /// Absolute offset of the first byte in the input.
    pub offset: u64,
    pub bytes: Bytes,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn range(&self) -> Range<u64> {
        self.offset..self.offset + self.bytes.len() as u64
    }
}

pub(crate) fn check_chunk_size(chunk_size: usize) -> Result<(), StreamError> {
    if chunk_size < MIN_CHUNK_SIZE {
        return Err(StreamError::Validation(format!(
            "chunk size {} is below the minimum of {} bytes",
            chunk_size, MIN_CHUNK_SIZE
        )));
    }
    Ok(())
}

/// Size of the next chunk given the bytes still unread.
#[inline]
pub fn next_chunk_len(remaining: u64, chunk_size: usize) -> usize {
    let to_read = remaining.min(chunk_size as u64) as usize;
    if (to_read as u64) < remaining && to_read % RECORD_SIZE != 0 {
        to_read - to_read % RECORD_SIZE
    } else {
        to_read
    }
}

/// Byte ranges the reader will produce for an input of `total` bytes.
pub fn plan_chunks(total: u64, chunk_size: usize) -> Result<Vec<Range<u64>>, StreamError> {
    check_chunk_size(chunk_size)?;
    let mut ranges = Vec::new();
    let mut offset = 0u64;
    while offset < total {
        let len = next_chunk_len(total - offset, chunk_size) as u64;
        ranges.push(offset..offset + len);
        offset += len;
    }
    Ok(ranges)
}

/// Iterator of record-aligned chunks over a source of known length.
pub struct ChunkReader<R: Read> {
    reader: R,
    chunk_size: usize,
    remaining: u64,
    offset: u64,
    index: u64,
    failed: bool,
}

impl<R: Read> ChunkReader<R> {
    pub fn new(reader: R, total_len: u64, chunk_size: usize) -> Result<Self, StreamError> {
        check_chunk_size(chunk_size)?;
        Ok(Self {
            reader,
            chunk_size,
            remaining: total_len,
            offset: 0,
            index: 0,
            failed: false,
        })
    }

    /// Bytes not yet handed out.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    fn read_next(&mut self) -> Result<Chunk, StreamError> {
        let len = next_chunk_len(self.remaining, self.chunk_size);
        let mut buf = vec![0u8; len];
        self.reader.read_exact(&mut buf).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                StreamError::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "input ended early: chunk {} at offset {} needs {} bytes",
                        self.index, self.offset, len
                    ),
                ))
            } else {
                StreamError::Io(e)
            }
        })?;

        let chunk = Chunk { index: self.index, offset: self.offset, bytes: Bytes::from(buf) };
        log::trace!("[READER] chunk {} offset {} len {}", chunk.index, chunk.offset, len);
        self.index += 1;
        self.offset += len as u64;
        self.remaining -= len as u64;
        Ok(chunk)
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = Result<Chunk, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining == 0 {
            return None;
        }
        let res = self.read_next();
        if res.is_err() {
            self.failed = true;
        }
        Some(res)
    }
}
