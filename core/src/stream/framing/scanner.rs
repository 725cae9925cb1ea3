//! stream/framing/scanner.rs
//! Incremental frame scanner over an append-only compressed stream.
//!
//! The scanner keeps a lookahead buffer and a cursor. For each frame it
//! first resolves the frame length from the buffered header, reading more
//! when the header is incomplete, then buffers the whole body with growing
//! read sizes, yields it and compacts the buffer.

use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;

use crate::constants::{LENGTH_PREFIX_LEN, SCAN_HEADER_READ, SCAN_INITIAL_READ, SCAN_MAX_READ};
use crate::engine::{compressed_size, EngineError, UNIT_MAGIC};
use crate::stream::framing::types::{probe_convention, Frame, FrameConvention, FrameError};

/// Bytes needed before the convention probe is meaningful.
const PROBE_LEN: usize = UNIT_MAGIC.len() + 1;

/// Below this many buffered bytes a refill uses the small initial read.
const SMALL_LOOKAHEAD: usize = 64;

pub struct FrameScanner<R: Read> {
    reader: R,
    buf: Vec<u8>,
    cursor: usize,
    /// Stream offset of `buf[0]`.
    base: u64,
    eof: bool,
    done: bool,
    convention: Option<FrameConvention>,
    max_frame_len: usize,
    index: u64,
}

impl<R: Read> FrameScanner<R> {
    /// Scanner that rejects frames longer than `max_frame_len` and probes the
    /// convention from the first bytes.
    pub fn new(reader: R, max_frame_len: usize) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            cursor: 0,
            base: 0,
            eof: false,
            done: false,
            convention: None,
            max_frame_len,
            index: 0,
        }
    }

    /// Scanner with a fixed convention, skipping the probe.
    pub fn with_convention(reader: R, max_frame_len: usize, convention: FrameConvention) -> Self {
        let mut scanner = Self::new(reader, max_frame_len);
        scanner.convention = Some(convention);
        scanner
    }

    /// Convention in use, once probed.
    pub fn convention(&self) -> Option<FrameConvention> {
        self.convention
    }

    /// Stream offset of the next unread frame.
    pub fn stream_offset(&self) -> u64 {
        self.base + self.cursor as u64
    }

    #[inline]
    fn buffered(&self) -> usize {
        self.buf.len() - self.cursor
    }

    /// Append up to `want` bytes to the lookahead; marks EOF on a short read.
    fn fill(&mut self, want: usize) -> Result<(), FrameError> {
        if self.cursor > 0 {
            self.buf.drain(..self.cursor);
            self.base += self.cursor as u64;
            self.cursor = 0;
        }
        let offset = self.stream_offset();
        let got = (&mut self.reader)
            .take(want as u64)
            .read_to_end(&mut self.buf)
            .map_err(|source| FrameError::Read { offset, source })?;
        if got < want {
            self.eof = true;
        }
        log::trace!("[SCANNER] read {} of {} bytes at {}", got, want, offset);
        Ok(())
    }

    fn refill_size(&self) -> usize {
        if self.buffered() < SMALL_LOOKAHEAD {
            SCAN_INITIAL_READ
        } else {
            SCAN_HEADER_READ
        }
    }

    fn probe(&mut self) -> Result<FrameConvention, FrameError> {
        if let Some(c) = self.convention {
            return Ok(c);
        }
        while self.buffered() < PROBE_LEN && !self.eof {
            self.fill(SCAN_INITIAL_READ)?;
        }
        let convention = probe_convention(&self.buf[self.cursor..]);
        log::debug!("[SCANNER] detected {:?} framing", convention);
        self.convention = Some(convention);
        Ok(convention)
    }

    /// `(prefix, unit_len)` of the frame at the cursor, or `None` if the
    /// header is not fully buffered.
    fn frame_extent(&self, convention: FrameConvention) -> Result<Option<(usize, usize)>, FrameError> {
        let offset = self.stream_offset();
        let head = &self.buf[self.cursor..];
        let (prefix, len) = match convention {
            FrameConvention::LengthPrefixed => {
                if head.len() < LENGTH_PREFIX_LEN {
                    return Ok(None);
                }
                (LENGTH_PREFIX_LEN, LittleEndian::read_u64(&head[..LENGTH_PREFIX_LEN]))
            }
            FrameConvention::SelfDescribing => match compressed_size(head) {
                Ok(None) => return Ok(None),
                Ok(Some(n)) => (0, n as u64),
                Err(EngineError::BadMagic { .. }) => return Err(FrameError::InvalidMagic { offset }),
                Err(e) => return Err(FrameError::Malformed { offset, msg: e.to_string() }),
            },
        };
        if len > self.max_frame_len as u64 {
            return Err(FrameError::Corrupt { offset, len, max: self.max_frame_len });
        }
        Ok(Some((prefix, len as usize)))
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, FrameError> {
        let convention = self.probe()?;

        // Header.
        let (prefix, unit_len) = loop {
            if self.buffered() == 0 && self.eof {
                return Ok(None);
            }
            if let Some(extent) = self.frame_extent(convention)? {
                break extent;
            }
            if self.eof {
                return Err(FrameError::Truncated { offset: self.stream_offset() });
            }
            let want = self.refill_size();
            self.fill(want)?;
        };

        // Body.
        let need = prefix + unit_len;
        let mut step = SCAN_HEADER_READ;
        while self.buffered() < need {
            if self.eof {
                return Err(FrameError::UnexpectedEof {
                    offset: self.stream_offset(),
                    need,
                    have: self.buffered(),
                });
            }
            let want = (need - self.buffered()).max(step);
            self.fill(want)?;
            step = (step * 2).min(SCAN_MAX_READ);
        }

        let offset = self.stream_offset();
        let start = self.cursor + prefix;
        let frame = Frame {
            index: self.index,
            offset,
            bytes: Bytes::copy_from_slice(&self.buf[start..start + unit_len]),
        };
        self.cursor += need;
        self.index += 1;
        log::trace!("[SCANNER] frame {} at {} ({} bytes)", frame.index, offset, unit_len);
        Ok(Some(frame))
    }
}

impl<R: Read> Iterator for FrameScanner<R> {
    type Item = Result<Frame, FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
