use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;

use crate::schema::{FieldTag, NUM_FIELDS, field_spec};

/// One field's bytes across every record of a chunk, in record order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldStream {
    pub tag: FieldTag,
    /// Width of one little-endian element in bytes.
    pub elt_width: usize,
    /// Elements contributed by each record.
    pub elt_count: usize,
    pub bytes: Vec<u8>,
}

impl FieldStream {
    pub fn empty(tag: FieldTag, capacity: usize) -> Self {
        let spec = field_spec(tag);
        Self {
            tag,
            elt_width: spec.elt_width,
            elt_count: spec.elt_count,
            bytes: Vec::with_capacity(capacity),
        }
    }

    pub fn from_bytes(tag: FieldTag, bytes: Vec<u8>) -> Self {
        let mut stream = Self::empty(tag, 0);
        stream.bytes = bytes;
        stream
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of whole records represented by this stream.
    pub fn record_count(&self) -> usize {
        self.bytes.len() / (self.elt_width * self.elt_count)
    }

    /// Little-endian numeric view of the stream, one value per element.
    pub fn elements(&self) -> impl Iterator<Item = u64> + '_ {
        let width = self.elt_width;
        self.bytes.chunks_exact(width).map(move |c| match width {
            1 => c[0] as u64,
            2 => LittleEndian::read_u16(c) as u64,
            4 => LittleEndian::read_u32(c) as u64,
            _ => LittleEndian::read_uint(c, width),
        })
    }
}

/// Result of splitting a record-aligned buffer.
///
/// `tags[i]` names the stream the i-th segment belongs to and `sizes[i]` is
/// its length; `fields` is indexed by tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutput {
    pub tags: Vec<u8>,
    pub sizes: Vec<u32>,
    pub fields: [FieldStream; NUM_FIELDS],
}

impl DispatchOutput {
    pub fn with_capacity(records: usize) -> Self {
        let segments = records * NUM_FIELDS;
        Self {
            tags: Vec::with_capacity(segments),
            sizes: Vec::with_capacity(segments),
            fields: FieldTag::ALL.map(|t| FieldStream::empty(t, records * field_spec(t).size)),
        }
    }

    #[inline]
    pub fn field(&self, tag: FieldTag) -> &FieldStream {
        &self.fields[tag.index()]
    }

    pub fn segment_count(&self) -> usize {
        self.tags.len()
    }

    /// Total bytes held by the field streams (equals the input length).
    pub fn payload_len(&self) -> usize {
        self.fields.iter().map(FieldStream::len).sum()
    }

    /// Side-channel size stream as little-endian `u32` bytes.
    pub fn sizes_le_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.sizes.len() * 4];
        LittleEndian::write_u32_into(&self.sizes, &mut out);
        out
    }

    /// Parse a little-endian `u32` size stream.
    pub fn sizes_from_le_bytes(bytes: &[u8]) -> Result<Vec<u32>, DispatchError> {
        if bytes.len() % 4 != 0 {
            return Err(DispatchError::Malformed(format!(
                "size stream length {} is not a multiple of 4",
                bytes.len()
            )));
        }
        let mut sizes = vec![0u32; bytes.len() / 4];
        LittleEndian::read_u32_into(bytes, &mut sizes);
        Ok(sizes)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("input length {len} is not a multiple of the 64-byte record size")]
    PartialRecord { len: usize },

    #[error("unknown field tag {0}")]
    UnknownTag(u8),

    #[error("side channel mismatch: {tags} tags but {sizes} sizes")]
    SideChannelMismatch { tags: usize, sizes: usize },

    #[error("field stream {tag} overrun: segment needs {need} bytes, {have} left")]
    Overrun { tag: FieldTag, need: usize, have: usize },

    #[error("field stream {tag} has {left} unconsumed bytes")]
    Leftover { tag: FieldTag, left: usize },

    #[error("malformed dispatch data: {0}")]
    Malformed(String),
}
