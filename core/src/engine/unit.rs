//! engine/unit.rs
//! Self-describing unit wire format.
//!
//! ```text
//! [ magic "FPK1" (4) ][ version (1) ][ flags (1) ][ reserved (2) ]
//! [ payload_len u64 ][ raw_len u64 ][ record_count u64 ][ crc32 u32 ]
//! [ section ]*
//!
//! section:
//! [ kind (1) ][ members (1) ][ codec (1) ][ filter (1) ][ width (1) ][ reserved (3) ]
//! [ raw_len u64 ][ comp_len u64 ][ data (comp_len) ]
//! ```
//!
//! All integers are little-endian. `crc32` covers the raw chunk.

use byteorder::{ByteOrder, LittleEndian};
use num_enum::TryFromPrimitive;

use crate::engine::types::EngineError;
use crate::schema::{NUM_FIELDS, RECORD_SIZE};

pub const UNIT_MAGIC: [u8; 4] = *b"FPK1";
pub const UNIT_VERSION: u8 = 1;
pub const SUPPORTED_UNIT_VERSIONS: &[u8] = &[UNIT_VERSION];

/// Tags, sizes, one per field, tail.
pub const MAX_SECTIONS: usize = NUM_FIELDS + 3;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UnitFlags: u8 {
        /// Chunk ends with a partial record stored in a `Tail` section.
        const HAS_TAIL = 0b0000_0001;
        /// Several fields share one coded `Cluster` section.
        const CLUSTERED = 0b0000_0010;
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
pub enum SectionKind {
    Tags    = 0,
    Sizes   = 1,
    Field   = 2,
    Cluster = 3,
    Tail    = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitHeader {
    pub version: u8,
    pub flags: UnitFlags,
    pub payload_len: u64,
    pub raw_len: u64,
    pub record_count: u64,
    pub crc32: u32,
}

impl UnitHeader {
    pub const LEN: usize = 4 // magic
        + 1                  // version
        + 1                  // flags
        + 2                  // reserved
        + 8                  // payload_len
        + 8                  // raw_len
        + 8                  // record_count
        + 4;                 // crc32

    pub fn write_to(&self, out: &mut Vec<u8>) {
        let mut buf = [0u8; Self::LEN];
        buf[0..4].copy_from_slice(&UNIT_MAGIC);
        buf[4] = self.version;
        buf[5] = self.flags.bits();
        LittleEndian::write_u64(&mut buf[8..16], self.payload_len);
        LittleEndian::write_u64(&mut buf[16..24], self.raw_len);
        LittleEndian::write_u64(&mut buf[24..32], self.record_count);
        LittleEndian::write_u32(&mut buf[32..36], self.crc32);
        out.extend_from_slice(&buf);
    }

    pub fn parse(buf: &[u8]) -> Result<Self, EngineError> {
        if buf.len() < Self::LEN {
            return Err(EngineError::Truncated { need: Self::LEN, have: buf.len() });
        }
        check_magic_and_version(buf)?;
        let flags = UnitFlags::from_bits(buf[5])
            .ok_or_else(|| EngineError::Malformed(format!("unknown unit flags 0x{:02x}", buf[5])))?;
        Ok(Self {
            version: buf[4],
            flags,
            payload_len: LittleEndian::read_u64(&buf[8..16]),
            raw_len: LittleEndian::read_u64(&buf[16..24]),
            record_count: LittleEndian::read_u64(&buf[24..32]),
            crc32: LittleEndian::read_u32(&buf[32..36]),
        })
    }

    /// Total unit length (header + payload).
    pub fn unit_len(&self) -> Result<usize, EngineError> {
        usize::try_from(self.payload_len)
            .ok()
            .and_then(|p| p.checked_add(Self::LEN))
            .ok_or_else(|| EngineError::Malformed(format!("payload length {} overflows", self.payload_len)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeader {
    pub kind: SectionKind,
    /// Bitmask of member field tags (`FieldTag::bit`).
    pub members: u8,
    pub codec: u8,
    pub filter: u8,
    pub width: u8,
    pub raw_len: u64,
    pub comp_len: u64,
}

impl SectionHeader {
    pub const LEN: usize = 1 // kind
        + 1                  // members
        + 1                  // codec
        + 1                  // filter
        + 1                  // width
        + 3                  // reserved
        + 8                  // raw_len
        + 8;                 // comp_len

    pub fn write_to(&self, out: &mut Vec<u8>) {
        let mut buf = [0u8; Self::LEN];
        buf[0] = self.kind as u8;
        buf[1] = self.members;
        buf[2] = self.codec;
        buf[3] = self.filter;
        buf[4] = self.width;
        LittleEndian::write_u64(&mut buf[8..16], self.raw_len);
        LittleEndian::write_u64(&mut buf[16..24], self.comp_len);
        out.extend_from_slice(&buf);
    }

    pub fn parse(buf: &[u8]) -> Result<Self, EngineError> {
        if buf.len() < Self::LEN {
            return Err(EngineError::Truncated { need: Self::LEN, have: buf.len() });
        }
        let kind = SectionKind::try_from(buf[0]).map_err(|_| EngineError::UnknownSection(buf[0]))?;
        Ok(Self {
            kind,
            members: buf[1],
            codec: buf[2],
            filter: buf[3],
            width: buf[4],
            raw_len: LittleEndian::read_u64(&buf[8..16]),
            comp_len: LittleEndian::read_u64(&buf[16..24]),
        })
    }
}

fn check_magic_and_version(buf: &[u8]) -> Result<(), EngineError> {
    let mut found = [0u8; 4];
    found.copy_from_slice(&buf[0..4]);
    if found != UNIT_MAGIC {
        return Err(EngineError::BadMagic { found });
    }
    if !SUPPORTED_UNIT_VERSIONS.contains(&buf[4]) {
        return Err(EngineError::UnsupportedVersion(buf[4]));
    }
    Ok(())
}

/// Worst-case unit size for a chunk of `raw_len` bytes.
///
/// Sections never grow past their raw form, so the bound is the raw chunk,
/// both side streams and every header.
pub fn compress_bound(raw_len: usize) -> usize {
    let records = raw_len / RECORD_SIZE;
    let side = records.saturating_mul(NUM_FIELDS * (1 + 4));
    (UnitHeader::LEN + MAX_SECTIONS * SectionHeader::LEN)
        .saturating_add(raw_len)
        .saturating_add(side)
}

/// Length of the unit starting at `buf[0]`.
///
/// `Ok(None)` means the header is not fully buffered yet.
pub fn compressed_size(buf: &[u8]) -> Result<Option<usize>, EngineError> {
    if buf.len() < UnitHeader::LEN {
        return Ok(None);
    }
    let header = UnitHeader::parse(buf)?;
    header.unit_len().map(Some)
}

/// True when `buf` starts with the unit magic followed by a supported version.
pub fn probe_unit(buf: &[u8]) -> bool {
    buf.len() > UNIT_MAGIC.len()
        && buf[..UNIT_MAGIC.len()] == UNIT_MAGIC
        && SUPPORTED_UNIT_VERSIONS.contains(&buf[UNIT_MAGIC.len()])
}
