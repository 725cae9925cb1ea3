use byteorder::{ByteOrder, LittleEndian};

use crate::schema::types::{NUM_INSTR_DESTINATIONS, NUM_INSTR_SOURCES, RECORD_SIZE};

/// Typed view of one 64-byte trace record.
///
/// Layout (little-endian):
///
/// ```text
/// [ ip (8) ][ is_branch (1) ][ branch_taken (1) ]
/// [ destination_registers (2) ][ source_registers (4) ]
/// [ destination_memory (2 x 8) ][ source_memory (4 x 8) ]
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceRecord {
    pub ip: u64,
    pub is_branch: u8,
    pub branch_taken: u8,
    pub destination_registers: [u8; NUM_INSTR_DESTINATIONS],
    pub source_registers: [u8; NUM_INSTR_SOURCES],
    pub destination_memory: [u64; NUM_INSTR_DESTINATIONS],
    pub source_memory: [u64; NUM_INSTR_SOURCES],
}

impl TraceRecord {
    pub fn decode(buf: &[u8; RECORD_SIZE]) -> Self {
        let mut rec = TraceRecord {
            ip: LittleEndian::read_u64(&buf[0..8]),
            is_branch: buf[8],
            branch_taken: buf[9],
            ..Default::default()
        };
        rec.destination_registers.copy_from_slice(&buf[10..12]);
        rec.source_registers.copy_from_slice(&buf[12..16]);
        LittleEndian::read_u64_into(&buf[16..32], &mut rec.destination_memory);
        LittleEndian::read_u64_into(&buf[32..64], &mut rec.source_memory);
        rec
    }

    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        LittleEndian::write_u64(&mut buf[0..8], self.ip);
        buf[8] = self.is_branch;
        buf[9] = self.branch_taken;
        buf[10..12].copy_from_slice(&self.destination_registers);
        buf[12..16].copy_from_slice(&self.source_registers);
        LittleEndian::write_u64_into(&self.destination_memory, &mut buf[16..32]);
        LittleEndian::write_u64_into(&self.source_memory, &mut buf[32..64]);
        buf
    }

    /// Decode every whole record in `bytes`; a trailing partial record is ignored.
    pub fn decode_all(bytes: &[u8]) -> Vec<TraceRecord> {
        bytes
            .chunks_exact(RECORD_SIZE)
            .map(|c| {
                let mut arr = [0u8; RECORD_SIZE];
                arr.copy_from_slice(c);
                TraceRecord::decode(&arr)
            })
            .collect()
    }

    /// Concatenate records into a raw trace buffer.
    pub fn encode_all(records: &[TraceRecord]) -> Vec<u8> {
        let mut out = Vec::with_capacity(records.len() * RECORD_SIZE);
        for r in records {
            out.extend_from_slice(&r.encode());
        }
        out
    }
}
