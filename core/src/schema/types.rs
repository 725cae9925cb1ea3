use std::fmt;
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

/// Bytes per trace record.
pub const RECORD_SIZE: usize = 64;

/// Number of fields in one record.
pub const NUM_FIELDS: usize = 7;

/// Layout revision. Bumped whenever an offset or width changes.
pub const SCHEMA_VERSION: u8 = 1;

pub const NUM_INSTR_DESTINATIONS: usize = 2;
pub const NUM_INSTR_SOURCES: usize = 4;

/// Field identifiers, in record order.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, TryFromPrimitive, Serialize, Deserialize)]
pub enum FieldTag {
    InstructionPointer   = 0,
    IsBranch             = 1,
    BranchTaken          = 2,
    DestinationRegisters = 3,
    SourceRegisters      = 4,
    DestinationMemory    = 5,
    SourceMemory         = 6,
}

impl FieldTag {
    pub const ALL: [FieldTag; NUM_FIELDS] = [
        FieldTag::InstructionPointer,
        FieldTag::IsBranch,
        FieldTag::BranchTaken,
        FieldTag::DestinationRegisters,
        FieldTag::SourceRegisters,
        FieldTag::DestinationMemory,
        FieldTag::SourceMemory,
    ];

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline(always)]
    pub const fn bit(self) -> u8 {
        1u8 << (self as u8)
    }

    pub fn name(self) -> &'static str {
        field_spec(self).name
    }
}

impl fmt::Display for FieldTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Placement of one field inside a record.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub tag: FieldTag,
    pub name: &'static str,
    pub offset: usize,
    pub size: usize,
    /// Width of one little-endian element in bytes.
    pub elt_width: usize,
    /// Elements per record.
    pub elt_count: usize,
}

impl FieldSpec {
    #[inline(always)]
    pub const fn end(&self) -> usize {
        self.offset + self.size
    }
}

/// The record layout, indexed by tag.
pub const RECORD_SCHEMA: [FieldSpec; NUM_FIELDS] = [
    FieldSpec { tag: FieldTag::InstructionPointer,   name: "instruction_pointer",   offset: 0,  size: 8,  elt_width: 8, elt_count: 1 },
    FieldSpec { tag: FieldTag::IsBranch,             name: "is_branch",             offset: 8,  size: 1,  elt_width: 1, elt_count: 1 },
    FieldSpec { tag: FieldTag::BranchTaken,          name: "branch_taken",          offset: 9,  size: 1,  elt_width: 1, elt_count: 1 },
    FieldSpec { tag: FieldTag::DestinationRegisters, name: "destination_registers", offset: 10, size: 2,  elt_width: 1, elt_count: NUM_INSTR_DESTINATIONS },
    FieldSpec { tag: FieldTag::SourceRegisters,      name: "source_registers",      offset: 12, size: 4,  elt_width: 1, elt_count: NUM_INSTR_SOURCES },
    FieldSpec { tag: FieldTag::DestinationMemory,    name: "destination_memory",    offset: 16, size: 16, elt_width: 8, elt_count: NUM_INSTR_DESTINATIONS },
    FieldSpec { tag: FieldTag::SourceMemory,         name: "source_memory",         offset: 32, size: 32, elt_width: 8, elt_count: NUM_INSTR_SOURCES },
];

#[inline(always)]
pub fn field_spec(tag: FieldTag) -> &'static FieldSpec {
    let schema: &'static [FieldSpec; NUM_FIELDS] = &RECORD_SCHEMA;
    &schema[tag.index()]
}

// Layout is checked at compile time: contiguous fields covering exactly 64 bytes.
const _: () = {
    let mut i = 0;
    let mut next = 0;
    while i < NUM_FIELDS {
        let f = &RECORD_SCHEMA[i];
        assert!(f.tag as usize == i);
        assert!(f.offset == next);
        assert!(f.size == f.elt_width * f.elt_count);
        next = f.offset + f.size;
        i += 1;
    }
    assert!(next == RECORD_SIZE);
};
