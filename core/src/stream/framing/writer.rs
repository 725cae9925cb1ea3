use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::stream::framing::types::FrameConvention;

/// Write one unit using `convention`; returns bytes written.
pub fn write_frame<W: Write>(
    writer: &mut W,
    convention: FrameConvention,
    unit: &[u8],
) -> std::io::Result<usize> {
    match convention {
        FrameConvention::LengthPrefixed => {
            writer.write_u64::<LittleEndian>(unit.len() as u64)?;
            writer.write_all(unit)?;
            Ok(convention.prefix_len() + unit.len())
        }
        FrameConvention::SelfDescribing => {
            writer.write_all(unit)?;
            Ok(unit.len())
        }
    }
}
