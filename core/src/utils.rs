use std::fmt;

use num_enum::TryFromPrimitive;

use crate::schema::RECORD_SIZE;

/// CRC32 (IEEE) of `data`, used for unit checksums.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

pub fn enum_name_or_hex<T>(raw: T::Primitive) -> String
where
    T: TryFromPrimitive + fmt::Debug,
    T::Primitive: fmt::LowerHex,
{
    match T::try_from_primitive(raw) {
        Ok(variant) => format!("{:?}", variant),
        Err(_) => format!("0x{:x}", raw),
    }
}

/// Detected hardware concurrency, never below one.
pub fn default_thread_count() -> usize {
    num_cpus::get().max(1)
}

/// Round `n` down to a whole number of records.
#[inline]
pub fn align_down_to_record(n: usize) -> usize {
    n - n % RECORD_SIZE
}

/// Human-readable byte count for log lines.
pub fn format_bytes(n: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = n as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", n, UNITS[0])
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}
