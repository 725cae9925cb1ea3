use crate::dispatch::types::{DispatchError, DispatchOutput};
use crate::schema::{RECORD_SCHEMA, RECORD_SIZE};

/// Split a record-aligned buffer into one stream per field.
///
/// Every record contributes seven segments, in tag order, to the side
/// channel. A trailing partial record is rejected.
pub fn dispatch_split(bytes: &[u8]) -> Result<DispatchOutput, DispatchError> {
    if bytes.len() % RECORD_SIZE != 0 {
        return Err(DispatchError::PartialRecord { len: bytes.len() });
    }

    let records = bytes.len() / RECORD_SIZE;
    let mut out = DispatchOutput::with_capacity(records);

    for record in bytes.chunks_exact(RECORD_SIZE) {
        for spec in RECORD_SCHEMA.iter() {
            out.tags.push(spec.tag as u8);
            out.sizes.push(spec.size as u32);
            out.fields[spec.tag.index()]
                .bytes
                .extend_from_slice(&record[spec.offset..spec.end()]);
        }
    }

    Ok(out)
}
