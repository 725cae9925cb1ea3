use crate::dispatch::types::{DispatchError, DispatchOutput};
use crate::schema::{FieldTag, NUM_FIELDS};

/// Rebuild the record buffer from field streams and the tag/size side channel.
///
/// Exact inverse of [`dispatch_split`](crate::dispatch::dispatch_split):
/// segments are taken from each field stream's cursor in side-channel order.
pub fn dispatch_merge(input: &DispatchOutput) -> Result<Vec<u8>, DispatchError> {
    if input.tags.len() != input.sizes.len() {
        return Err(DispatchError::SideChannelMismatch {
            tags: input.tags.len(),
            sizes: input.sizes.len(),
        });
    }

    let mut cursors = [0usize; NUM_FIELDS];
    let mut out = Vec::with_capacity(input.payload_len());

    for (&raw_tag, &size) in input.tags.iter().zip(input.sizes.iter()) {
        let tag = FieldTag::try_from(raw_tag).map_err(|_| DispatchError::UnknownTag(raw_tag))?;
        let stream = &input.fields[tag.index()].bytes;
        let start = cursors[tag.index()];
        let need = size as usize;
        let have = stream.len() - start;
        if need > have {
            return Err(DispatchError::Overrun { tag, need, have });
        }
        out.extend_from_slice(&stream[start..start + need]);
        cursors[tag.index()] = start + need;
    }

    for tag in FieldTag::ALL {
        let left = input.fields[tag.index()].len() - cursors[tag.index()];
        if left != 0 {
            return Err(DispatchError::Leftover { tag, left });
        }
    }

    Ok(out)
}
