//! engine/context.rs
//! Per-worker encode/decode state.
//!
//! Each worker owns one context. Contexts share the compiled configuration
//! read-only and keep their own compressors and scratch buffers.

use std::sync::Arc;

use crate::compression::{
    create_compressor, create_decompressor_by_id, CompressionCodec, Compressor, ElementFilter,
};
use crate::constants::DEFAULT_CHUNK_SIZE;
use crate::dispatch::{DispatchOutput, FieldStream};
use crate::engine::compiled::CompiledConfig;
use crate::engine::config::CodecSpec;
use crate::engine::types::EngineError;
use crate::engine::unit::{
    compress_bound, SectionHeader, SectionKind, UnitFlags, UnitHeader, UNIT_VERSION,
};
use crate::schema::{field_spec, FieldTag, NUM_FIELDS, RECORD_SIZE};
use crate::utils::{align_down_to_record, compute_checksum};

// ===== Encode =====

pub struct EncodeContext {
    config: Arc<CompiledConfig>,
    aux: Box<dyn Compressor>,
    /// One compressor per planned section, same order as `CompiledConfig::sections`.
    sections: Vec<Box<dyn Compressor>>,
    payload: Vec<u8>,
    coded: Vec<u8>,
}

impl EncodeContext {
    pub fn new(config: Arc<CompiledConfig>) -> Result<Self, EngineError> {
        let aux_spec = config.aux_codec();
        let aux = create_compressor(aux_spec.codec, aux_spec.level)?;
        let sections = config
            .sections()
            .iter()
            .map(|plan| create_compressor(plan.codec.codec, plan.codec.level))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { config, aux, sections, payload: Vec::new(), coded: Vec::new() })
    }

    pub fn config(&self) -> &Arc<CompiledConfig> {
        &self.config
    }

    /// Encode `src` as one unit into `dst`; returns the unit length.
    ///
    /// `dst` must hold at least `compress_bound(src.len())` bytes.
    pub fn compress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize, EngineError> {
        let aligned = align_down_to_record(src.len());
        let (body, tail) = src.split_at(aligned);
        let mut flags = UnitFlags::empty();

        self.payload.clear();

        if !body.is_empty() {
            let split = self.config.transform().split(body)?;
            let aux_spec = self.config.aux_codec();

            write_section(
                &mut self.payload,
                &mut self.coded,
                self.aux.as_mut(),
                SectionKind::Tags,
                0,
                aux_spec,
                1,
                &split.tags,
            )?;
            write_section(
                &mut self.payload,
                &mut self.coded,
                self.aux.as_mut(),
                SectionKind::Sizes,
                0,
                aux_spec,
                4,
                &split.sizes_le_bytes(),
            )?;

            let config = Arc::clone(&self.config);
            for (plan, compressor) in config.sections().iter().zip(self.sections.iter_mut()) {
                let kind = if plan.is_cluster() {
                    flags |= UnitFlags::CLUSTERED;
                    SectionKind::Cluster
                } else {
                    SectionKind::Field
                };
                let joined;
                let raw: &[u8] = if plan.is_cluster() {
                    joined = plan
                        .members
                        .iter()
                        .flat_map(|t| split.field(*t).bytes.iter().copied())
                        .collect::<Vec<u8>>();
                    &joined
                } else {
                    &split.field(plan.members[0]).bytes
                };
                write_section(
                    &mut self.payload,
                    &mut self.coded,
                    compressor.as_mut(),
                    kind,
                    plan.member_mask(),
                    plan.codec,
                    plan.elt_width,
                    raw,
                )?;
            }
        }

        if !tail.is_empty() {
            flags |= UnitFlags::HAS_TAIL;
            SectionHeader {
                kind: SectionKind::Tail,
                members: 0,
                codec: CompressionCodec::Raw as u8,
                filter: ElementFilter::None as u8,
                width: 1,
                raw_len: tail.len() as u64,
                comp_len: tail.len() as u64,
            }
            .write_to(&mut self.payload);
            self.payload.extend_from_slice(tail);
        }

        let header = UnitHeader {
            version: UNIT_VERSION,
            flags,
            payload_len: self.payload.len() as u64,
            raw_len: src.len() as u64,
            record_count: (aligned / RECORD_SIZE) as u64,
            crc32: compute_checksum(src),
        };

        let need = UnitHeader::LEN + self.payload.len();
        if dst.len() < need {
            return Err(EngineError::DstTooSmall { need, have: dst.len() });
        }
        let mut head = Vec::with_capacity(UnitHeader::LEN);
        header.write_to(&mut head);
        dst[..UnitHeader::LEN].copy_from_slice(&head);
        dst[UnitHeader::LEN..need].copy_from_slice(&self.payload);
        Ok(need)
    }

    /// Convenience wrapper allocating a bound-sized buffer.
    pub fn compress_to_vec(&mut self, src: &[u8]) -> Result<Vec<u8>, EngineError> {
        let mut dst = vec![0u8; compress_bound(src.len())];
        let n = self.compress(src, &mut dst)?;
        dst.truncate(n);
        Ok(dst)
    }
}

/// Filter, code and append one section; stored raw when coding does not shrink it.
#[allow(clippy::too_many_arguments)]
fn write_section(
    payload: &mut Vec<u8>,
    coded: &mut Vec<u8>,
    compressor: &mut dyn Compressor,
    kind: SectionKind,
    members: u8,
    spec: CodecSpec,
    width: usize,
    raw: &[u8],
) -> Result<(), EngineError> {
    let filter = if spec.filter.is_effective(width) { spec.filter } else { ElementFilter::None };
    let filtered;
    let input: &[u8] = if filter == ElementFilter::None {
        raw
    } else {
        filtered = filter.apply(raw, width)?;
        &filtered
    };

    coded.clear();
    let stored_raw = if spec.codec == CompressionCodec::Raw {
        true
    } else {
        compressor.compress_chunk(input, coded)?;
        coded.len() >= raw.len()
    };

    let (codec, filter, data): (CompressionCodec, ElementFilter, &[u8]) = if stored_raw {
        (CompressionCodec::Raw, ElementFilter::None, raw)
    } else {
        (spec.codec, filter, coded.as_slice())
    };

    SectionHeader {
        kind,
        members,
        codec: codec as u8,
        filter: filter as u8,
        width: width as u8,
        raw_len: raw.len() as u64,
        comp_len: data.len() as u64,
    }
    .write_to(payload);
    payload.extend_from_slice(data);
    Ok(())
}

// ===== Decode =====

pub struct DecodeContext {
    config: Arc<CompiledConfig>,
    max_raw_len: u64,
}

impl DecodeContext {
    /// Context that accepts units of up to `DEFAULT_CHUNK_SIZE` raw bytes.
    pub fn new(config: Arc<CompiledConfig>) -> Self {
        Self { config, max_raw_len: DEFAULT_CHUNK_SIZE as u64 }
    }

    /// Reject units that declare more raw bytes than `max` before allocating.
    pub fn with_max_raw_len(mut self, max: usize) -> Self {
        self.max_raw_len = max as u64;
        self
    }

    pub fn config(&self) -> &Arc<CompiledConfig> {
        &self.config
    }

    /// Decode one complete unit back to the raw chunk.
    pub fn decompress(&mut self, unit: &[u8]) -> Result<Vec<u8>, EngineError> {
        let header = UnitHeader::parse(unit)?;
        let unit_len = header.unit_len()?;
        if unit.len() != unit_len {
            return Err(EngineError::LengthMismatch { expected: unit_len, actual: unit.len() });
        }
        if header.raw_len > self.max_raw_len {
            return Err(EngineError::TooLarge { raw_len: header.raw_len, max: self.max_raw_len });
        }
        if header.record_count.saturating_mul(RECORD_SIZE as u64) > header.raw_len {
            return Err(EngineError::Malformed(format!(
                "{} records do not fit in {} raw bytes",
                header.record_count, header.raw_len
            )));
        }
        let records = header.record_count as usize;
        let section_cap = compress_bound(header.raw_len as usize) as u64;

        let mut tags: Option<Vec<u8>> = None;
        let mut sizes: Option<Vec<u32>> = None;
        let mut fields: [Option<Vec<u8>>; NUM_FIELDS] = Default::default();
        let mut tail: Vec<u8> = Vec::new();

        let mut pos = UnitHeader::LEN;
        while pos < unit.len() {
            let sh = SectionHeader::parse(&unit[pos..])?;
            pos += SectionHeader::LEN;
            if sh.raw_len > section_cap {
                return Err(EngineError::Malformed(format!(
                    "section raw length {} exceeds unit bound {}",
                    sh.raw_len, section_cap
                )));
            }
            let comp_len = sh.comp_len as usize;
            let end = pos
                .checked_add(comp_len)
                .filter(|&e| e <= unit.len())
                .ok_or(EngineError::Truncated { need: pos.saturating_add(comp_len), have: unit.len() })?;
            let data = decode_section(&sh, &unit[pos..end])?;
            pos = end;

            match sh.kind {
                SectionKind::Tags => tags = Some(data),
                SectionKind::Sizes => sizes = Some(DispatchOutput::sizes_from_le_bytes(&data)?),
                SectionKind::Field | SectionKind::Cluster => {
                    split_members(sh.members, records, data, &mut fields)?;
                }
                SectionKind::Tail => tail = data,
            }
        }

        let mut out = if records > 0 {
            let tags = tags.ok_or_else(|| EngineError::Malformed("missing tag section".into()))?;
            let sizes = sizes.ok_or_else(|| EngineError::Malformed("missing size section".into()))?;
            let mut streams = Vec::with_capacity(NUM_FIELDS);
            for tag in FieldTag::ALL {
                let bytes = fields[tag.index()].take().ok_or_else(|| {
                    EngineError::Malformed(format!("missing section for field {}", tag))
                })?;
                streams.push(FieldStream::from_bytes(tag, bytes));
            }
            let fields: [FieldStream; NUM_FIELDS] = streams
                .try_into()
                .map_err(|_| EngineError::Malformed("field stream count".into()))?;
            let split = DispatchOutput { tags, sizes, fields };
            self.config.transform().merge(&split)?
        } else {
            Vec::new()
        };
        out.extend_from_slice(&tail);

        if out.len() as u64 != header.raw_len {
            return Err(EngineError::RawLengthMismatch {
                expected: header.raw_len,
                actual: out.len() as u64,
            });
        }
        let actual = compute_checksum(&out);
        if actual != header.crc32 {
            return Err(EngineError::ChecksumMismatch { expected: header.crc32, actual });
        }
        Ok(out)
    }
}

fn decode_section(sh: &SectionHeader, data: &[u8]) -> Result<Vec<u8>, EngineError> {
    let raw_len = sh.raw_len as usize;
    let mut decoded = Vec::with_capacity(raw_len);
    let mut decompressor = create_decompressor_by_id(sh.codec)?;
    decompressor.decompress_chunk(data, raw_len, &mut decoded)?;
    let filter = ElementFilter::from_id(sh.filter)?;
    if filter == ElementFilter::None {
        Ok(decoded)
    } else {
        Ok(filter.invert(&decoded, sh.width as usize)?)
    }
}

/// Hand each member its share of a field or cluster section, in tag order.
fn split_members(
    mask: u8,
    records: usize,
    data: Vec<u8>,
    fields: &mut [Option<Vec<u8>>; NUM_FIELDS],
) -> Result<(), EngineError> {
    let members: Vec<FieldTag> = FieldTag::ALL.into_iter().filter(|t| mask & t.bit() != 0).collect();
    if members.is_empty() || mask >> NUM_FIELDS != 0 {
        return Err(EngineError::Malformed(format!("bad member mask 0x{:02x}", mask)));
    }
    let expected: usize = members.iter().map(|t| field_spec(*t).size * records).sum();
    if data.len() != expected {
        return Err(EngineError::Malformed(format!(
            "section for mask 0x{:02x} holds {} bytes, expected {}",
            mask,
            data.len(),
            expected
        )));
    }

    if members.len() == 1 {
        let tag = members[0];
        return place(fields, tag, data);
    }
    let mut offset = 0;
    for tag in members {
        let len = field_spec(tag).size * records;
        place(fields, tag, data[offset..offset + len].to_vec())?;
        offset += len;
    }
    Ok(())
}

fn place(
    fields: &mut [Option<Vec<u8>>; NUM_FIELDS],
    tag: FieldTag,
    bytes: Vec<u8>,
) -> Result<(), EngineError> {
    let slot = &mut fields[tag.index()];
    if slot.is_some() {
        return Err(EngineError::Malformed(format!("field {} coded twice", tag)));
    }
    *slot = Some(bytes);
    Ok(())
}
