// Unit engine and transform configuration:
// * config blob: magic, version, bincode body, validation
// * unit encode/decode for per-field and clustered strategies
// * tail sections, size bounds, corruption detection

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use fieldpack_core::compression::ElementFilter;
    use fieldpack_core::constants::DEFAULT_CHUNK_SIZE;
    use fieldpack_core::engine::{
        compress_bound, compressed_size, probe_unit, ClusterSpec, CodecSpec, CompiledConfig,
        ConfigError, DecodeContext, EncodeContext, EngineError, FieldStrategy, TransformConfig,
        UnitFlags, UnitHeader, CONFIG_MAGIC, UNIT_MAGIC,
    };
    use fieldpack_core::schema::{FieldTag, TraceRecord, NUM_FIELDS};
    use fieldpack_core::types::StreamError;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use tempfile::tempdir;

    fn trace(records: usize) -> Vec<u8> {
        let mut rng = StdRng::seed_from_u64(11);
        let mut ip = 0x40_0000u64;
        let recs: Vec<TraceRecord> = (0..records)
            .map(|_| {
                ip += rng.gen_range(1..8);
                TraceRecord {
                    ip,
                    is_branch: rng.gen_bool(0.2) as u8,
                    branch_taken: 0,
                    destination_registers: [rng.gen_range(0..16), 0],
                    source_registers: [rng.gen_range(0..16), rng.gen_range(0..16), 0, 0],
                    destination_memory: [0x7fff_0000 + rng.gen_range(0..512u64) * 8, 0],
                    source_memory: [0x7fff_8000 + rng.gen_range(0..512u64) * 8, 0, 0, 0],
                }
            })
            .collect();
        TraceRecord::encode_all(&recs)
    }

    fn clustered_config() -> TransformConfig {
        TransformConfig::new(
            CodecSpec::zstd(3),
            FieldStrategy::Clustered(vec![
                ClusterSpec { tags: vec![FieldTag::InstructionPointer], codec: CodecSpec::zstd(3).with_filter(ElementFilter::Delta) },
                ClusterSpec {
                    tags: vec![
                        FieldTag::SourceRegisters,
                        FieldTag::IsBranch,
                        FieldTag::BranchTaken,
                        FieldTag::DestinationRegisters,
                    ],
                    codec: CodecSpec::zstd(1),
                },
                ClusterSpec {
                    tags: vec![FieldTag::SourceMemory, FieldTag::DestinationMemory],
                    codec: CodecSpec::zstd(3).with_filter(ElementFilter::Shuffle),
                },
            ]),
        )
    }

    fn roundtrip(config: TransformConfig, src: &[u8]) -> Vec<u8> {
        let compiled = CompiledConfig::compile_builtin(config).unwrap();
        let unit = EncodeContext::new(Arc::clone(&compiled)).unwrap().compress_to_vec(src).unwrap();
        assert!(unit.len() <= compress_bound(src.len()));
        assert_eq!(compressed_size(&unit).unwrap(), Some(unit.len()));
        DecodeContext::new(compiled).decompress(&unit).unwrap()
    }

// # ✅ 1. Config blob

    #[test]
    fn config_bytes_roundtrip() {
        for config in [TransformConfig::baseline(), clustered_config()] {
            let bytes = config.to_bytes().unwrap();
            assert_eq!(&bytes[..4], &CONFIG_MAGIC);
            assert_eq!(TransformConfig::from_bytes(&bytes).unwrap(), config);
        }
    }

    #[test]
    fn config_blob_header_is_checked() {
        let good = TransformConfig::baseline().to_bytes().unwrap();

        let mut bad_magic = good.clone();
        bad_magic[0] = b'X';
        assert!(matches!(TransformConfig::from_bytes(&bad_magic), Err(ConfigError::BadMagic { .. })));

        let mut bad_version = good.clone();
        bad_version[4] = 9;
        assert!(matches!(
            TransformConfig::from_bytes(&bad_version),
            Err(ConfigError::UnsupportedVersion { found: 9 })
        ));

        let mut trailing = good.clone();
        trailing.push(0);
        assert!(matches!(TransformConfig::from_bytes(&trailing), Err(ConfigError::Decode(_))));

        assert!(matches!(TransformConfig::from_bytes(&good[..3]), Err(ConfigError::Decode(_))));
    }

    #[test]
    fn config_file_missing_and_empty() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.cfg");
        assert!(matches!(
            TransformConfig::load(&missing),
            Err(StreamError::Config(ConfigError::Missing { .. }))
        ));

        let empty = dir.path().join("empty.cfg");
        fs::write(&empty, b"").unwrap();
        assert!(matches!(
            TransformConfig::load(&empty),
            Err(StreamError::Config(ConfigError::Empty { .. }))
        ));

        let saved = dir.path().join("trained.cfg");
        let written = clustered_config().save(&saved).unwrap();
        assert_eq!(fs::metadata(&saved).unwrap().len(), written as u64);
        let compiled = CompiledConfig::load(&saved).unwrap();
        assert_eq!(compiled.sections().len(), 3);
    }

// # ❌ 2. Validation

    #[test]
    fn clustered_strategy_shape_is_validated() {
        let dup = TransformConfig::new(
            CodecSpec::zstd(3),
            FieldStrategy::Clustered(
                FieldTag::ALL
                    .iter()
                    .map(|&t| ClusterSpec { tags: vec![t], codec: CodecSpec::zstd(3) })
                    .chain(std::iter::once(ClusterSpec { tags: vec![FieldTag::IsBranch], codec: CodecSpec::raw() }))
                    .collect(),
            ),
        );
        assert!(matches!(dup.validate(), Err(ConfigError::InvalidStrategy(_))));

        let mixed = TransformConfig::new(
            CodecSpec::zstd(3),
            FieldStrategy::Clustered(vec![ClusterSpec {
                tags: FieldTag::ALL.to_vec(),
                codec: CodecSpec::zstd(3),
            }]),
        );
        let err = mixed.validate().unwrap_err();
        assert!(err.to_string().contains("mixes element widths"));

        let missing = TransformConfig::new(
            CodecSpec::zstd(3),
            FieldStrategy::Clustered(vec![ClusterSpec {
                tags: vec![FieldTag::SourceMemory, FieldTag::DestinationMemory],
                codec: CodecSpec::zstd(3),
            }]),
        );
        assert!(missing.validate().unwrap_err().to_string().contains("not assigned"));

        let empty = TransformConfig::new(
            CodecSpec::zstd(3),
            FieldStrategy::Clustered(vec![ClusterSpec { tags: vec![], codec: CodecSpec::zstd(3) }]),
        );
        assert!(empty.validate().is_err());
    }

    #[test]
    fn bad_levels_versions_and_transforms_are_rejected() {
        let mut config = TransformConfig::baseline();
        config.aux_codec = CodecSpec::zstd(40);
        assert!(matches!(config.validate(), Err(ConfigError::Codec(_))));

        let mut config = TransformConfig::baseline();
        config.schema_version = 2;
        assert!(matches!(config.validate(), Err(ConfigError::SchemaMismatch { found: 2, expected: 1 })));

        let mut config = TransformConfig::baseline();
        config.entry_transform = "column-dispatch".into();
        assert!(matches!(
            CompiledConfig::compile_builtin(config),
            Err(ConfigError::UnknownTransform(name)) if name == "column-dispatch"
        ));
    }

    #[test]
    fn baseline_describes_every_field() {
        let lines = TransformConfig::baseline().describe();
        assert_eq!(lines.len(), 1 + NUM_FIELDS);
        assert!(lines.iter().any(|l| l.starts_with("instruction_pointer: zstd:3+delta")));
    }

// # ✅ 3. Units

    #[test]
    fn per_field_unit_roundtrips() {
        let src = trace(500);
        assert_eq!(roundtrip(TransformConfig::baseline(), &src), src);
    }

    #[test]
    fn clustered_unit_roundtrips_and_is_flagged() {
        let src = trace(300);
        assert_eq!(roundtrip(clustered_config(), &src), src);

        let compiled = CompiledConfig::compile_builtin(clustered_config()).unwrap();
        let unit = EncodeContext::new(compiled).unwrap().compress_to_vec(&src).unwrap();
        let header = UnitHeader::parse(&unit).unwrap();
        assert!(header.flags.contains(UnitFlags::CLUSTERED));
        assert!(!header.flags.contains(UnitFlags::HAS_TAIL));
        assert_eq!(header.record_count, 300);
    }

    #[test]
    fn partial_record_rides_in_tail_section() {
        let mut src = trace(3);
        src.extend_from_slice(&[0xAB; 10]);
        assert_eq!(roundtrip(TransformConfig::baseline(), &src), src);

        let compiled = CompiledConfig::compile_builtin(TransformConfig::baseline()).unwrap();
        let unit = EncodeContext::new(compiled).unwrap().compress_to_vec(&src).unwrap();
        let header = UnitHeader::parse(&unit).unwrap();
        assert!(header.flags.contains(UnitFlags::HAS_TAIL));
        assert_eq!(header.raw_len, 3 * 64 + 10);
        assert_eq!(header.record_count, 3);
    }

    #[test]
    fn tail_only_and_empty_chunks_roundtrip() {
        assert_eq!(roundtrip(TransformConfig::baseline(), &[1, 2, 3]), vec![1, 2, 3]);
        assert!(roundtrip(TransformConfig::baseline(), &[]).is_empty());
    }

    #[test]
    fn incompressible_data_stays_within_bound() {
        let mut rng = StdRng::seed_from_u64(99);
        let src: Vec<u8> = (0..64 * 64).map(|_| rng.gen()).collect();
        assert_eq!(roundtrip(TransformConfig::baseline(), &src), src);
    }

    #[test]
    fn unit_starts_with_magic_and_version() {
        let compiled = CompiledConfig::compile_builtin(TransformConfig::baseline()).unwrap();
        let unit = EncodeContext::new(compiled).unwrap().compress_to_vec(&trace(4)).unwrap();
        assert_eq!(&unit[..4], &UNIT_MAGIC);
        assert!(probe_unit(&unit));
        assert!(!probe_unit(&unit[..4]));
        assert!(!probe_unit(b"FPK1\x07"));
        assert_eq!(compressed_size(&unit[..UnitHeader::LEN - 1]).unwrap(), None);
    }

// # ❌ 4. Corruption

    #[test]
    fn short_destination_is_rejected() {
        let compiled = CompiledConfig::compile_builtin(TransformConfig::baseline()).unwrap();
        let mut ctx = EncodeContext::new(compiled).unwrap();
        let mut dst = vec![0u8; 16];
        assert!(matches!(ctx.compress(&trace(2), &mut dst), Err(EngineError::DstTooSmall { .. })));
    }

    #[test]
    fn checksum_mismatch_is_detected() {
        let compiled = CompiledConfig::compile_builtin(TransformConfig::baseline()).unwrap();
        let mut unit = EncodeContext::new(Arc::clone(&compiled)).unwrap().compress_to_vec(&trace(8)).unwrap();
        unit[32] ^= 0xFF;
        assert!(matches!(
            DecodeContext::new(compiled).decompress(&unit),
            Err(EngineError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn length_and_limit_violations_are_detected() {
        let compiled = CompiledConfig::compile_builtin(TransformConfig::baseline()).unwrap();
        let unit = EncodeContext::new(Arc::clone(&compiled)).unwrap().compress_to_vec(&trace(2)).unwrap();

        let mut ctx = DecodeContext::new(Arc::clone(&compiled));
        assert!(matches!(
            ctx.decompress(&unit[..unit.len() - 1]),
            Err(EngineError::LengthMismatch { .. })
        ));

        let mut limited = DecodeContext::new(compiled).with_max_raw_len(64);
        assert!(matches!(limited.decompress(&unit), Err(EngineError::TooLarge { raw_len: 128, max: 64 })));
    }

    #[test]
    fn default_decode_limit_rejects_oversized_raw_len() {
        let compiled = CompiledConfig::compile_builtin(TransformConfig::baseline()).unwrap();
        let mut unit = EncodeContext::new(Arc::clone(&compiled)).unwrap().compress_to_vec(&trace(2)).unwrap();
        unit[16..24].copy_from_slice(&u64::MAX.to_le_bytes());

        let limit = DEFAULT_CHUNK_SIZE as u64;
        assert!(matches!(
            DecodeContext::new(compiled).decompress(&unit),
            Err(EngineError::TooLarge { raw_len: u64::MAX, max }) if max == limit
        ));
    }

    #[test]
    fn foreign_bytes_are_not_units() {
        let junk = vec![0x5Au8; 64];
        assert!(matches!(compressed_size(&junk), Err(EngineError::BadMagic { .. })));

        let mut wrong_version = junk.clone();
        wrong_version[..4].copy_from_slice(&UNIT_MAGIC);
        wrong_version[4] = 2;
        assert!(matches!(UnitHeader::parse(&wrong_version), Err(EngineError::UnsupportedVersion(2))));
    }
}
