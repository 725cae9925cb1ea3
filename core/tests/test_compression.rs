// Block codecs and element filters:
// * every codec decodes its own output at the declared raw length
// * level validation and codec id lookup
// * delta / shuffle filters are exact inverses

#[cfg(test)]
mod tests {
    use fieldpack_core::compression::{
        create_compressor, create_decompressor, create_decompressor_by_id, resolve, validate_level,
        CompressionCodec, CompressionError, ElementFilter,
    };
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn sample(len: usize) -> Vec<u8> {
        let mut rng = StdRng::seed_from_u64(7);
        (0..len).map(|i| if i % 3 == 0 { rng.gen() } else { (i / 16) as u8 }).collect()
    }

// # ✅ 1. Codecs

    #[test]
    fn every_codec_roundtrips() {
        let input = sample(10_000);
        for codec in CompressionCodec::ALL {
            let info = resolve(codec);
            let mut c = create_compressor(codec, info.default_level).unwrap();
            let mut coded = Vec::new();
            c.compress_chunk(&input, &mut coded).unwrap();
            assert_eq!(c.codec(), codec);

            let mut d = create_decompressor(codec);
            let mut decoded = Vec::new();
            d.decompress_chunk(&coded, input.len(), &mut decoded).unwrap();
            assert_eq!(decoded, input, "codec {}", info.name);
        }
    }

    #[test]
    fn codecs_handle_empty_input() {
        for codec in CompressionCodec::ALL {
            let mut c = create_compressor(codec, resolve(codec).default_level).unwrap();
            let mut coded = Vec::new();
            c.compress_chunk(&[], &mut coded).unwrap();

            let mut decoded = Vec::new();
            create_decompressor(codec).decompress_chunk(&coded, 0, &mut decoded).unwrap();
            assert!(decoded.is_empty());
        }
    }

    #[test]
    fn wrong_raw_length_is_detected() {
        let input = sample(4096);
        for codec in [CompressionCodec::Raw, CompressionCodec::Zstd, CompressionCodec::Lz4] {
            let mut c = create_compressor(codec, resolve(codec).default_level).unwrap();
            let mut coded = Vec::new();
            c.compress_chunk(&input, &mut coded).unwrap();

            let mut decoded = Vec::new();
            let res = create_decompressor(codec).decompress_chunk(&coded, input.len() - 1, &mut decoded);
            assert!(res.is_err(), "codec {:?}", codec);
        }
    }

    #[test]
    fn level_ranges_are_enforced() {
        assert!(validate_level(CompressionCodec::Zstd, 22).is_ok());
        assert!(validate_level(CompressionCodec::Zstd, -7).is_ok());
        assert!(matches!(
            validate_level(CompressionCodec::Zstd, 23),
            Err(CompressionError::InvalidLevel { codec: "zstd", level: 23 })
        ));
        assert!(create_compressor(CompressionCodec::Deflate, 10).is_err());
        assert!(validate_level(CompressionCodec::Lz4, 99).is_ok());
    }

    #[test]
    fn unknown_codec_id_is_rejected() {
        assert!(create_decompressor_by_id(1).is_ok());
        let err = create_decompressor_by_id(0x42).err().unwrap();
        assert!(matches!(err, CompressionError::UnsupportedCodec { codec_id: 0x42 }));
        assert!(err.to_string().contains("0x42"));
    }

// # ✅ 2. Filters

    #[test]
    fn filters_invert_for_every_width() {
        let input = sample(8 * 64);
        for width in [1usize, 2, 4, 8] {
            for filter in ElementFilter::ALL {
                let coded = filter.apply(&input, width).unwrap();
                assert_eq!(coded.len(), input.len());
                assert_eq!(filter.invert(&coded, width).unwrap(), input, "{:?}/{}", filter, width);
            }
        }
    }

    #[test]
    fn delta_turns_progression_into_constant() {
        let values: Vec<u8> = [100u64, 104, 108, 112].iter().flat_map(|v| v.to_le_bytes()).collect();
        let coded = ElementFilter::Delta.apply(&values, 8).unwrap();
        let deltas: Vec<u64> = coded
            .chunks_exact(8)
            .map(|c| u64::from_le_bytes(c.try_into().unwrap()))
            .collect();
        assert_eq!(deltas, vec![100, 4, 4, 4]);
    }

    #[test]
    fn delta_wraps_within_element_width() {
        let input = vec![0xFF, 0x00, 0x01];
        let coded = ElementFilter::Delta.apply(&input, 1).unwrap();
        assert_eq!(coded, vec![0xFF, 0x01, 0x01]);
        assert_eq!(ElementFilter::Delta.invert(&coded, 1).unwrap(), input);
    }

    #[test]
    fn shuffle_groups_byte_planes() {
        let coded = ElementFilter::Shuffle.apply(&[1, 2, 3, 4, 5, 6], 2).unwrap();
        assert_eq!(coded, vec![1, 3, 5, 2, 4, 6]);
        assert!(!ElementFilter::Shuffle.is_effective(1));
        assert!(ElementFilter::Shuffle.is_effective(8));
    }

    #[test]
    fn misaligned_filter_input_is_rejected() {
        assert!(matches!(
            ElementFilter::Delta.apply(&[0u8; 7], 8),
            Err(CompressionError::FilterAlignment { len: 7, width: 8 })
        ));
        assert!(ElementFilter::from_id(3).is_err());
    }
}
