// Frame conventions and the incremental scanner:
// * convention probe (magic + version => self-describing)
// * frame boundaries for both conventions, with offsets
// * truncation, implausible lengths and foreign bytes are errors

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use fieldpack_core::constants::LENGTH_PREFIX_LEN;
    use fieldpack_core::engine::{CompiledConfig, EncodeContext, TransformConfig, UNIT_MAGIC, UNIT_VERSION};
    use fieldpack_core::schema::TraceRecord;
    use fieldpack_core::stream::{
        max_frame_len, probe_convention, write_frame, FrameConvention, FrameError, FrameScanner,
    };

    const CHUNK: usize = 128;

    fn units(chunks: usize) -> Vec<Vec<u8>> {
        let compiled = CompiledConfig::compile_builtin(TransformConfig::baseline()).unwrap();
        let mut ctx = EncodeContext::new(Arc::clone(&compiled)).unwrap();
        (0..chunks)
            .map(|i| {
                let recs: Vec<TraceRecord> = (0..2)
                    .map(|j| TraceRecord { ip: (i * 2 + j) as u64 * 4, ..Default::default() })
                    .collect();
                ctx.compress_to_vec(&TraceRecord::encode_all(&recs)).unwrap()
            })
            .collect()
    }

    fn stream(units: &[Vec<u8>], convention: FrameConvention) -> Vec<u8> {
        let mut out = Vec::new();
        for u in units {
            write_frame(&mut out, convention, u).unwrap();
        }
        out
    }

    fn scan(bytes: Vec<u8>) -> Vec<Result<Vec<u8>, FrameError>> {
        FrameScanner::new(Cursor::new(bytes), max_frame_len(CHUNK))
            .map(|r| r.map(|f| f.bytes.to_vec()))
            .collect()
    }

// # ✅ 1. Probe

    #[test]
    fn probe_classifies_by_magic_and_version() {
        let mut head = UNIT_MAGIC.to_vec();
        head.push(UNIT_VERSION);
        assert_eq!(probe_convention(&head), FrameConvention::SelfDescribing);

        head[4] = 0x7F;
        assert_eq!(probe_convention(&head), FrameConvention::LengthPrefixed);
        assert_eq!(probe_convention(&[0x10, 0, 0, 0, 0, 0, 0, 0]), FrameConvention::LengthPrefixed);
        assert_eq!(probe_convention(&[]), FrameConvention::LengthPrefixed);
    }

    #[test]
    fn writer_reports_prefix_overhead() {
        let mut out = Vec::new();
        assert_eq!(write_frame(&mut out, FrameConvention::LengthPrefixed, b"abc").unwrap(), 11);
        assert_eq!(&out[..LENGTH_PREFIX_LEN], &3u64.to_le_bytes());
        assert_eq!(write_frame(&mut out, FrameConvention::SelfDescribing, b"abc").unwrap(), 3);
    }

// # ✅ 2. Scanning

    #[test]
    fn self_describing_frames_are_located() {
        let units = units(3);
        let bytes = stream(&units, FrameConvention::SelfDescribing);

        let mut scanner = FrameScanner::new(Cursor::new(bytes), max_frame_len(CHUNK));
        let frames: Vec<_> = scanner.by_ref().map(Result::unwrap).collect();
        assert_eq!(scanner.convention(), Some(FrameConvention::SelfDescribing));

        assert_eq!(frames.len(), 3);
        let mut offset = 0u64;
        for (i, (frame, unit)) in frames.iter().zip(&units).enumerate() {
            assert_eq!(frame.index, i as u64);
            assert_eq!(frame.offset, offset);
            assert_eq!(frame.bytes.as_ref(), unit.as_slice());
            offset += unit.len() as u64;
        }
        assert_eq!(scanner.stream_offset(), offset);
    }

    #[test]
    fn length_prefixed_frames_are_located() {
        let units = units(4);
        let bytes = stream(&units, FrameConvention::LengthPrefixed);

        let mut scanner = FrameScanner::new(Cursor::new(bytes), max_frame_len(CHUNK));
        let frames: Vec<Vec<u8>> = scanner.by_ref().map(|f| f.unwrap().bytes.to_vec()).collect();
        assert_eq!(scanner.convention(), Some(FrameConvention::LengthPrefixed));
        assert_eq!(frames, units);
    }

    #[test]
    fn fixed_convention_skips_probe() {
        let units = units(2);
        let bytes = stream(&units, FrameConvention::LengthPrefixed);
        let frames: Vec<_> =
            FrameScanner::with_convention(Cursor::new(bytes), max_frame_len(CHUNK), FrameConvention::LengthPrefixed)
                .map(Result::unwrap)
                .collect();
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn empty_stream_has_no_frames() {
        assert!(scan(Vec::new()).is_empty());
    }

// # ❌ 3. Damage

    #[test]
    fn cut_body_is_unexpected_eof() {
        let mut bytes = stream(&units(2), FrameConvention::SelfDescribing);
        bytes.truncate(bytes.len() - 5);

        let results = scan(bytes);
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(FrameError::UnexpectedEof { .. })));
    }

    #[test]
    fn cut_header_is_truncated() {
        let mut bytes = stream(&units(1), FrameConvention::SelfDescribing);
        bytes.truncate(20);
        let results = scan(bytes);
        assert!(matches!(results.as_slice(), [Err(FrameError::Truncated { offset: 0 })]));

        let results = scan(vec![5, 0, 0]);
        assert!(matches!(results.as_slice(), [Err(FrameError::Truncated { offset: 0 })]));
    }

    #[test]
    fn implausible_length_prefix_is_corrupt() {
        let mut bytes = u64::MAX.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0u8; 32]);
        let results = scan(bytes);
        assert!(matches!(
            results.as_slice(),
            [Err(FrameError::Corrupt { offset: 0, len: u64::MAX, .. })]
        ));
    }

    #[test]
    fn garbage_between_units_is_invalid_magic() {
        let units = units(1);
        let mut bytes = stream(&units, FrameConvention::SelfDescribing);
        bytes.extend_from_slice(&[0xEE; 64]);

        let results = scan(bytes);
        assert_eq!(results.len(), 2);
        assert!(matches!(results[1], Err(FrameError::InvalidMagic { offset }) if offset == units[0].len() as u64));
    }

    #[test]
    fn scanner_stops_after_first_error() {
        let mut scanner = FrameScanner::new(Cursor::new(vec![1u8, 2, 3]), max_frame_len(CHUNK));
        assert!(scanner.next().unwrap().is_err());
        assert!(scanner.next().is_none());
    }
}
