// Telemetry counters, stage timers and snapshots.

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::time::Duration;

    use fieldpack_core::engine::{CompiledConfig, TransformConfig, UnitHeader};
    use fieldpack_core::schema::TraceRecord;
    use fieldpack_core::stream::{compress_stream, FrameConvention, StreamOptions};
    use fieldpack_core::telemetry::{Stage, StageTimes, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};

    #[test]
    fn counters_accumulate_frames() {
        let mut c = TelemetryCounters::default();
        c.add_frame(128, 60, 36);
        c.add_frame(64, 40, 36);
        assert_eq!((c.frames, c.bytes_raw, c.bytes_compressed), (2, 192, 100));
        assert_eq!(c.bytes_overhead, 72);
    }

    #[test]
    fn counters_encode_with_bincode() {
        let mut c = TelemetryCounters::default();
        c.add_frame(1000, 300, 44);
        c.add_verified(1000);
        let bytes = bincode::encode_to_vec(&c, bincode::config::standard()).unwrap();
        let (back, _): (TelemetryCounters, usize) =
            bincode::decode_from_slice(&bytes, bincode::config::standard()).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn stage_times_accumulate_per_stage() {
        let mut times = StageTimes::default();
        times.add(Stage::Compress, Duration::from_millis(3));
        times.add(Stage::Compress, Duration::from_millis(2));
        times.add(Stage::Write, Duration::from_millis(1));

        assert_eq!(times.get(Stage::Compress), Duration::from_millis(5));
        assert_eq!(times.get(Stage::Verify), Duration::ZERO);
        assert_eq!(times.total(), Duration::from_millis(6));
        assert!(times.has_all(&[Stage::Compress, Stage::Write]));
        assert!(!times.has_all(&[Stage::Read]));
        assert_eq!(times.get_ms(Stage::Write), 1.0);
    }

    #[test]
    fn timer_measures_closures() {
        let mut timer = TelemetryTimer::new();
        let v = timer.measure(Stage::Train, || 41 + 1);
        assert_eq!(v, 42);
        timer.finish();
        let elapsed = timer.elapsed();
        assert_eq!(timer.elapsed(), elapsed);
        assert!(timer.stage_times.has_all(&[Stage::Train]));
    }

    #[test]
    fn snapshot_derives_ratio_and_overhead() {
        let mut c = TelemetryCounters::default();
        c.add_frame(1000, 250, 8 + UnitHeader::LEN);
        let mut timer = TelemetryTimer::new();
        timer.finish();

        let snap = TelemetrySnapshot::from(&c, &timer, 4);
        assert_eq!(snap.compression_ratio, 0.25);
        assert_eq!(snap.workers, 4);
        assert_eq!(snap.output_bytes(), 258);
        assert!(snap.sanity_check());
        assert!(snap.summary().starts_with("1 frames"));

        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"bytes_raw\":1000"));
    }

    #[test]
    fn empty_snapshot_is_sane() {
        let snap = TelemetrySnapshot::from(&TelemetryCounters::default(), &TelemetryTimer::new(), 1);
        assert_eq!(snap.compression_ratio, 0.0);
        assert!(snap.sanity_check());
    }

    #[test]
    fn compress_run_reports_all_encode_stages() {
        let data = TraceRecord::encode_all(&vec![TraceRecord { ip: 4, ..Default::default() }; 300]);
        let config = CompiledConfig::compile_builtin(TransformConfig::baseline()).unwrap();
        let opts = StreamOptions::default()
            .with_chunk_size(64 * 64)
            .with_threads(2)
            .with_convention(FrameConvention::LengthPrefixed);

        let mut out = Vec::new();
        let snap = compress_stream(Cursor::new(&data), data.len() as u64, &mut out, &config, &opts).unwrap();

        assert_eq!(snap.frames, 5);
        assert_eq!(snap.bytes_raw, data.len() as u64);
        assert_eq!(snap.bytes_overhead, 5 * (8 + UnitHeader::LEN as u64));
        assert_eq!(snap.output_bytes(), out.len() as u64);
        assert!(snap.has_all_stages(&[Stage::Read, Stage::Compress, Stage::Write]));
        assert!(snap.sanity_check());
    }
}
