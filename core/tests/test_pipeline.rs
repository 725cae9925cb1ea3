// Ordered parallel pipeline:
// * results reach the sink in submission order regardless of finish order
// * never more than `inflight` (2T) admitted-but-undrained tasks
// * any failure (input, context, task, sink) aborts the run

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::thread;
    use std::time::Duration;

    use fieldpack_core::stream::{run_ordered, ParallelismProfile};
    use fieldpack_core::types::StreamError;
    use rand::Rng;

    fn jitter() {
        let micros = rand::thread_rng().gen_range(0..300);
        thread::sleep(Duration::from_micros(micros));
    }

    fn inputs(n: u64) -> impl Iterator<Item = Result<u64, StreamError>> {
        (0..n).map(Ok)
    }

// # ✅ 1. Ordering

    #[test]
    fn output_order_matches_input_order() {
        for workers in [1, 2, 4, 8] {
            let profile = ParallelismProfile::new(workers);
            let mut seen = Vec::new();
            let stats = run_ordered(
                &profile,
                inputs(200),
                |_| Ok(()),
                |_, x: u64| {
                    jitter();
                    Ok(x * 3)
                },
                |index, out| {
                    assert_eq!(out, index * 3);
                    seen.push(index);
                    Ok(())
                },
            )
            .unwrap();

            assert_eq!(seen, (0..200).collect::<Vec<_>>());
            assert_eq!(stats.submitted, 200);
            assert_eq!(stats.drained, 200);
        }
    }

    #[test]
    fn each_worker_owns_its_context() {
        let profile = ParallelismProfile::new(3);
        let mut total = 0u64;
        run_ordered(
            &profile,
            inputs(50),
            |i| Ok(vec![i as u64]),
            |ctx: &mut Vec<u64>, x: u64| {
                ctx.push(x);
                Ok(x)
            },
            |_, x| {
                total += x;
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(total, (0..50).sum::<u64>());
    }

    #[test]
    fn empty_input_is_a_noop() {
        let stats = run_ordered(
            &ParallelismProfile::new(4),
            inputs(0),
            |_| Ok(()),
            |_, x: u64| Ok(x),
            |_, _| panic!("sink must not run"),
        )
        .unwrap();
        assert_eq!(stats.submitted, 0);
        assert_eq!(stats.max_inflight, 0);
    }

// # ✅ 2. Backpressure

    #[test]
    fn inflight_is_bounded_by_twice_the_workers() {
        for workers in [1usize, 2, 3, 6] {
            let profile = ParallelismProfile::new(workers);
            assert_eq!(profile.inflight, 2 * workers);

            let stats = run_ordered(
                &profile,
                inputs(100),
                |_| Ok(()),
                |_, x: u64| {
                    jitter();
                    Ok(x)
                },
                |_, _| Ok(()),
            )
            .unwrap();
            assert!(stats.max_inflight <= 2 * workers, "{} > {}", stats.max_inflight, 2 * workers);
            assert_eq!(stats.max_inflight, 2 * workers);
        }
    }

    #[test]
    fn source_is_not_read_ahead_of_the_inflight_bound() {
        for workers in [1usize, 2, 4] {
            let profile = ParallelismProfile::new(workers);
            let pulled = Cell::new(0usize);
            let drained = Cell::new(0usize);
            let peak = Cell::new(0usize);

            let source = (0..60u64).map(|x| {
                pulled.set(pulled.get() + 1);
                peak.set(peak.get().max(pulled.get() - drained.get()));
                Ok(x)
            });
            run_ordered(
                &profile,
                source,
                |_| Ok(()),
                |_, x: u64| {
                    jitter();
                    Ok(x)
                },
                |_, _| {
                    drained.set(drained.get() + 1);
                    Ok(())
                },
            )
            .unwrap();

            assert_eq!(drained.get(), 60);
            assert!(peak.get() <= 2 * workers, "workers={} peak={}", workers, peak.get());
            assert_eq!(peak.get(), 2 * workers);
        }
    }

// # ❌ 3. Failures

    #[test]
    fn task_error_aborts_and_is_reported() {
        let mut drained = Vec::new();
        let err = run_ordered(
            &ParallelismProfile::new(4),
            inputs(100),
            |_| Ok(()),
            |_, x: u64| {
                jitter();
                if x == 10 {
                    Err(StreamError::Validation("boom".into()))
                } else {
                    Ok(x)
                }
            },
            |index, _| {
                drained.push(index);
                Ok(())
            },
        )
        .unwrap_err();

        assert!(err.to_string().contains("boom"), "{}", err);
        assert!(drained.len() <= 10);
        assert_eq!(drained, (0..drained.len() as u64).collect::<Vec<_>>());
    }

    #[test]
    fn sink_error_stops_the_run() {
        let mut calls = 0;
        let err = run_ordered(
            &ParallelismProfile::new(2),
            inputs(40),
            |_| Ok(()),
            |_, x: u64| Ok(x),
            |index, _| {
                calls += 1;
                if index == 3 {
                    Err(StreamError::Pipeline("writer closed".into()))
                } else {
                    Ok(())
                }
            },
        )
        .unwrap_err();
        assert!(matches!(err, StreamError::Pipeline(msg) if msg == "writer closed"));
        assert_eq!(calls, 4);
    }

    #[test]
    fn input_error_stops_admission() {
        let source = (0..20u64).map(|i| {
            if i == 5 {
                Err(StreamError::Validation("bad chunk".into()))
            } else {
                Ok(i)
            }
        });
        let mut drained = 0;
        let err = run_ordered(
            &ParallelismProfile::new(2),
            source,
            |_| Ok(()),
            |_, x: u64| Ok(x),
            |_, _| {
                drained += 1;
                Ok(())
            },
        )
        .unwrap_err();
        assert!(matches!(err, StreamError::Validation(msg) if msg == "bad chunk"));
        assert!(drained <= 5);
    }

    #[test]
    fn context_error_fails_before_work() {
        let err = run_ordered(
            &ParallelismProfile::new(3),
            inputs(10),
            |i| if i == 2 { Err(StreamError::Validation("no context".into())) } else { Ok(()) },
            |_, x: u64| Ok(x),
            |_, _| panic!("sink must not run"),
        )
        .unwrap_err();
        assert!(matches!(err, StreamError::Validation(_)));
    }
}
