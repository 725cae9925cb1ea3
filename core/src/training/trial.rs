//! training/trial.rs
//! Built-in optimizer: scores every codec candidate by trial compression.
//!
//! The sample is split with the template's transform. Each field stream,
//! the side channel and (with clustering) each equal-width field group is
//! compressed with every candidate on a small worker pool. Per stream the
//! non-dominated `(size, time)` scores form a frontier; one configuration is
//! assembled per trade-off weight and the results are ranked by total size,
//! then total time.

use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::unbounded;

use crate::compression::{create_compressor, ElementFilter};
use crate::engine::{
    ClusterSpec,
    CodecSpec,
    FieldStrategy,
    TransformConfig,
    TransformRegistry,
};
use crate::schema::{field_spec, FieldTag, NUM_FIELDS};
use crate::training::optimizer::Optimizer;
use crate::training::types::{GraphTemplate, TrainError, TrainParams};

/// Size/time weights used in frontier mode. `0.0` picks the smallest
/// candidate, `1.0` the fastest.
pub const TRADEOFF_WEIGHTS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// Result of compressing one stream with one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub spec: CodecSpec,
    /// Coded size, capped at the raw size (sections never grow).
    pub size: usize,
    pub time: Duration,
}

impl Score {
    /// Non-dominated subset, ordered by size ascending.
    pub fn frontier(scores: &[Score]) -> Vec<Score> {
        let mut sorted = scores.to_vec();
        sorted.sort_by(|a, b| a.size.cmp(&b.size).then(a.time.cmp(&b.time)));

        let mut front: Vec<Score> = Vec::new();
        for s in sorted {
            match front.last() {
                Some(last) if s.time >= last.time => {}
                _ => front.push(s),
            }
        }
        front
    }

    /// Lowest weighted cost among `front`, sizes and times normalized to
    /// the best of each.
    pub fn pick(front: &[Score], weight: f64) -> Option<Score> {
        let min_size = front.iter().map(|s| s.size).min()?.max(1) as f64;
        let min_time = front
            .iter()
            .map(|s| s.time.as_secs_f64())
            .fold(f64::INFINITY, f64::min)
            .max(1e-9);

        let cost = |s: &Score| {
            (1.0 - weight) * (s.size as f64 / min_size)
                + weight * (s.time.as_secs_f64().max(1e-9) / min_time)
        };
        front.iter().copied().min_by(|a, b| cost(a).total_cmp(&cost(b)))
    }
}

// ===== Scoring jobs =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Aux,
    Field(FieldTag),
    Cluster(usize),
}

struct Job {
    target: Target,
    /// `(bytes, element width)`; a candidate's score sums over all parts.
    parts: Vec<(Vec<u8>, usize)>,
    filters_allowed: bool,
}

fn label(target: Target, groups: &[Vec<FieldTag>]) -> String {
    match target {
        Target::Aux => "side-channel".to_string(),
        Target::Field(tag) => tag.name().to_string(),
        Target::Cluster(g) => {
            let names: Vec<&str> = groups[g].iter().map(|t| t.name()).collect();
            format!("[{}]", names.join(", "))
        }
    }
}

fn score_job(job: &Job, candidates: &[CodecSpec], name: &str) -> Result<Vec<Score>, TrainError> {
    let mut scores = Vec::with_capacity(candidates.len());

    for &spec in candidates {
        if spec.filter != ElementFilter::None
            && (!job.filters_allowed || !job.parts.iter().all(|(_, w)| spec.filter.is_effective(*w)))
        {
            continue;
        }

        let start = Instant::now();
        let mut size = 0usize;
        for (bytes, width) in &job.parts {
            let filtered = spec.filter.apply(bytes, *width)?;
            let mut compressor = create_compressor(spec.codec, spec.level)?;
            let mut out = Vec::new();
            compressor.compress_chunk(&filtered, &mut out)?;
            size += out.len().min(bytes.len());
        }
        let time = start.elapsed();

        log::debug!("[TRAIN] {:<24} {:<20} {:>12} bytes {:>10.2?}", name, spec.label(), size, time);
        scores.push(Score { spec, size, time });
    }
    Ok(scores)
}

/// Score every job on up to `threads` workers. Results keep job order.
fn score_all(
    jobs: &[Job],
    candidates: &[CodecSpec],
    groups: &[Vec<FieldTag>],
    threads: usize,
) -> Result<Vec<Vec<Score>>, TrainError> {
    let workers = threads.max(1).min(jobs.len().max(1));
    let (job_tx, job_rx) = unbounded::<usize>();
    let (res_tx, res_rx) = unbounded::<(usize, Result<Vec<Score>, TrainError>)>();

    for i in 0..jobs.len() {
        job_tx
            .send(i)
            .map_err(|_| TrainError::Worker("job queue closed".into()))?;
    }
    drop(job_tx);

    thread::scope(|scope| {
        for w in 0..workers {
            let rx = job_rx.clone();
            let tx = res_tx.clone();
            scope.spawn(move || {
                for i in rx.iter() {
                    let name = label(jobs[i].target, groups);
                    log::trace!("[WORKER-{w}] scoring {}", name);
                    let res = score_job(&jobs[i], candidates, &name);
                    if tx.send((i, res)).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(res_tx);

    let mut results: Vec<Option<Vec<Score>>> = vec![None; jobs.len()];
    for (i, res) in res_rx.iter() {
        results[i] = Some(res?);
    }
    results
        .into_iter()
        .enumerate()
        .map(|(i, r)| r.ok_or_else(|| TrainError::Worker(format!("no result for job {}", i))))
        .collect()
}

// ===== Optimizer =====

#[derive(Debug, Default, Clone, Copy)]
pub struct TrialOptimizer;

struct Assembled {
    config: TransformConfig,
    size: usize,
    time: Duration,
}

impl TrialOptimizer {
    /// Fields grouped by element width; only groups of two or more.
    fn width_groups() -> Vec<Vec<FieldTag>> {
        let mut groups: Vec<Vec<FieldTag>> = Vec::new();
        for tag in FieldTag::ALL {
            let width = field_spec(tag).elt_width;
            match groups.iter_mut().find(|g| field_spec(g[0]).elt_width == width) {
                Some(g) => g.push(tag),
                None => groups.push(vec![tag]),
            }
        }
        groups.retain(|g| g.len() > 1);
        groups
    }

    fn assemble(
        weight: f64,
        aux: &[Score],
        fields: &[Vec<Score>],
        clusters: &[(Vec<FieldTag>, Vec<Score>)],
    ) -> Option<Assembled> {
        let aux = Score::pick(aux, weight)?;
        let mut per_field = Vec::with_capacity(NUM_FIELDS);
        for front in fields {
            per_field.push(Score::pick(front, weight)?);
        }

        let mut size = aux.size;
        let mut time = aux.time;
        let mut clustered: Vec<ClusterSpec> = Vec::new();
        let mut covered = [false; NUM_FIELDS];

        for (members, front) in clusters {
            let Some(joint) = Score::pick(front, weight) else { continue };
            let separate: usize = members.iter().map(|t| per_field[t.index()].size).sum();
            if joint.size < separate {
                for t in members {
                    covered[t.index()] = true;
                }
                size += joint.size;
                time += joint.time;
                clustered.push(ClusterSpec { tags: members.clone(), codec: joint.spec });
            }
        }
        for tag in FieldTag::ALL {
            if !covered[tag.index()] {
                size += per_field[tag.index()].size;
                time += per_field[tag.index()].time;
            }
        }

        let strategy = if clustered.is_empty() {
            let mut specs = [CodecSpec::raw(); NUM_FIELDS];
            for tag in FieldTag::ALL {
                specs[tag.index()] = per_field[tag.index()].spec;
            }
            FieldStrategy::PerField(specs)
        } else {
            for tag in FieldTag::ALL {
                if !covered[tag.index()] {
                    clustered.push(ClusterSpec { tags: vec![tag], codec: per_field[tag.index()].spec });
                }
            }
            FieldStrategy::Clustered(clustered)
        };

        Some(Assembled { config: TransformConfig::new(aux.spec, strategy), size, time })
    }
}

impl Optimizer for TrialOptimizer {
    fn name(&self) -> &'static str {
        "trial"
    }

    fn train(
        &self,
        samples: &[&[u8]],
        template: &GraphTemplate,
        params: &TrainParams,
    ) -> Result<Vec<TransformConfig>, TrainError> {
        if samples.iter().all(|s| s.is_empty()) {
            return Err(TrainError::EmptyCorpus);
        }
        if template.candidates.is_empty() {
            return Err(TrainError::NoCodecCandidates);
        }
        let transform = TransformRegistry::with_builtin().resolve(&template.entry_transform)?;

        // ---- Split the corpus ----
        let mut tags = Vec::new();
        let mut sizes = Vec::new();
        let mut fields: Vec<Vec<u8>> = vec![Vec::new(); NUM_FIELDS];
        for sample in samples {
            let out = transform.split(sample)?;
            tags.extend_from_slice(&out.tags);
            sizes.extend_from_slice(&out.sizes_le_bytes());
            for tag in FieldTag::ALL {
                fields[tag.index()].extend_from_slice(&out.field(tag).bytes);
            }
        }
        log::info!(
            "[TRAIN] {} samples, {} segments, {} candidates, {} threads",
            samples.len(),
            tags.len(),
            template.candidates.len(),
            params.threads
        );

        // ---- Build scoring jobs ----
        let groups = if template.clustering { Self::width_groups() } else { Vec::new() };
        let mut jobs = vec![Job {
            target: Target::Aux,
            parts: vec![(tags, 1), (sizes, 4)],
            filters_allowed: false,
        }];
        for (g, members) in groups.iter().enumerate() {
            let joined: Vec<u8> = members.iter().flat_map(|t| fields[t.index()].iter().copied()).collect();
            jobs.push(Job {
                target: Target::Cluster(g),
                parts: vec![(joined, field_spec(members[0]).elt_width)],
                filters_allowed: true,
            });
        }
        for (tag, bytes) in FieldTag::ALL.into_iter().zip(fields) {
            jobs.push(Job {
                target: Target::Field(tag),
                parts: vec![(bytes, field_spec(tag).elt_width)],
                filters_allowed: true,
            });
        }

        let scored = score_all(&jobs, &template.candidates, &groups, params.threads)?;

        // ---- Frontiers ----
        let mut aux_front = Vec::new();
        let mut field_fronts: Vec<Vec<Score>> = vec![Vec::new(); NUM_FIELDS];
        let mut cluster_fronts: Vec<(Vec<FieldTag>, Vec<Score>)> = Vec::new();
        for (job, scores) in jobs.iter().zip(&scored) {
            let front = Score::frontier(scores);
            match job.target {
                Target::Aux => aux_front = front,
                Target::Field(tag) => field_fronts[tag.index()] = front,
                Target::Cluster(g) => cluster_fronts.push((groups[g].clone(), front)),
            }
        }

        // ---- Assemble and rank ----
        let weights: &[f64] = if params.pareto_frontier { &TRADEOFF_WEIGHTS } else { &TRADEOFF_WEIGHTS[..1] };
        let mut ranked: Vec<Assembled> = weights
            .iter()
            .filter_map(|&w| Self::assemble(w, &aux_front, &field_fronts, &cluster_fronts))
            .collect();
        ranked.sort_by(|a, b| a.size.cmp(&b.size).then(a.time.cmp(&b.time)));

        let mut configs: Vec<TransformConfig> = Vec::with_capacity(ranked.len());
        for (rank, candidate) in ranked.into_iter().enumerate() {
            if configs.contains(&candidate.config) {
                continue;
            }
            log::info!(
                "[TRAIN] candidate {}: {} bytes, {:.2?} trial time",
                rank,
                candidate.size,
                candidate.time
            );
            configs.push(candidate.config);
        }
        Ok(configs)
    }
}
