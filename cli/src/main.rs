//! fieldpack CLI
//!
//! Command-line front end over `fieldpack-core`:
//! - `train`      learn a transform configuration from a trace sample
//! - `compress`   trace file -> framed compressed file
//! - `decompress` framed compressed file -> trace file
//! - `verify`     check a compressed file against the original trace

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

use fieldpack_core::constants::DEFAULT_CHUNK_SIZE;
use fieldpack_core::engine::CompiledConfig;
use fieldpack_core::prelude::*;
use fieldpack_core::utils::{align_down_to_record, default_thread_count};

#[derive(Parser)]
#[command(name = "fieldpack")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Schema-aware compression for fixed 64-byte trace records")]
struct Cli {
    /// Debug-level logging (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print the run telemetry as JSON instead of a summary line
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone, Copy)]
struct PipelineArgs {
    /// Bytes per chunk, rounded down to a whole number of records
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Worker threads (defaults to detected hardware concurrency)
    #[arg(long, value_name = "N", default_value_t = default_thread_count())]
    threads: usize,
}

impl PipelineArgs {
    fn options(&self) -> StreamOptions {
        StreamOptions::default()
            .with_chunk_size(align_down_to_record(self.chunk_size))
            .with_threads(self.threads.max(1))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Train a transform configuration on a trace sample
    Train {
        trace_file: PathBuf,
        output_config: PathBuf,

        #[arg(long, value_name = "N", default_value_t = default_thread_count())]
        threads: usize,

        /// Try equal-width fields as shared clusters
        #[arg(long)]
        clustering: bool,

        /// Keep only the smallest candidate instead of the size/time frontier
        #[arg(long)]
        single_candidate: bool,
    },

    /// Compress a trace file
    Compress {
        trace_file: PathBuf,
        output_file: PathBuf,
        config_file: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Prefix every frame with its u64 length
        #[arg(long)]
        length_prefixed: bool,
    },

    /// Decompress a compressed file (framing is auto-detected)
    Decompress {
        compressed_file: PathBuf,
        output_file: PathBuf,
        config_file: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Decompress and compare against the original trace
    Verify {
        trace_file: PathBuf,
        compressed_file: PathBuf,
        config_file: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(if verbose { LevelFilter::Debug } else { LevelFilter::Info });
    builder.parse_default_env();
    builder.format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()));
    let _ = builder.try_init();
}

fn load_config(path: &Path) -> Result<Arc<CompiledConfig>> {
    CompiledConfig::load(path).with_context(|| format!("loading config {}", path.display()))
}

fn report(snapshot: &TelemetrySnapshot, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot).context("encoding telemetry")?);
    } else {
        println!("{}", snapshot.summary());
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let snapshot = match cli.command {
        Commands::Train { trace_file, output_config, threads, clustering, single_candidate } => {
            let params = TrainParams {
                threads: threads.max(1),
                clustering,
                pareto_frontier: !single_candidate,
            };
            train_file(&trace_file, &output_config, &params)
                .with_context(|| format!("training on {}", trace_file.display()))?
        }
        Commands::Compress { trace_file, output_file, config_file, pipeline, length_prefixed } => {
            let config = load_config(&config_file)?;
            let convention = if length_prefixed {
                FrameConvention::LengthPrefixed
            } else {
                FrameConvention::SelfDescribing
            };
            let opts = pipeline.options().with_convention(convention);
            compress_file(&trace_file, &output_file, &config, &opts)
                .with_context(|| format!("compressing {}", trace_file.display()))?
        }
        Commands::Decompress { compressed_file, output_file, config_file, pipeline } => {
            let config = load_config(&config_file)?;
            decompress_file(&compressed_file, &output_file, &config, &pipeline.options())
                .with_context(|| format!("decompressing {}", compressed_file.display()))?
        }
        Commands::Verify { trace_file, compressed_file, config_file, pipeline } => {
            let config = load_config(&config_file)?;
            let snapshot = verify_file(&trace_file, &compressed_file, &config, &pipeline.options())
                .with_context(|| format!("verifying {} against {}", compressed_file.display(), trace_file.display()))?;
            log::info!("verification passed: {} bytes identical", snapshot.bytes_verified);
            snapshot
        }
    };
    report(&snapshot, cli.json)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
