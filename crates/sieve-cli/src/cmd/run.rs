//! `sieve run` - score a batch of records with the worker pool

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use sieve_core::{PoolConfig, ScoreParams, SharedProgress, WorkerPool};

use crate::config::Config;
use crate::{input, report, signals};

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// JSON file with an array of {"company", "count", "price"} records
    pub input: PathBuf,

    /// Number of worker threads
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Bounded work queue capacity
    #[arg(long)]
    pub queue_capacity: Option<usize>,

    /// Maximum number of passing records kept
    #[arg(long)]
    pub result_capacity: Option<usize>,

    /// Divider applied to the derived value
    #[arg(long)]
    pub divider: Option<i64>,

    /// Records pass when their score is not a multiple of this
    #[arg(long)]
    pub modifier: Option<u64>,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write the sorted results as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Leave the input table out of the report
    #[arg(long)]
    pub no_input: bool,
}

/// Config file values with CLI overrides applied
fn effective(args: &RunArgs, config: &Config) -> (PoolConfig, ScoreParams) {
    let pool = PoolConfig {
        workers: args.workers.unwrap_or(config.pool.workers),
        queue_capacity: args.queue_capacity.unwrap_or(config.pool.queue_capacity),
        result_capacity: args.result_capacity.unwrap_or(config.pool.result_capacity),
        cancel_poll_ms: config.pool.cancel_poll_ms,
    };
    let params = ScoreParams {
        divider: args.divider.unwrap_or(config.scoring.divider),
        modifier: args.modifier.unwrap_or(config.scoring.modifier),
    };
    (pool, params)
}

pub fn run(args: RunArgs, config: &Config, progress: &SharedProgress) -> Result<ExitCode> {
    let records = input::load_records(&args.input)?;
    let (pool_config, params) = effective(&args, config);

    let pb = progress.batch_bar("scoring", records.len() as u64);
    let pool = WorkerPool::new(pool_config, params)
        .context("Invalid pool configuration")?
        .with_progress(pb.clone());

    let summary = pool.run_all_with_cancel(records.clone(), signals::shutdown_flag())?;
    pb.finish_and_clear();
    summary.log();

    let results = summary.results.records();
    let show_input = config.report.show_input && !args.no_input;
    let text = report::render(
        &results,
        &summary.failures,
        show_input.then_some(records.as_slice()),
    );

    match &args.output {
        Some(path) => {
            std::fs::write(path, &text)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            log::info!("Report written to {}", path.display());
        }
        None => println!("{text}"),
    }

    if let Some(path) = &args.json {
        input::save_records(&results, path)?;
        log::info!("Results written to {}", path.display());
    }

    progress.println(format!(
        "all - {}; filtered - {} ({:.3}s)",
        records.len(),
        results.len(),
        summary.elapsed.as_secs_f64()
    ));

    if summary.cancelled || signals::is_shutdown_requested() {
        log::warn!("Run cancelled, report is partial");
        return Ok(ExitCode::from(130));
    }
    Ok(ExitCode::SUCCESS)
}
