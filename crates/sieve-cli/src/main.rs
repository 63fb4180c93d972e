//! sieve - concurrent batch scoring CLI
//!
//! Loads records from JSON, scores them on a fixed worker pool and
//! reports the passing records sorted by score.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;
mod input;
mod report;
mod signals;

use config::Config;

#[derive(Parser)]
#[command(name = "sieve")]
#[command(about = "Score record batches on a fixed worker pool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging (per-record worker output)
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./sieve.toml or ~/.config/sieve/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Score a batch with the worker pool and print the sorted report
    Run(cmd::run::RunArgs),
    /// Score records sequentially and show every intermediate value
    Score(cmd::score::ScoreArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(sieve_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug: the progress bar shows activity
    //   non-TTY: info unless --debug: logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    sieve_core::init_logging(quiet, cli.debug, multi);

    if let Err(e) = signals::install() {
        log::warn!("Signal handlers not installed: {e}");
    }

    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    match cli.command {
        Command::Run(args) => cmd::run::run(args, &config, &progress),
        Command::Score(args) => cmd::score::run(args, &config).map(|()| ExitCode::SUCCESS),
        Command::Config => {
            use comfy_table::{
                Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
            };

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            table.add_row(vec!["Workers", &config.pool.workers.to_string()]);
            table.add_row(vec![
                "Queue capacity",
                &config.pool.queue_capacity.to_string(),
            ]);
            table.add_row(vec![
                "Result capacity",
                &config.pool.result_capacity.to_string(),
            ]);
            table.add_row(vec![
                "Cancel poll",
                &format!("{}ms", config.pool.cancel_poll_ms),
            ]);
            table.add_row(vec!["Divider", &config.scoring.divider.to_string()]);
            table.add_row(vec!["Modifier", &config.scoring.modifier.to_string()]);
            table.add_row(vec![
                "Report input table",
                if config.report.show_input { "yes" } else { "no" },
            ]);

            eprintln!("\n{table}");
            Ok(ExitCode::SUCCESS)
        }
    }
}
