//! `sieve score` - score records one by one without the pool

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use sieve_core::score::derived_value;
use sieve_core::{PrimeScorer, Record, ScoreParams, Scorer};

use crate::config::Config;
use crate::input;

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// JSON file with an array of {"company", "count", "price"} records
    pub input: PathBuf,
}

fn row(record: &Record, scorer: &PrimeScorer) -> Vec<Cell> {
    let params = scorer.params();
    let derived = derived_value(record, params.divider)
        .map_or_else(|e| e.to_string(), |v| v.to_string());
    let (score, verdict) = match scorer.score(record) {
        Ok(s) if s.passes => (s.value.to_string(), Cell::new("pass").fg(Color::Green)),
        Ok(s) => (s.value.to_string(), Cell::new("fail").fg(Color::DarkGrey)),
        Err(e) => (e.to_string(), Cell::new("error").fg(Color::Red)),
    };
    vec![
        Cell::new(&record.name),
        Cell::new(record.quantity),
        Cell::new(format!("{:.2}", record.price)),
        Cell::new(derived),
        Cell::new(score),
        verdict,
    ]
}

pub fn run(args: ScoreArgs, config: &Config) -> Result<()> {
    let records = input::load_records(&args.input)?;
    let params: ScoreParams = config.scoring;
    params.validate()?;
    let scorer = PrimeScorer::new(params);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(
            ["Name", "Quantity", "Price", "Derived", "Score", "Result"]
                .map(|h| Cell::new(h).fg(Color::Cyan)),
        );
    for record in &records {
        table.add_row(row(record, &scorer));
    }

    println!("{table}");
    Ok(())
}
