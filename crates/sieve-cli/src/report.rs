//! Text report: filtered results, failures, then the raw input

use comfy_table::{
    Cell, CellAlignment, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
};
use sieve_core::{Record, RecordFailure};

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(header.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    table
}

fn num(value: impl ToString) -> Cell {
    Cell::new(value.to_string()).set_alignment(CellAlignment::Right)
}

/// Passing records in the order given (ascending score).
pub fn results_table(results: &[Record]) -> Table {
    let mut t = table(&["Name", "Quantity", "Price", "Score"]);
    for r in results {
        t.add_row(vec![
            Cell::new(&r.name),
            num(r.quantity),
            num(format!("{:.2}", r.price)),
            num(r.score.map_or_else(|| "-".to_string(), |s| s.to_string())),
        ]);
    }
    t
}

pub fn input_table(input: &[Record]) -> Table {
    let mut t = table(&["Name", "Quantity", "Price"]);
    for r in input {
        t.add_row(vec![
            Cell::new(&r.name),
            num(r.quantity),
            num(format!("{:.2}", r.price)),
        ]);
    }
    t
}

pub fn failures_table(failures: &[RecordFailure]) -> Table {
    let mut t = table(&["Name", "Reason"]);
    for f in failures {
        t.add_row(vec![Cell::new(&f.record.name), Cell::new(f.reason.to_string())]);
    }
    t
}

/// Full report as printed to stdout or written with `--output`.
pub fn render(
    results: &[Record],
    failures: &[RecordFailure],
    input: Option<&[Record]>,
) -> String {
    let mut out = format!("Results ({} records)\n{}\n", results.len(), results_table(results));
    if !failures.is_empty() {
        out.push_str(&format!(
            "\nFailures ({})\n{}\n",
            failures.len(),
            failures_table(failures)
        ));
    }
    if let Some(input) = input {
        out.push_str(&format!(
            "\nInput ({} records)\n{}\n",
            input.len(),
            input_table(input)
        ));
    }
    out
}
