use crate::{commands::Move, error::CliError};
use engine_core::metrics::FetchMetricsSnapshot;
use engine_scroll::ScrollCursor;
use serde::Serialize;

/// State of the cursor right after one move.
#[derive(Debug, Serialize)]
pub struct MoveReport {
    pub step: usize,
    #[serde(rename = "move")]
    pub action: String,
    pub on_row: bool,
    pub position: String,
    pub row: u64,
    pub values: Vec<String>,
}

impl MoveReport {
    pub fn capture(
        step: usize,
        action: Move,
        on_row: bool,
        cursor: &ScrollCursor,
    ) -> Result<Self, CliError> {
        let values = if on_row {
            cursor
                .current_row()?
                .iter()
                .map(|value| value.to_string())
                .collect()
        } else {
            Vec::new()
        };

        Ok(MoveReport {
            step,
            action: action.to_string(),
            on_row,
            position: cursor.position().to_string(),
            row: cursor.row(),
            values,
        })
    }
}

#[derive(Serialize)]
struct RunReport<'a> {
    moves: &'a [MoveReport],
    metrics: &'a FetchMetricsSnapshot,
}

pub fn print_json(moves: &[MoveReport], metrics: &FetchMetricsSnapshot) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(&RunReport { moves, metrics })?;
    println!("{json}");
    Ok(())
}

pub fn print_table(moves: &[MoveReport], metrics: &FetchMetricsSnapshot) {
    println!("{:<6} {:<10} {:<14} {}", "Step", "Move", "Position", "Values");
    println!("---------------------------------------------");
    for report in moves {
        println!(
            "{:<6} {:<10} {:<14} {}",
            report.step,
            report.action,
            report.position,
            report.values.join(", ")
        );
    }

    println!();
    println!("{:<18} {}", "Fetches", metrics.fetches);
    println!("{:<18} {}", "Prefetches", metrics.prefetches);
    println!("{:<18} {}", "Prefetch hits", metrics.prefetch_hits);
    println!("{:<18} {}", "Prefetch discards", metrics.prefetch_discards);
    println!("{:<18} {}", "Rows fetched", metrics.rows_fetched);
    println!("{:<18} {}", "Failures", metrics.failures);
    println!("{:<18} {}", "Retries", metrics.retries);
}
