use crate::{commands::Move, error::CliError, output::MoveReport};
use clap::Parser;
use commands::Commands;
use connectors::memory::source::MemorySource;
use engine_config::settings::validated::ScrollSettings;
use engine_scroll::ScrollCursor;
use model::pagination::request::RequestId;
use std::{sync::Arc, time::Duration};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;

#[derive(Parser)]
#[command(
    name = "scroll",
    version = "0.1.0",
    about = "Scrollable cursor over a batched remote result"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Logs go to stderr so `--json` output stays parseable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            rows,
            fetch_size,
            chunk,
            latency_ms,
            config,
            json,
            moves,
        } => {
            let settings = load_settings(config.as_deref(), fetch_size).await?;

            let mut source = MemorySource::sequence(rows);
            if let Some(chunk) = chunk {
                source = source.with_chunk(chunk);
            }
            if let Some(latency_ms) = latency_ms {
                source = source.with_latency(Duration::from_millis(latency_ms));
            }

            info!(
                rows,
                fetch_size = settings.fetch_size(),
                moves = moves.len(),
                "Starting scroll run."
            );
            run(Arc::new(source), settings, &moves, json).await?;
        }
    }

    Ok(())
}

async fn load_settings(
    path: Option<&str>,
    fetch_size: Option<u32>,
) -> Result<ScrollSettings, CliError> {
    let settings = match path {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path).await?;
            ScrollSettings::from_json(&raw)?
        }
        None => ScrollSettings::default(),
    };

    match fetch_size {
        Some(fetch_size) => Ok(settings.with_fetch_size(fetch_size)?),
        None => Ok(settings),
    }
}

async fn run(
    source: Arc<MemorySource>,
    settings: ScrollSettings,
    moves: &[Move],
    as_json: bool,
) -> Result<(), CliError> {
    let mut cursor = ScrollCursor::open(source, RequestId(1), settings).await?;

    let mut reports = Vec::with_capacity(moves.len());
    for (index, action) in moves.iter().enumerate() {
        let on_row = action.apply(&mut cursor).await?;
        reports.push(MoveReport::capture(index + 1, *action, on_row, &cursor)?);
    }

    let metrics = cursor.metrics();
    cursor.close();

    if as_json {
        output::print_json(&reports, &metrics)?;
    } else {
        output::print_table(&reports, &metrics);
    }

    Ok(())
}
