use clap::Subcommand;
use engine_scroll::{ScrollCursor, error::CursorError};
use std::{fmt, str::FromStr};

#[derive(Subcommand)]
pub enum Commands {
    /// Scroll a synthetic result of `rows` rows through a sequence of moves
    Run {
        #[arg(long, help = "Number of rows in the result")]
        rows: u64,

        #[arg(long, help = "Rows requested per fetch (overrides the settings file)")]
        fetch_size: Option<u32>,

        #[arg(long, help = "Largest batch the simulated server answers with")]
        chunk: Option<usize>,

        #[arg(long, help = "Simulated latency of every remote call, in milliseconds")]
        latency_ms: Option<u64>,

        #[arg(long, help = "JSON settings file")]
        config: Option<String>,

        #[arg(long, help = "Print the moves and metrics as JSON")]
        json: bool,

        /// next, prev, first, last, before, after, abs:N, rel:N
        #[arg(required = true, allow_hyphen_values = true)]
        moves: Vec<Move>,
    },
}

/// One navigation call of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Next,
    Previous,
    First,
    Last,
    BeforeFirst,
    AfterLast,
    Absolute(i64),
    Relative(i64),
}

impl Move {
    /// Applies the move; the result is whether the cursor landed on a row.
    pub async fn apply(self, cursor: &mut ScrollCursor) -> Result<bool, CursorError> {
        match self {
            Move::Next => cursor.next().await,
            Move::Previous => cursor.previous().await,
            Move::First => cursor.first().await,
            Move::Last => cursor.last().await,
            Move::BeforeFirst => cursor.before_first().map(|_| false),
            Move::AfterLast => cursor.after_last().map(|_| false),
            Move::Absolute(n) => cursor.absolute(n).await,
            Move::Relative(n) => cursor.relative(n).await,
        }
    }
}

impl FromStr for Move {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let offset = |raw: &str| {
            raw.parse::<i64>()
                .map_err(|_| format!("Invalid row offset in move '{s}'"))
        };

        match lower.split_once(':') {
            Some(("abs" | "absolute", n)) => Ok(Move::Absolute(offset(n)?)),
            Some(("rel" | "relative", n)) => Ok(Move::Relative(offset(n)?)),
            Some(_) => Err(format!("Unknown move: {s}")),
            None => match lower.as_str() {
                "next" => Ok(Move::Next),
                "prev" | "previous" => Ok(Move::Previous),
                "first" => Ok(Move::First),
                "last" => Ok(Move::Last),
                "before" | "before_first" => Ok(Move::BeforeFirst),
                "after" | "after_last" => Ok(Move::AfterLast),
                _ => Err(format!("Unknown move: {s}")),
            },
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Next => write!(f, "next"),
            Move::Previous => write!(f, "prev"),
            Move::First => write!(f, "first"),
            Move::Last => write!(f, "last"),
            Move::BeforeFirst => write!(f, "before"),
            Move::AfterLast => write!(f, "after"),
            Move::Absolute(n) => write!(f, "abs:{n}"),
            Move::Relative(n) => write!(f, "rel:{n}"),
        }
    }
}
