use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// How the application intends to move the cursor.
///
/// This is only a hint: a forward-only cursor still answers backward moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CursorMode {
    ForwardOnly,
    #[default]
    Scrollable,
}

impl fmt::Display for CursorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorMode::ForwardOnly => write!(f, "forward_only"),
            CursorMode::Scrollable => write!(f, "scrollable"),
        }
    }
}

impl FromStr for CursorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "forward_only" | "forward" => Ok(CursorMode::ForwardOnly),
            "scrollable" | "scroll" => Ok(CursorMode::Scrollable),
            other => Err(format!("Unknown cursor mode: {other}")),
        }
    }
}
