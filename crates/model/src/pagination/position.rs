use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a cursor currently rests. Exactly one variant is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Position {
    #[default]
    BeforeFirst,
    OnRow(u64),
    AfterLast,
}

impl Position {
    /// Current row number, or `None` on a sentinel.
    pub fn row(&self) -> Option<u64> {
        match self {
            Position::OnRow(row) => Some(*row),
            _ => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::BeforeFirst => write!(f, "before-first"),
            Position::OnRow(row) => write!(f, "row {row}"),
            Position::AfterLast => write!(f, "after-last"),
        }
    }
}

/// Direction of a boundary-crossing fetch relative to the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}
