use crate::pagination::position::Direction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the remote result set a cursor reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An inclusive row range sent to the remote engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub direction: Direction,
    pub begin_row: u64,
    pub end_row: u64,
}

impl FetchRequest {
    pub fn forward(begin_row: u64, end_row: u64) -> Self {
        FetchRequest {
            direction: Direction::Forward,
            begin_row,
            end_row,
        }
    }

    pub fn backward(begin_row: u64, end_row: u64) -> Self {
        FetchRequest {
            direction: Direction::Backward,
            begin_row,
            end_row,
        }
    }

    pub fn len(&self) -> u64 {
        self.end_row.saturating_sub(self.begin_row) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end_row < self.begin_row
    }

    /// Whether a batch answering `self` also answers `other`.
    pub fn covers(&self, other: &FetchRequest) -> bool {
        self.begin_row <= other.begin_row && other.end_row <= self.end_row
    }

    pub fn overlaps(&self, begin_row: u64, end_row: u64) -> bool {
        begin_row <= self.end_row && self.begin_row <= end_row
    }
}

impl fmt::Display for FetchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}, {}]", self.direction, self.begin_row, self.end_row)
    }
}
