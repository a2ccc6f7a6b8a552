use std::time::Duration;
use thiserror::Error;

/// Failure of a single remote fetch call.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The transport could not deliver the request or its response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// No response arrived within the configured timeout.
    #[error("Fetch timed out after {0:?}")]
    Timeout(Duration),

    /// The remote result set (or the session owning it) is gone.
    #[error("Remote result set is closed")]
    Closed,

    /// Low-level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source error: {0}")]
    Other(String),
}

/// Errors raised while decoding column values out of a batch.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Column index {index} out of range (row has {count} columns)")]
    ColumnOutOfRange { index: usize, count: usize },

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Row {0} is not part of the batch")]
    RowNotInBatch(u64),
}
