use connectors::error::{CodecError, SourceError};
use thiserror::Error;

/// Failures of a cursor call.
///
/// Moving to a row that does not exist is not an error: navigation returns
/// `Ok(false)` and parks the cursor on a sentinel.
#[derive(Debug, Error)]
pub enum CursorError {
    /// The caller broke a precondition; cursor state is unchanged.
    #[error("Usage error: {0}")]
    Usage(String),

    /// The remote call failed. Window and position are exactly as before the
    /// call, so the same navigation call can be retried.
    #[error("Fetch of rows {begin}..={end} failed: {source}")]
    FetchFailed {
        begin: u64,
        end: u64,
        #[source]
        source: SourceError,
    },

    /// The remote engine answered outside its contract. Fatal for the cursor.
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// Any call made after a protocol violation.
    #[error("Cursor is unusable after a protocol violation: {0}")]
    Broken(String),

    #[error("Cursor is closed")]
    Closed,

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

impl CursorError {
    /// Whether retrying the same call may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CursorError::FetchFailed { .. })
    }
}
