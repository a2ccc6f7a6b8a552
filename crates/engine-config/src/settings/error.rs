use thiserror::Error;

/// Errors raised when loading or validating cursor settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The fetch size must request at least one row.
    #[error("Invalid fetch size: {0} (must be at least 1)")]
    InvalidFetchSize(u32),

    /// Retry attempts or delays are inconsistent.
    #[error("Invalid retry settings: {0}")]
    InvalidRetry(String),

    /// A zero timeout would fail every call.
    #[error("Invalid fetch timeout: must be greater than zero")]
    InvalidTimeout,

    /// The settings document could not be parsed.
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}
