use crate::settings::{error::SettingsError, mode::CursorMode};
use engine_core::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_FETCH_SIZE: u32 = 1000;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 200;
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 5000;

/// Immutable, validated configuration of one scrollable cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollSettings {
    /// Rows requested per remote fetch
    pub fetch_size: u32,
    /// Intended movement pattern (hint only)
    pub cursor_mode: CursorMode,
    /// Whether to fetch the next forward range ahead of need
    pub prefetch: bool,
    /// Per-call timeout in milliseconds; unset leaves timeouts to the transport
    pub fetch_timeout_ms: Option<u64>,
    /// Attempts per remote call for retryable failures
    pub max_fetch_attempts: usize,
    /// Initial backoff between attempts
    pub retry_base_delay_ms: u64,
    /// Upper bound of the backoff
    pub retry_max_delay_ms: u64,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            fetch_size: DEFAULT_FETCH_SIZE,
            cursor_mode: CursorMode::Scrollable,
            prefetch: true,
            fetch_timeout_ms: None,
            max_fetch_attempts: 1,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            retry_max_delay_ms: DEFAULT_RETRY_MAX_DELAY_MS,
        }
    }
}

impl ScrollSettings {
    pub fn from_builder(builder: ScrollSettingsBuilder) -> Self {
        let defaults = ScrollSettings::default();
        Self {
            fetch_size: builder.fetch_size.unwrap_or(defaults.fetch_size),
            cursor_mode: builder.cursor_mode.unwrap_or(defaults.cursor_mode),
            prefetch: builder.prefetch.unwrap_or(defaults.prefetch),
            fetch_timeout_ms: builder.fetch_timeout_ms.or(defaults.fetch_timeout_ms),
            max_fetch_attempts: builder
                .max_fetch_attempts
                .unwrap_or(defaults.max_fetch_attempts),
            retry_base_delay_ms: builder
                .retry_base_delay_ms
                .unwrap_or(defaults.retry_base_delay_ms),
            retry_max_delay_ms: builder
                .retry_max_delay_ms
                .unwrap_or(defaults.retry_max_delay_ms),
        }
    }

    /// Parses a JSON settings document; missing keys fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: ScrollSettings = serde_json::from_str(json)?;
        let settings = settings.validate()?;
        debug!(
            fetch_size = settings.fetch_size,
            cursor_mode = %settings.cursor_mode,
            prefetch = settings.prefetch,
            "Loaded scroll settings."
        );
        Ok(settings)
    }

    /// Same settings with another fetch size, validated again.
    pub fn with_fetch_size(mut self, fetch_size: u32) -> Result<Self, SettingsError> {
        self.fetch_size = fetch_size;
        self.validate()
    }

    pub fn validate(self) -> Result<Self, SettingsError> {
        if self.fetch_size == 0 {
            return Err(SettingsError::InvalidFetchSize(self.fetch_size));
        }
        if self.max_fetch_attempts == 0 {
            return Err(SettingsError::InvalidRetry(
                "max_fetch_attempts must be at least 1".to_string(),
            ));
        }
        if self.retry_max_delay_ms != 0 && self.retry_max_delay_ms < self.retry_base_delay_ms {
            return Err(SettingsError::InvalidRetry(format!(
                "retry_max_delay_ms ({}) is below retry_base_delay_ms ({})",
                self.retry_max_delay_ms, self.retry_base_delay_ms
            )));
        }
        if self.fetch_timeout_ms == Some(0) {
            return Err(SettingsError::InvalidTimeout);
        }
        Ok(self)
    }

    pub fn fetch_size(&self) -> u32 {
        self.fetch_size
    }

    pub fn cursor_mode(&self) -> CursorMode {
        self.cursor_mode
    }

    pub fn prefetch_enabled(&self) -> bool {
        self.prefetch
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_fetch_attempts,
            Duration::from_millis(self.retry_base_delay_ms),
            Duration::from_millis(self.retry_max_delay_ms),
        )
    }
}

#[derive(Debug, Default)]
pub struct ScrollSettingsBuilder {
    pub fetch_size: Option<u32>,
    pub cursor_mode: Option<CursorMode>,
    pub prefetch: Option<bool>,
    pub fetch_timeout_ms: Option<u64>,
    pub max_fetch_attempts: Option<usize>,
    pub retry_base_delay_ms: Option<u64>,
    pub retry_max_delay_ms: Option<u64>,
}

impl ScrollSettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetch_size(mut self, fetch_size: u32) -> Self {
        self.fetch_size = Some(fetch_size);
        self
    }

    pub fn cursor_mode(mut self, cursor_mode: CursorMode) -> Self {
        self.cursor_mode = Some(cursor_mode);
        self
    }

    pub fn prefetch(mut self, prefetch: bool) -> Self {
        self.prefetch = Some(prefetch);
        self
    }

    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn retry(mut self, max_attempts: usize, base_delay: Duration, max_delay: Duration) -> Self {
        self.max_fetch_attempts = Some(max_attempts);
        self.retry_base_delay_ms = Some(base_delay.as_millis() as u64);
        self.retry_max_delay_ms = Some(max_delay.as_millis() as u64);
        self
    }

    pub fn build(self) -> Result<ScrollSettings, SettingsError> {
        ScrollSettings::from_builder(self).validate()
    }
}
