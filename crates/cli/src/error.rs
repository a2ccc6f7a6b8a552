use engine_config::settings::error::SettingsError;
use engine_scroll::error::CursorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read the settings file: {0}")]
    ConfigFileRead(#[from] std::io::Error),

    #[error("Invalid settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("Cursor error: {0}")]
    Cursor(#[from] CursorError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}
