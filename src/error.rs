use thiserror::Error;

use crate::ui::core::section::UnknownSection;

#[derive(Error, Debug)]
pub enum WhaleScopeError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Export failed: {0}")]
    ExportError(String),

    #[error("Terminal error: {0}")]
    TerminalError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(#[from] UnknownSection),
}
