//! Error types shared across Retrocast crates.

use std::path::PathBuf;

/// Top-level error type for Retrocast operations.
#[derive(Debug, thiserror::Error)]
pub enum RetrocastError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Fetch error: {message}")]
    Fetch { message: String },

    #[error("Provider returned HTTP {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Encode error: {message}")]
    Encode { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Forecast(#[from] retrocast_forecast_model::ForecastError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using RetrocastError.
pub type RetrocastResult<T> = Result<T, RetrocastError>;

impl RetrocastError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch {
            message: msg.into(),
        }
    }

    pub fn provider(status: u16, msg: impl Into<String>) -> Self {
        Self::Provider {
            status,
            message: msg.into(),
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Configuration problems abort the whole run; everything else only
    /// fails the location being processed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}
