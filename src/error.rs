//! Error types for Klipp.

use thiserror::Error;

/// Library-level error type for Klipp operations.
#[derive(Error, Debug)]
pub enum KlippError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Video model not found: {0}")]
    ModelNotFound(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Media provider error: {0}")]
    Provider(String),

    #[error("Media API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid base64 data: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl KlippError {
    /// Whether the error was caused by the caller rather than the provider.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            KlippError::InvalidInput(_)
                | KlippError::ModelNotFound(_)
                | KlippError::UnknownTool(_)
                | KlippError::Url(_)
                | KlippError::Base64(_)
        )
    }
}

/// Result type alias for Klipp operations.
pub type Result<T> = std::result::Result<T, KlippError>;
