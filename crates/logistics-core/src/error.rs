//! Error types for the logistics system

use thiserror::Error;

/// Main error type for all logistics operations
#[derive(Error, Debug)]
pub enum LogisticsError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("PDF rendering failed: {0}")]
    Render(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),
}

impl LogisticsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<logistics_types::ParseChoiceError> for LogisticsError {
    fn from(err: logistics_types::ParseChoiceError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Result type for logistics operations
pub type Result<T> = std::result::Result<T, LogisticsError>;
