//! Import pipeline errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImportError>;

#[derive(Error, Debug)]
pub enum ImportError {
    /// CSV tokenization failed (wraps csv::Error)
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// No usable schema detected; fatal, nothing is written
    #[error("CSV schema error: {0}")]
    Schema(String),

    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// JSON encoding of a style list failed
    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),
}
