//! Error types for mana analysis

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Caller passed data no real deck can have (non-positive quantity, empty library, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
