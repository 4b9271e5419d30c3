//! Error types for the provider module

use thiserror::Error;

/// Provider error types
#[derive(Error, Debug)]
pub enum AiError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("{provider} returned HTTP {status}: {message}")]
    LlmHttp {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("Malformed stream event: {0}")]
    InvalidFormat(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AiError {
    /// HTTP status reported by the provider, if the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            AiError::LlmHttp { status, .. } => Some(*status),
            AiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for provider operations
pub type Result<T> = std::result::Result<T, AiError>;
