use thiserror::Error;

/// Top-level error type for the SnapSolve runtime.
#[derive(Debug, Error)]
pub enum SnapError {
    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("LLM provider error ({provider}): {message}")]
    ProviderError { provider: String, message: String },

    #[error("failed to recognize equation from image")]
    EmptyRecognition,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
