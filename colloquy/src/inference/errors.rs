use thiserror::Error;

/// Failure reported by an external service (tokenizer, generator or scorer).
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("malformed output: {0}")]
    MalformedOutput(String),

    #[error("timeout after {millis}ms")]
    Timeout { millis: u64 },

    #[error("service unavailable")]
    Unavailable,

    #[error("service error: {0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
