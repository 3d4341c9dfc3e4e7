use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to submit feedback: {reason}")]
    Rejected { status: u16, reason: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("an api key is required either directly or from a parent provider")]
    MissingApiKey,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SinkResult<T> = Result<T, SinkError>;
