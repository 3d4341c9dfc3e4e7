use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    /// Trackers schedule their debounce timers on the ambient tokio runtime.
    #[error("no tokio runtime is running; trackers must be created inside one")]
    NoRuntime,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TrackerResult<T> = Result<T, TrackerError>;
