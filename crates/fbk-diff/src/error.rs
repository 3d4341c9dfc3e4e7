//! Error types for the diff crate.

/// Errors that can occur when configuring the difference engine.
///
/// Diff computation itself never fails; unserializable input degrades to
/// sentinel strings instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    #[error("unknown diff format {0:?}: expected one of git, object, json")]
    UnknownFormat(String),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
