/// Errors produced when parsing foundation types from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    /// The string is not a known vote.
    #[error("invalid vote {0:?}: expected \"upvote\" or \"downvote\"")]
    InvalidVote(String),

    /// The string is not a known feedback source.
    #[error("invalid feedback source {0:?}: expected \"IMPLICIT\" or \"EXPLICIT\"")]
    InvalidSource(String),
}
