use thiserror::Error;

/// Errors from commitment operations
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CommitmentError {
    #[error("Live commitment already exists for {0}")]
    DuplicateCommitment(String),

    #[error("No commitment found for {0}")]
    NotFound(String),

    #[error("Commitment for {0} already revealed")]
    AlreadyRevealed(String),

    #[error("Could not seal commitment: {0}")]
    Sealing(String),

    /// Stored data disagrees with what this engine produced. Never expected
    /// under correct use; callers must treat it as fatal.
    #[error("Commitment integrity failure: {0}")]
    IntegrityFailure(String),
}
