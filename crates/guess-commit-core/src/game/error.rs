use crate::commitment::CommitmentError;
use crate::protocol::{Phase, SessionId};
use thiserror::Error;

/// Errors from session and registry operations
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Cannot {operation} while session is in {phase} phase")]
    InvalidState {
        operation: &'static str,
        phase: Phase,
    },

    #[error("Value {value} is outside [{min}, {max}]")]
    OutOfRange { value: i64, min: i64, max: i64 },

    #[error("Invalid session config: {0}")]
    InvalidConfig(String),

    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error(transparent)]
    Commitment(#[from] CommitmentError),
}

impl GameError {
    /// Integrity failures are fatal and must never be retried or hidden
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            GameError::Commitment(CommitmentError::IntegrityFailure(_))
        )
    }
}
