//! Stored commitment and its plaintext payload.

use super::CommitmentError;
use crate::crypto::{CommitmentHash, SealedPayload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Plaintext that gets sealed at commit time
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedPayload {
    pub value: i64,
    pub created_at: DateTime<Utc>,
    pub owner: String,
}

/// What a successful reveal hands back
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedCommitment {
    pub value: i64,
    pub created_at: DateTime<Utc>,
}

/// One owner's commitment.
///
/// The sealed payload and its hash are fixed at construction. The only
/// mutation is the single unrevealed -> revealed transition.
#[derive(Clone, Debug)]
pub struct CommitmentRecord {
    pub(crate) owner: String,
    pub(crate) sealed: SealedPayload,
    pub(crate) commitment_hash: CommitmentHash,
    pub(crate) revealed: bool,
}

impl CommitmentRecord {
    /// Create an unrevealed record, hashing the sealed bytes
    pub fn new(owner: impl Into<String>, sealed: SealedPayload) -> Self {
        let commitment_hash = CommitmentHash::of(sealed.as_bytes());
        Self {
            owner: owner.into(),
            sealed,
            commitment_hash,
            revealed: false,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn sealed(&self) -> &SealedPayload {
        &self.sealed
    }

    pub fn commitment_hash(&self) -> CommitmentHash {
        self.commitment_hash
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Unrevealed records block a new commit by the same owner
    pub fn is_live(&self) -> bool {
        !self.revealed
    }

    /// Flip to revealed; fails if that already happened
    pub fn mark_revealed(&mut self) -> Result<(), CommitmentError> {
        if self.revealed {
            return Err(CommitmentError::AlreadyRevealed(self.owner.clone()));
        }
        self.revealed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_hashes_sealed_bytes() {
        let sealed = SealedPayload::from_bytes(vec![1, 2, 3]);
        let record = CommitmentRecord::new("alice", sealed);

        assert!(record.commitment_hash().matches(&[1, 2, 3]));
        assert!(record.is_live());
        assert_eq!(record.owner(), "alice");
    }

    #[test]
    fn test_mark_revealed_once() {
        let mut record = CommitmentRecord::new("alice", SealedPayload::from_bytes(vec![9]));
        let hash = record.commitment_hash();

        record.mark_revealed().unwrap();
        assert!(record.is_revealed());
        assert_eq!(
            record.mark_revealed(),
            Err(CommitmentError::AlreadyRevealed("alice".to_string()))
        );
        assert_eq!(record.commitment_hash(), hash);
    }
}
