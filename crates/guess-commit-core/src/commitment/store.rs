//! Commitment storage keyed by owner.

use super::{CommitmentError, CommitmentRecord};
use std::collections::HashMap;

/// Owner -> at most one live commitment
pub trait CommitmentStore {
    /// Look up an owner's record
    fn get(&self, owner: &str) -> Option<&CommitmentRecord>;

    /// Store a record. Replaces a revealed record for the same owner,
    /// rejects if a live one exists.
    fn insert(&mut self, record: CommitmentRecord) -> Result<(), CommitmentError>;

    /// Mark an owner's record revealed
    fn mark_revealed(&mut self, owner: &str) -> Result<(), CommitmentError>;

    /// Number of records, revealed or not
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory store
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    records: HashMap<String, CommitmentRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommitmentStore for MemoryStore {
    fn get(&self, owner: &str) -> Option<&CommitmentRecord> {
        self.records.get(owner)
    }

    fn insert(&mut self, record: CommitmentRecord) -> Result<(), CommitmentError> {
        if self.records.get(record.owner()).is_some_and(CommitmentRecord::is_live) {
            return Err(CommitmentError::DuplicateCommitment(record.owner));
        }
        self.records.insert(record.owner.clone(), record);
        Ok(())
    }

    fn mark_revealed(&mut self, owner: &str) -> Result<(), CommitmentError> {
        self.records
            .get_mut(owner)
            .ok_or_else(|| CommitmentError::NotFound(owner.to_string()))?
            .mark_revealed()
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SealedPayload;

    fn record(owner: &str, byte: u8) -> CommitmentRecord {
        CommitmentRecord::new(owner, SealedPayload::from_bytes(vec![byte; 4]))
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = MemoryStore::new();
        store.insert(record("alice", 1)).unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.get("alice").is_some());
        assert!(store.get("bob").is_none());
    }

    #[test]
    fn test_live_record_blocks_insert() {
        let mut store = MemoryStore::new();
        store.insert(record("alice", 1)).unwrap();

        assert_eq!(
            store.insert(record("alice", 2)),
            Err(CommitmentError::DuplicateCommitment("alice".to_string()))
        );
        assert!(store.get("alice").unwrap().sealed().as_bytes().iter().all(|b| *b == 1));
    }

    #[test]
    fn test_revealed_record_can_be_replaced() {
        let mut store = MemoryStore::new();
        store.insert(record("alice", 1)).unwrap();
        store.mark_revealed("alice").unwrap();

        store.insert(record("alice", 2)).unwrap();
        assert!(store.get("alice").unwrap().is_live());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_mark_revealed_errors() {
        let mut store = MemoryStore::new();
        assert_eq!(
            store.mark_revealed("ghost"),
            Err(CommitmentError::NotFound("ghost".to_string()))
        );

        store.insert(record("alice", 1)).unwrap();
        store.mark_revealed("alice").unwrap();
        assert_eq!(
            store.mark_revealed("alice"),
            Err(CommitmentError::AlreadyRevealed("alice".to_string()))
        );
    }
}
