//! Commitment engine: encrypt-then-hash commit, reveal and verify.
//!
//! commit:  sealed = Enc_k({value, created_at, owner}),  hash = H(sealed)
//! reveal:  check H(sealed) == stored hash, then Dec_k(sealed)
//!
//! The hash reveals nothing about the value because it is taken over random
//! AEAD output. Only the engine holding `k` can open the sealed bytes.

use super::{
    CommitmentError, CommitmentRecord, CommitmentStore, CommittedPayload, MemoryStore,
    RevealedCommitment,
};
use crate::crypto::{CommitmentHash, SecretCipher};
use chrono::Utc;
use std::fmt;
use tracing::{debug, warn};

/// Encrypts, stores, verifies and opens commitments
pub struct CommitmentEngine<S = MemoryStore> {
    cipher: SecretCipher,
    store: S,
}

impl CommitmentEngine<MemoryStore> {
    /// Engine with a fresh key and an empty in-memory store
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

impl Default for CommitmentEngine<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: CommitmentStore> CommitmentEngine<S> {
    /// Engine with a fresh key over the given store
    pub fn with_store(store: S) -> Self {
        Self {
            cipher: SecretCipher::generate(),
            store,
        }
    }

    /// Read-only view of the store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Commit `owner` to `value` and return the hash to publish.
    ///
    /// No range check happens here; that is the caller's job.
    pub fn commit(&mut self, value: i64, owner: &str) -> Result<CommitmentHash, CommitmentError> {
        if self.store.get(owner).is_some_and(CommitmentRecord::is_live) {
            return Err(CommitmentError::DuplicateCommitment(owner.to_string()));
        }

        let payload = CommittedPayload {
            value,
            created_at: Utc::now(),
            owner: owner.to_string(),
        };
        let plaintext =
            serde_json::to_vec(&payload).map_err(|e| CommitmentError::Sealing(e.to_string()))?;
        let sealed = self
            .cipher
            .seal(&plaintext)
            .map_err(|e| CommitmentError::Sealing(e.to_string()))?;

        let record = CommitmentRecord::new(owner, sealed);
        let hash = record.commitment_hash();
        self.store.insert(record)?;

        debug!(owner, hash = %hash.short(), "commitment created");
        Ok(hash)
    }

    /// Open `owner`'s commitment. Succeeds at most once per commitment.
    pub fn reveal(&mut self, owner: &str) -> Result<RevealedCommitment, CommitmentError> {
        let record = self
            .store
            .get(owner)
            .ok_or_else(|| CommitmentError::NotFound(owner.to_string()))?;
        if record.is_revealed() {
            return Err(CommitmentError::AlreadyRevealed(owner.to_string()));
        }

        let payload = self.open(record)?;
        self.store.mark_revealed(owner)?;

        debug!(owner, "commitment revealed");
        Ok(RevealedCommitment {
            value: payload.value,
            created_at: payload.created_at,
        })
    }

    /// True iff `owner` has a record whose stored hash equals `candidate`.
    /// A missing record is simply `false`.
    pub fn verify(&self, owner: &str, candidate: &CommitmentHash) -> bool {
        self.store
            .get(owner)
            .is_some_and(|record| record.commitment_hash().as_bytes() == candidate.as_bytes())
    }

    fn open(&self, record: &CommitmentRecord) -> Result<CommittedPayload, CommitmentError> {
        if !record.commitment_hash().matches(record.sealed().as_bytes()) {
            return Err(integrity_failure(record.owner(), "stored hash does not match ciphertext"));
        }

        let plaintext = self
            .cipher
            .open(record.sealed())
            .map_err(|e| integrity_failure(record.owner(), &e.to_string()))?;
        let payload: CommittedPayload = serde_json::from_slice(&plaintext)
            .map_err(|e| integrity_failure(record.owner(), &format!("malformed payload: {}", e)))?;

        if payload.owner != record.owner() {
            return Err(integrity_failure(record.owner(), "payload owner mismatch"));
        }
        Ok(payload)
    }
}

fn integrity_failure(owner: &str, reason: &str) -> CommitmentError {
    warn!(owner, reason, "commitment integrity failure");
    CommitmentError::IntegrityFailure(format!("{}: {}", owner, reason))
}

impl<S> fmt::Debug for CommitmentEngine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommitmentEngine")
            .field("cipher", &self.cipher)
            .finish_non_exhaustive()
    }
}
