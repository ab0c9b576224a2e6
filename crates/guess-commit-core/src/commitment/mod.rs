//! Commitment storage and the engine that produces and opens commitments.

mod engine;
mod error;
mod record;
mod store;

pub use engine::CommitmentEngine;
pub use error::CommitmentError;
pub use record::{CommitmentRecord, CommittedPayload, RevealedCommitment};
pub use store::{CommitmentStore, MemoryStore};
