//! Guess Commit Core Library
//!
//! Encrypted commit/reveal for a number guessing game: the committer's
//! secret is sealed and hashed before guessing starts, then opened and
//! checked against that hash once guessing ends.

pub mod commitment;
pub mod crypto;
pub mod game;
pub mod protocol;
pub mod registry;

pub use commitment::{CommitmentEngine, CommitmentError, CommitmentStore, MemoryStore};
pub use crypto::CommitmentHash;
pub use game::{Feedback, GameError, Session};
pub use protocol::{
    GuessOutcome, GuessRange, Phase, RevealOutcome, RevealStatus, SessionId, SessionStats,
};
pub use registry::SessionRegistry;
