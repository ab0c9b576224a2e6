//! Cryptographic primitives for the commit-reveal scheme.
//!
//! This module provides:
//! - CommitmentHash, the SHA-256 digest handed to the guesser
//! - SecretCipher and SealedPayload for encrypting committed values

mod cipher;
mod commitment;

pub use cipher::{CipherError, SealedPayload, SecretCipher};
pub use commitment::CommitmentHash;
