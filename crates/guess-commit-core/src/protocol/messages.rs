//! Results handed across the core boundary.
//!
//! None of these carry the secret before reveal.

use crate::game::Feedback;
use crate::protocol::Phase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of one guess
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessOutcome {
    /// False when the guess was out of range and not counted
    pub valid: bool,
    pub guess: i64,
    pub feedback: Option<Feedback>,
    /// Guesses counted so far, including this one when valid
    pub attempt: usize,
    pub remaining: usize,
    /// Session stopped accepting guesses
    pub closed: bool,
}

/// Result of opening the commitment after play
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealOutcome {
    pub secret: i64,
    pub committed_at: DateTime<Utc>,
    pub commitment_valid: bool,
    pub guesses_made: usize,
    pub winner: Option<String>,
    /// 1-based position of the first guess equal to the secret
    pub found_at_position: Option<usize>,
}

impl RevealOutcome {
    /// One-line result for display
    pub fn summary(&self) -> String {
        match self.found_at_position {
            Some(position) => format!("Found in {} guesses", position),
            None => format!(
                "Not found in {} guesses. Secret was {}",
                self.guesses_made, self.secret
            ),
        }
    }
}

/// Reveal is polled; before play ends it reports progress instead of failing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RevealStatus {
    InProgress,
    Complete(RevealOutcome),
}

/// Snapshot for status queries
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub phase: Phase,
    pub guesses_made: usize,
    pub guesses_remaining: usize,
    pub closed: bool,
    /// Up to the last five guesses, oldest first
    pub recent_guesses: Vec<i64>,
}
