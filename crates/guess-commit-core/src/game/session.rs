//! Guessing session: setup -> committing -> guessing -> reveal -> closed.
//!
//! Each phase variant carries only the data that exists in that phase, so
//! the secret cannot be read before commit and the commitment hash cannot be
//! missing once guessing starts.

use super::{Feedback, GameError};
use crate::commitment::{CommitmentEngine, CommitmentError};
use crate::crypto::CommitmentHash;
use crate::protocol::{GuessOutcome, GuessRange, Phase, RevealOutcome, RevealStatus, SessionStats};
use std::fmt;
use std::mem;
use std::time::Instant;
use tracing::{debug, info};

/// How many trailing guesses `stats` reports
const RECENT_GUESSES: usize = 5;

#[derive(Clone, Debug)]
struct Players {
    committer: String,
    guesser: String,
}

enum State {
    Setup,
    Committing {
        players: Players,
    },
    Guessing {
        players: Players,
        commitment: CommitmentHash,
        secret: i64,
    },
    Reveal {
        players: Players,
        commitment: CommitmentHash,
        secret: i64,
        winner: Option<String>,
    },
    Closed {
        players: Option<Players>,
        commitment: Option<CommitmentHash>,
        winner: Option<String>,
        /// `None` when the session was expired instead of revealed
        outcome: Option<RevealOutcome>,
    },
}

impl State {
    fn phase(&self) -> Phase {
        match self {
            State::Setup => Phase::Setup,
            State::Committing { .. } => Phase::Committing,
            State::Guessing { .. } => Phase::Guessing,
            State::Reveal { .. } => Phase::Reveal,
            State::Closed { .. } => Phase::Closed,
        }
    }

    fn players(&self) -> Option<&Players> {
        match self {
            State::Setup => None,
            State::Committing { players }
            | State::Guessing { players, .. }
            | State::Reveal { players, .. } => Some(players),
            State::Closed { players, .. } => players.as_ref(),
        }
    }

    fn commitment(&self) -> Option<CommitmentHash> {
        match self {
            State::Setup | State::Committing { .. } => None,
            State::Guessing { commitment, .. } | State::Reveal { commitment, .. } => {
                Some(*commitment)
            }
            State::Closed { commitment, .. } => *commitment,
        }
    }
}

/// One committer, one guesser, one commitment, a bounded number of guesses
pub struct Session {
    range: GuessRange,
    guess_budget: u32,
    state: State,
    guess_log: Vec<i64>,
    engine: CommitmentEngine,
    created_at: Instant,
}

impl Session {
    /// New session in the setup phase
    pub fn new(min: i64, max: i64, guess_budget: u32) -> Result<Self, GameError> {
        let range = GuessRange::new(min, max)?;
        if guess_budget == 0 {
            return Err(GameError::InvalidConfig(
                "guess budget must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            range,
            guess_budget,
            state: State::Setup,
            guess_log: Vec::new(),
            engine: CommitmentEngine::new(),
            created_at: Instant::now(),
        })
    }

    /// Assign the two players
    pub fn setup(
        &mut self,
        committer: impl Into<String>,
        guesser: impl Into<String>,
    ) -> Result<(), GameError> {
        if !matches!(self.state, State::Setup) {
            return Err(self.invalid_state("set up players"));
        }

        self.state = State::Committing {
            players: Players {
                committer: committer.into(),
                guesser: guesser.into(),
            },
        };
        Ok(())
    }

    /// Commit the committer to `value` and return the hash to show the guesser
    pub fn commit_secret(&mut self, value: i64) -> Result<CommitmentHash, GameError> {
        let State::Committing { players } = &self.state else {
            return Err(self.invalid_state("commit"));
        };
        self.range.check(value)?;

        let commitment = self.engine.commit(value, &players.committer)?;
        debug!(committer = %players.committer, hash = %commitment.short(), "secret committed");

        self.advance(|state| match state {
            State::Committing { players } => State::Guessing {
                players,
                commitment,
                secret: value,
            },
            other => other,
        });
        Ok(commitment)
    }

    /// Score a guess. Out-of-range guesses come back with `valid = false`
    /// and cost nothing.
    pub fn guess(&mut self, candidate: i64) -> Result<GuessOutcome, GameError> {
        let State::Guessing { secret, .. } = &self.state else {
            return Err(self.invalid_state("guess"));
        };
        let secret = *secret;

        if !self.range.contains(candidate) {
            debug!(candidate, range = %self.range, "guess out of range");
            return Ok(GuessOutcome {
                valid: false,
                guess: candidate,
                feedback: None,
                attempt: self.guess_log.len(),
                remaining: self.guesses_remaining(),
                closed: false,
            });
        }

        self.guess_log.push(candidate);
        let feedback = Feedback::for_guess(candidate, secret);
        let attempt = self.guess_log.len();
        let remaining = self.guesses_remaining();
        debug!(attempt, remaining, ?feedback, "guess scored");

        let closed = feedback.is_exact() || remaining == 0;
        if closed {
            self.advance(|state| match state {
                State::Guessing {
                    players,
                    commitment,
                    secret,
                } => {
                    let winner = feedback.is_exact().then(|| players.guesser.clone());
                    State::Reveal {
                        players,
                        commitment,
                        secret,
                        winner,
                    }
                }
                other => other,
            });
            info!(attempt, winner = ?self.winner(), "guessing closed");
        }

        Ok(GuessOutcome {
            valid: true,
            guess: candidate,
            feedback: Some(feedback),
            attempt,
            remaining,
            closed,
        })
    }

    /// Open the commitment and check it against the hash issued at commit.
    ///
    /// Before guessing closes this reports `InProgress`. A session reveals
    /// once; afterwards it is `InvalidState`.
    pub fn reveal_and_verify(&mut self) -> Result<RevealStatus, GameError> {
        let (players, commitment, secret, winner) = match &self.state {
            State::Setup | State::Committing { .. } | State::Guessing { .. } => {
                return Ok(RevealStatus::InProgress)
            }
            State::Reveal {
                players,
                commitment,
                secret,
                winner,
            } => (players, *commitment, *secret, winner),
            State::Closed { .. } => return Err(self.invalid_state("reveal")),
        };

        let revealed = self.engine.reveal(&players.committer)?;
        if revealed.value != secret {
            let err = CommitmentError::IntegrityFailure(format!(
                "{}: revealed value differs from committed secret",
                players.committer
            ));
            // The record is already spent, so the session cannot be revealed again
            self.close_without_outcome();
            return Err(err.into());
        }
        let commitment_valid = self.engine.verify(&players.committer, &commitment);

        let found_at_position = self
            .guess_log
            .iter()
            .position(|guess| *guess == revealed.value)
            .map(|index| index + 1);

        let outcome = RevealOutcome {
            secret: revealed.value,
            committed_at: revealed.created_at,
            commitment_valid,
            guesses_made: self.guess_log.len(),
            winner: winner.clone(),
            found_at_position,
        };

        info!(
            committer = %players.committer,
            commitment_valid,
            guesses_made = outcome.guesses_made,
            "commitment revealed"
        );

        self.advance(|state| match state {
            State::Reveal {
                players,
                commitment,
                winner,
                ..
            } => State::Closed {
                players: Some(players),
                commitment: Some(commitment),
                winner,
                outcome: Some(outcome.clone()),
            },
            other => other,
        });
        Ok(RevealStatus::Complete(outcome))
    }

    /// Force the session closed without a reveal. Used by expiry policies.
    pub fn expire(&mut self) {
        if self.is_expired_or_revealed() {
            return;
        }
        let phase = self.phase();
        self.close_without_outcome();
        info!(from = %phase, "session expired");
    }

    /// Status snapshot; never includes the secret
    pub fn stats(&self) -> SessionStats {
        let start = self.guess_log.len().saturating_sub(RECENT_GUESSES);
        SessionStats {
            phase: self.phase(),
            guesses_made: self.guess_log.len(),
            guesses_remaining: self.guesses_remaining(),
            closed: self.is_closed(),
            recent_guesses: self.guess_log[start..].to_vec(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// True once guessing has stopped, whatever the reason
    pub fn is_closed(&self) -> bool {
        self.phase() >= Phase::Reveal
    }

    pub fn range(&self) -> GuessRange {
        self.range
    }

    pub fn guess_budget(&self) -> u32 {
        self.guess_budget
    }

    pub fn guesses_remaining(&self) -> usize {
        (self.guess_budget as usize).saturating_sub(self.guess_log.len())
    }

    pub fn guess_log(&self) -> &[i64] {
        &self.guess_log
    }

    /// Hash issued at commit time, if a commit happened
    pub fn commitment_hash(&self) -> Option<CommitmentHash> {
        self.state.commitment()
    }

    pub fn committer(&self) -> Option<&str> {
        self.state.players().map(|p| p.committer.as_str())
    }

    pub fn guesser(&self) -> Option<&str> {
        self.state.players().map(|p| p.guesser.as_str())
    }

    pub fn winner(&self) -> Option<&str> {
        match &self.state {
            State::Reveal { winner, .. } | State::Closed { winner, .. } => winner.as_deref(),
            _ => None,
        }
    }

    /// Outcome of a completed reveal
    pub fn reveal_outcome(&self) -> Option<&RevealOutcome> {
        match &self.state {
            State::Closed { outcome, .. } => outcome.as_ref(),
            _ => None,
        }
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    fn is_expired_or_revealed(&self) -> bool {
        matches!(self.state, State::Closed { .. })
    }

    fn close_without_outcome(&mut self) {
        self.advance(|state| {
            let commitment = state.commitment();
            match state {
                State::Reveal {
                    players, winner, ..
                } => State::Closed {
                    players: Some(players),
                    commitment,
                    winner,
                    outcome: None,
                },
                other => State::Closed {
                    players: other.players().cloned(),
                    commitment,
                    winner: None,
                    outcome: None,
                },
            }
        });
    }

    fn advance(&mut self, next: impl FnOnce(State) -> State) {
        let current = mem::replace(&mut self.state, State::Setup);
        self.state = next(current);
    }

    fn invalid_state(&self, operation: &'static str) -> GameError {
        GameError::InvalidState {
            operation,
            phase: self.phase(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("range", &self.range)
            .field("guess_budget", &self.guess_budget)
            .field("phase", &self.phase())
            .field("commitment", &self.commitment_hash())
            .field("guesses_made", &self.guess_log.len())
            .finish_non_exhaustive()
    }
}
