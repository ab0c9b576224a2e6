//! Guess Commit Demo
//!
//! Scripted walkthrough of the commit/reveal guessing game:
//! - a full game from commitment to verified reveal
//! - the commitment engine on its own, with several owners
//! - edge cases around range checks and closed games
//!
//! Exits non-zero if any flow produces an unexpected result.

use guess_commit_core::{
    CommitmentEngine, CommitmentError, CommitmentStore, Feedback, GameError, Phase, RevealStatus,
    Session,
};
use std::process::ExitCode;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
enum DemoError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Commitment(#[from] CommitmentError),

    #[error("unexpected result: {0}")]
    Unexpected(String),
}

type DemoResult = Result<(), DemoError>;

fn ensure(condition: bool, what: impl Into<String>) -> DemoResult {
    if condition {
        Ok(())
    } else {
        Err(DemoError::Unexpected(what.into()))
    }
}

// ============================================================================
// Flows
// ============================================================================

fn demo_single_game() -> DemoResult {
    let mut session = Session::new(1, 100, 8)?;
    session.setup("Alice", "Bob")?;

    info!(">>> PHASE 1: COMMITMENT");
    let hash = session.commit_secret(42)?;
    info!(hash = %hash, "Alice committed to a secret number");

    info!(">>> PHASE 2: GUESSING");
    for guess in [50, 40, 45, 43, 41, 42] {
        let outcome = session.guess(guess)?;
        let label = outcome.feedback.map(|f| f.label()).unwrap_or("Invalid");
        info!(
            guess,
            attempt = outcome.attempt,
            remaining = outcome.remaining,
            "{label}"
        );
        if outcome.closed {
            break;
        }
    }
    ensure(session.phase() == Phase::Reveal, "game should be waiting for reveal")?;

    info!(">>> PHASE 3: REVEAL & VERIFY");
    let RevealStatus::Complete(outcome) = session.reveal_and_verify()? else {
        return Err(DemoError::Unexpected("reveal reported in progress".into()));
    };
    info!(
        secret = outcome.secret,
        commitment_valid = outcome.commitment_valid,
        winner = ?outcome.winner,
        "{}",
        outcome.summary()
    );

    ensure(outcome.secret == 42, "revealed secret should be 42")?;
    ensure(outcome.commitment_valid, "commitment should verify")?;
    ensure(outcome.winner.as_deref() == Some("Bob"), "Bob should win")?;
    ensure(outcome.found_at_position == Some(6), "secret found on guess 6")
}

fn demo_commitment_protocol() -> DemoResult {
    let mut engine = CommitmentEngine::new();

    info!("1. CREATING COMMITMENT");
    let hash_a = engine.commit(73, "Player_A")?;
    info!(owner = "Player_A", hash = %hash_a, "committed");

    info!("2. VERIFYING COMMITMENT HASH");
    let valid = engine.verify("Player_A", &hash_a);
    info!(valid, "hash verification");
    ensure(valid, "fresh commitment should verify")?;

    info!("3. REVEALING COMMITMENT");
    let revealed = engine.reveal("Player_A")?;
    info!(value = revealed.value, committed_at = %revealed.created_at, "revealed");
    ensure(revealed.value == 73, "revealed value should be 73")?;

    info!("4. MULTIPLE COMMITMENTS");
    let hash_b = engine.commit(42, "Player_B")?;
    let hash_c = engine.commit(99, "Player_C")?;
    for (owner, hash) in [("Player_A", hash_a), ("Player_B", hash_b), ("Player_C", hash_c)] {
        info!(owner, hash = %hash.short(), "stored");
    }
    ensure(engine.store().len() == 3, "three records stored")?;
    ensure(
        !engine.verify("Player_B", &hash_c),
        "a hash must not verify for another owner",
    )?;

    match engine.reveal("Player_A") {
        Err(CommitmentError::AlreadyRevealed(_)) => {
            info!("second reveal of Player_A refused");
            Ok(())
        }
        other => Err(DemoError::Unexpected(format!(
            "second reveal should be refused, got {:?}",
            other
        ))),
    }
}

fn demo_edge_cases() -> DemoResult {
    let mut session = Session::new(1, 100, 3)?;
    session.setup("Tester", "Guesser")?;
    session.commit_secret(50)?;

    info!("1. Invalid guess (too high)");
    let outcome = session.guess(150)?;
    info!(valid = outcome.valid, "guess 150");
    ensure(!outcome.valid, "150 is out of range")?;
    ensure(session.guesses_remaining() == 3, "invalid guess is free")?;

    info!("2. Valid guess");
    let outcome = session.guess(75)?;
    info!(feedback = ?outcome.feedback, "guess 75");
    ensure(outcome.feedback == Some(Feedback::Cold), "75 is cold against 50")?;

    info!("3. Correct guess");
    let outcome = session.guess(50)?;
    info!(feedback = ?outcome.feedback, closed = outcome.closed, "guess 50");
    ensure(outcome.closed, "exact guess closes the game")?;

    info!("4. Guess after game over");
    match session.guess(25) {
        Err(err @ GameError::InvalidState { .. }) => {
            info!(%err, "correctly refused");
            Ok(())
        }
        other => Err(DemoError::Unexpected(format!(
            "guess after close should fail, got {:?}",
            other
        ))),
    }
}

// ============================================================================
// Main
// ============================================================================

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("GUESS THE NUMBER: ENCRYPTED COMMIT/REVEAL");

    let flows: [(&str, fn() -> DemoResult); 3] = [
        ("single game flow", demo_single_game),
        ("commitment protocol", demo_commitment_protocol),
        ("edge cases", demo_edge_cases),
    ];

    let mut failures = 0;
    for (index, (name, flow)) in flows.iter().enumerate() {
        info!("[DEMO {} of {}] {}", index + 1, flows.len(), name);
        match flow() {
            Ok(()) => info!(demo = name, "passed"),
            Err(err) => {
                error!(demo = name, %err, "failed");
                failures += 1;
            }
        }
    }

    if failures == 0 {
        info!("ALL DEMOS COMPLETED SUCCESSFULLY");
        ExitCode::SUCCESS
    } else {
        warn!(failures, "some demos failed");
        ExitCode::FAILURE
    }
}
