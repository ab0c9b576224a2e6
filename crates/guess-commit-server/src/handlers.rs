//! HTTP API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use guess_commit_core::{CommitmentHash, Feedback, GameError, Phase, RevealStatus, SessionId};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::state::AppState;

// ============ Error type ============

/// Handler error rendered as `{success: false, error}`
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<GameError> for AppError {
    fn from(err: GameError) -> Self {
        let status = match &err {
            GameError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            e if e.is_integrity_failure() => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(%err, "commitment integrity failure");
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({"success": false, "error": self.message})),
        )
            .into_response()
    }
}

// ============ Request/Response types ============

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Human guesses against the computer
    #[default]
    Single,
    /// Two people at one screen; any unrecognised mode lands here
    #[serde(other)]
    Two,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateGameRequest {
    pub mode: GameMode,
    pub player1: Option<String>,
    pub player2: Option<String>,
}

#[derive(Serialize)]
pub struct CreateGameResponse {
    pub success: bool,
    pub game_id: SessionId,
    pub mode: GameMode,
    pub player1: String,
    pub player2: String,
    pub min: i64,
    pub max: i64,
    pub max_guesses: u32,
}

#[derive(Serialize)]
pub struct CommitResponse {
    pub success: bool,
    pub commitment_hash: CommitmentHash,
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct GuessResponse {
    pub success: bool,
    pub guess: i64,
    pub feedback: Option<Feedback>,
    pub feedback_label: Option<&'static str>,
    pub attempt: usize,
    pub remaining: usize,
    pub game_over: bool,
}

#[derive(Serialize)]
pub struct RevealResponse {
    pub success: bool,
    pub status: &'static str,
    pub secret_number: i64,
    pub commitment_valid: bool,
    pub guesses_made: usize,
    pub result: String,
    pub game_winner: Option<String>,
    pub found_at_position: Option<usize>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub phase: Phase,
    pub guesses_made: usize,
    pub guesses_remaining: usize,
    pub game_over: bool,
    pub recent_guesses: Vec<i64>,
}

/// Integer field from a loosely typed body; anything else is user noise
fn integer_field(body: &Value, field: &str) -> Option<i64> {
    body.get(field).and_then(Value::as_i64)
}

fn ensure_exists(state: &AppState, game_id: SessionId) -> Result<(), AppError> {
    if state.registry().contains(game_id) {
        Ok(())
    } else {
        Err(GameError::SessionNotFound(game_id).into())
    }
}

// ============ Handlers ============

pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok", "message": "Game API is running"}))
}

pub async fn create_game(
    State(state): State<AppState>,
    Json(req): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<CreateGameResponse>), AppError> {
    let player1 = req.player1.unwrap_or_else(|| "Player 1".to_string());
    let player2 = req.player2.unwrap_or_else(|| match req.mode {
        GameMode::Single => "Computer".to_string(),
        GameMode::Two => "Player 2".to_string(),
    });

    let config = state.config();
    let registry = state.registry();
    let game_id = registry.create_session(
        config.range.min(),
        config.range.max(),
        config.guess_budget,
    )?;
    registry.setup(game_id, &player1, &player2)?;

    info!(%game_id, mode = ?req.mode, "game created");

    Ok((
        StatusCode::CREATED,
        Json(CreateGameResponse {
            success: true,
            game_id,
            mode: req.mode,
            player1,
            player2,
            min: config.range.min(),
            max: config.range.max(),
            max_guesses: config.guess_budget,
        }),
    ))
}

pub async fn commit_number(
    State(state): State<AppState>,
    Path(game_id): Path<SessionId>,
    Json(body): Json<Value>,
) -> Result<Json<CommitResponse>, AppError> {
    ensure_exists(&state, game_id)?;
    let secret =
        integer_field(&body, "secret").ok_or_else(|| AppError::bad_request("Invalid number"))?;

    let commitment_hash = state.registry().commit(game_id, secret)?;
    info!(%game_id, hash = %commitment_hash.short(), "secret committed");

    Ok(Json(CommitResponse {
        success: true,
        commitment_hash,
        message: "Secret number committed and encrypted",
    }))
}

pub async fn make_guess(
    State(state): State<AppState>,
    Path(game_id): Path<SessionId>,
    Json(body): Json<Value>,
) -> Result<Json<GuessResponse>, AppError> {
    ensure_exists(&state, game_id)?;
    let guess =
        integer_field(&body, "guess").ok_or_else(|| AppError::bad_request("Invalid guess"))?;

    let outcome = state.registry().guess(game_id, guess)?;
    if !outcome.valid {
        let range = state.config().range;
        return Err(AppError::bad_request(format!(
            "Guess must be between {} and {}",
            range.min(),
            range.max()
        )));
    }

    Ok(Json(GuessResponse {
        success: true,
        guess,
        feedback: outcome.feedback,
        feedback_label: outcome.feedback.map(|f| f.label()),
        attempt: outcome.attempt,
        remaining: outcome.remaining,
        game_over: outcome.closed,
    }))
}

pub async fn reveal_game(
    State(state): State<AppState>,
    Path(game_id): Path<SessionId>,
) -> Result<Response, AppError> {
    let outcome = match state.registry().reveal(game_id)? {
        RevealStatus::InProgress => {
            return Ok(Json(json!({
                "success": false,
                "status": "in_progress",
                "message": "Game still in progress",
            }))
            .into_response())
        }
        RevealStatus::Complete(outcome) => outcome,
    };

    // A revealed game has nothing left to do
    state.registry().remove(game_id);

    Ok(Json(RevealResponse {
        success: true,
        status: "complete",
        secret_number: outcome.secret,
        commitment_valid: outcome.commitment_valid,
        guesses_made: outcome.guesses_made,
        result: outcome.summary(),
        game_winner: outcome.winner,
        found_at_position: outcome.found_at_position,
        timestamp: outcome.committed_at,
    })
    .into_response())
}

pub async fn get_stats(
    State(state): State<AppState>,
    Path(game_id): Path<SessionId>,
) -> Result<Json<StatsResponse>, AppError> {
    let stats = state.registry().stats(game_id)?;

    Ok(Json(StatsResponse {
        success: true,
        phase: stats.phase,
        guesses_made: stats.guesses_made,
        guesses_remaining: stats.guesses_remaining,
        game_over: stats.closed,
        recent_guesses: stats.recent_guesses,
    }))
}

pub async fn get_concepts() -> Json<Value> {
    Json(json!({
        "concepts": [
            {
                "title": "Commitment",
                "description": concat!(
                    "Your secret number is encrypted and cryptographically bound. ",
                    "You cannot change it without breaking the commitment hash."
                ),
                "key_points": [
                    "Encrypted data stays hidden",
                    "Hash proves commitment exists",
                    "Can't change mind later",
                    "The hash is taken over ciphertext, so it leaks nothing"
                ]
            },
            {
                "title": "Reveal",
                "description": concat!(
                    "After the game, your encrypted commitment is decrypted ",
                    "to show the number you chose."
                ),
                "key_points": [
                    "Decrypt only after guessing ends",
                    "Timestamp shows when the number was fixed",
                    "Each commitment opens exactly once"
                ]
            },
            {
                "title": "Verification",
                "description": concat!(
                    "The hash issued at commit time is checked against ",
                    "the stored ciphertext to prove nothing changed."
                ),
                "key_points": [
                    "Hash matches = commitment untouched",
                    "Hash differs = tampering detected",
                    "Cryptography proves the outcome"
                ]
            }
        ]
    }))
}
