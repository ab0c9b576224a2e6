//! End-to-end tests driving the router in-process

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use guess_commit_server::{create_router, AppState, ServerConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> (Router, AppState) {
    let state = AppState::new(ServerConfig::default());
    (create_router(state.clone()), state)
}

fn game_uri(id: &str, action: &str) -> String {
    format!("/api/game/{id}/{action}")
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body)).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}

async fn reveal(app: &Router, id: &str) -> (StatusCode, Value) {
    send(app, "POST", &game_uri(id, "reveal"), None).await
}

async fn create_game(app: &Router, body: Value) -> String {
    let (status, json) = post(app, "/api/game/create", body).await;
    assert_eq!(status, StatusCode::CREATED);
    json["game_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_and_concepts() {
    let (app, _) = app();

    let (status, json) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");

    let (status, json) = get(&app, "/api/concepts").await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = json["concepts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Commitment", "Reveal", "Verification"]);
}

#[tokio::test]
async fn test_create_defaults() {
    let (app, _) = app();

    let (status, json) = post(&app, "/api/game/create", json!({})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["success"], true);
    assert_eq!(json["mode"], "single");
    assert_eq!(json["player1"], "Player 1");
    assert_eq!(json["player2"], "Computer");
    assert_eq!(json["min"], 1);
    assert_eq!(json["max"], 100);
    assert_eq!(json["max_guesses"], 10);

    let (_, json) = post(
        &app,
        "/api/game/create",
        json!({"mode": "two", "player1": "Alice"}),
    )
    .await;
    assert_eq!(json["player1"], "Alice");
    assert_eq!(json["player2"], "Player 2");
}

#[tokio::test]
async fn test_unrecognised_mode_is_two_player() {
    let (app, _) = app();

    let (status, json) = post(&app, "/api/game/create", json!({"mode": "multi"})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["mode"], "two");
    assert_eq!(json["player2"], "Player 2");
}

#[tokio::test]
async fn test_full_game_found_on_sixth_guess() {
    let (app, state) = app();
    let id = create_game(&app, json!({"mode": "single"})).await;

    let (status, json) = post(&app, &game_uri(&id, "commit"), json!({"secret": 42})).await;
    assert_eq!(status, StatusCode::OK);
    let hash = json["commitment_hash"].as_str().unwrap();
    assert_eq!(hash.len(), 64);

    let expected = [
        (50, "warm", false),
        (40, "very_close", false),
        (45, "very_close", false),
        (43, "very_close", false),
        (41, "very_close", false),
        (42, "exact", true),
    ];
    for (attempt, (guess, feedback, over)) in expected.iter().enumerate() {
        let (status, json) = post(&app, &game_uri(&id, "guess"), json!({"guess": guess})).await;
        assert_eq!(status, StatusCode::OK, "guess {guess}");
        assert_eq!(json["feedback"], *feedback, "guess {guess}");
        assert_eq!(json["attempt"], attempt + 1);
        assert_eq!(json["game_over"], *over);
    }

    let (status, json) = get(&app, &game_uri(&id, "stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["phase"], "reveal");
    assert_eq!(json["guesses_made"], 6);
    assert_eq!(json["recent_guesses"], json!([40, 45, 43, 41, 42]));

    let (status, json) = reveal(&app, &id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "complete");
    assert_eq!(json["secret_number"], 42);
    assert_eq!(json["commitment_valid"], true);
    assert_eq!(json["guesses_made"], 6);
    assert_eq!(json["found_at_position"], 6);
    assert_eq!(json["result"], "Found in 6 guesses");
    assert_eq!(json["game_winner"], "Computer");

    // Revealed games are dropped
    assert!(state.registry().is_empty());
    let (status, _) = get(&app, &game_uri(&id, "stats")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reveal_before_end_is_in_progress() {
    let (app, _) = app();
    let id = create_game(&app, json!({})).await;
    post(&app, &game_uri(&id, "commit"), json!({"secret": 7})).await;
    post(&app, &game_uri(&id, "guess"), json!({"guess": 3})).await;

    let (status, json) = reveal(&app, &id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], false);
    assert_eq!(json["status"], "in_progress");

    // Game is untouched and can continue
    let (status, json) = post(&app, &game_uri(&id, "guess"), json!({"guess": 7})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["feedback"], "exact");
}

#[tokio::test]
async fn test_bad_inputs() {
    let (app, _) = app();
    let id = create_game(&app, json!({})).await;
    let commit = game_uri(&id, "commit");
    let guess = game_uri(&id, "guess");

    let (status, json) = post(&app, &commit, json!({"secret": "abc"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid number");

    let (status, json) = post(&app, &commit, json!({"secret": 500})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);

    // Guessing before a commitment is a phase error
    let (status, _) = post(&app, &guess, json!({"guess": 5})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    post(&app, &commit, json!({"secret": 30})).await;

    let (status, json) = post(&app, &guess, json!({"guess": 150})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Guess must be between 1 and 100");

    let (status, json) = post(&app, &guess, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid guess");

    // Neither rejected guess consumed budget
    let (_, json) = get(&app, &game_uri(&id, "stats")).await;
    assert_eq!(json["guesses_made"], 0);
    assert_eq!(json["guesses_remaining"], 10);

    // A second commit is refused
    let (status, _) = post(&app, &commit, json!({"secret": 31})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_game_is_not_found() {
    let (app, _) = app();
    let id = "00000000-0000-4000-8000-000000000000";

    for (method, action, body) in [
        ("POST", "commit", Some(json!({"secret": 1}))),
        ("POST", "guess", Some(json!({"guess": "junk"}))),
        ("POST", "reveal", None),
        ("GET", "stats", None),
    ] {
        let (status, json) = send(&app, method, &game_uri(id, action), body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{action}");
        assert_eq!(json["success"], false);
    }
}

#[tokio::test]
async fn test_budget_exhaustion_reveals_secret() {
    let (app, _) = app();
    let id = create_game(&app, json!({"mode": "two"})).await;
    post(&app, &game_uri(&id, "commit"), json!({"secret": 99})).await;

    let mut last = Value::Null;
    for guess in 1..=10 {
        let (status, json) = post(&app, &game_uri(&id, "guess"), json!({"guess": guess})).await;
        assert_eq!(status, StatusCode::OK);
        last = json;
    }
    assert_eq!(last["game_over"], true);
    assert_eq!(last["remaining"], 0);

    let (status, _) = post(&app, &game_uri(&id, "guess"), json!({"guess": 99})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, json) = reveal(&app, &id).await;
    assert_eq!(json["secret_number"], 99);
    assert_eq!(json["found_at_position"], Value::Null);
    assert_eq!(json["result"], "Not found in 10 guesses. Secret was 99");
    assert_eq!(json["game_winner"], Value::Null);
}
