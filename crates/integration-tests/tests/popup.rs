//! Integration tests for the storefront popup endpoint.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The server running (cargo run -p popgames-server)
//! - A seeded test shop (cargo run -p popgames-cli -- seed ...)
//!
//! Run with: cargo test -p popgames-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use popgames_integration_tests::{base_url, test_shop};

fn popup_url() -> String {
    format!("{}/popup?shop={}", base_url(), test_shop())
}

/// A per-run email so reruns start from a fresh stats row.
fn fresh_email(tag: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("it-{tag}-{nanos}@example.com")
}

async fn post(body: Value) -> (StatusCode, Value) {
    let client = Client::new();
    let resp = client
        .post(popup_url())
        .json(&body)
        .send()
        .await
        .expect("request failed");

    let status = resp.status();
    let body: Value = resp.json().await.unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
#[ignore = "Requires running server and seeded shop"]
async fn test_discount_options_idempotent() {
    let (status, first) = post(json!({"getDiscountOptions": true})).await;
    assert_eq!(status, StatusCode::OK);

    let options = &first["discountOptions"];
    for key in [
        "lowPctOff",
        "midPctOff",
        "highPctOff",
        "lowProb",
        "midProb",
        "highProb",
    ] {
        assert!(options[key].is_f64() || options[key].is_i64(), "{key}");
    }

    // No intervening write: the second read must be identical
    let (_, second) = post(json!({"getDiscountOptions": true})).await;
    assert_eq!(first, second);
}

#[tokio::test]
#[ignore = "Requires running server and seeded shop"]
async fn test_game_options_shape() {
    let (status, body) = post(json!({"getGameOptions": true})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["gameOptions"]["useWordGame"].is_boolean());
    assert!(body["gameOptions"]["useBirdGame"].is_boolean());
}

#[tokio::test]
#[ignore = "Requires running server and seeded shop"]
async fn test_word_game_best_is_minimum() {
    let email = fresh_email("word");

    let (status, body) = post(json!({
        "email": email,
        "setUserStats": {"game": "wordGame", "score": 50}
    }))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updatedUserStats"]["wordGamesPlayed"], 1);
    assert_eq!(body["updatedUserStats"]["wordGameBest"], 50);

    let (_, body) = post(json!({
        "email": email,
        "setUserStats": {"game": "wordGame", "score": 30}
    }))
    .await;
    assert_eq!(body["updatedUserStats"]["wordGamesPlayed"], 2);
    assert_eq!(body["updatedUserStats"]["wordGamesTotal"], 80);
    assert_eq!(body["updatedUserStats"]["wordGameBest"], 30);
}

#[tokio::test]
#[ignore = "Requires running server and seeded shop"]
async fn test_bird_game_best_is_maximum() {
    let email = fresh_email("bird");

    post(json!({
        "email": email,
        "setUserStats": {"game": "birdGame", "score": 3}
    }))
    .await;

    let (_, body) = post(json!({
        "email": email,
        "setUserStats": {"game": "birdGame", "score": 5}
    }))
    .await;
    assert_eq!(body["updatedUserStats"]["birdGamesPlayed"], 2);
    assert_eq!(body["updatedUserStats"]["birdGamesTotal"], 8);
    assert_eq!(body["updatedUserStats"]["birdGameBest"], 5);
}

#[tokio::test]
#[ignore = "Requires running server and seeded shop"]
async fn test_get_user_stats_covers_both_games() {
    let email = fresh_email("both");

    post(json!({
        "email": email,
        "setUserStats": {"game": "wordGame", "score": 4}
    }))
    .await;
    post(json!({
        "email": email,
        "setUserStats": {"game": "birdGame", "score": 7}
    }))
    .await;

    let (status, body) = post(json!({"email": email, "getUserStats": true})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userStats"]["wordGamesPlayed"], 1);
    assert_eq!(body["userStats"]["wordGameBest"], 4);
    assert_eq!(body["userStats"]["birdGamesPlayed"], 1);
    assert_eq!(body["userStats"]["birdGameBest"], 7);
}

#[tokio::test]
#[ignore = "Requires running server and seeded shop"]
async fn test_unknown_player_stats_are_null() {
    let (status, body) = post(json!({
        "email": fresh_email("never-played"),
        "getUserStats": true
    }))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["userStats"].is_null());
}

#[tokio::test]
#[ignore = "Requires running server and seeded shop"]
async fn test_unknown_game_is_rejected() {
    let (status, _) = post(json!({
        "email": fresh_email("badgame"),
        "setUserStats": {"game": "snakeGame", "score": 1}
    }))
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[ignore = "Requires running server, seeded shop, and Shopify credentials"]
async fn test_consent_resolution_for_new_email() {
    let email = fresh_email("consent");

    let (status, body) = post(json!({"email": email})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], email);
    assert_eq!(body["validEmailGiven"], true);
    assert!(body["customerResponse"].is_string());

    // Second resolution: the customer is now subscribed, no new opt-in
    let (_, body) = post(json!({"email": email})).await;
    assert_eq!(body["validEmailGiven"], false);
    assert!(body["customerResponse"].is_null());
}
