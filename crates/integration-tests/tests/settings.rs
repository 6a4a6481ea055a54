//! Integration tests for the merchant settings endpoint.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The server running (cargo run -p popgames-server)
//! - A seeded test shop with valid Shopify credentials (percentage changes
//!   sync to real discount codes)
//!
//! Run with: cargo test -p popgames-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::Value;

use popgames_integration_tests::{base_url, test_shop};

fn settings_url() -> String {
    format!("{}/app/settings?shop={}", base_url(), test_shop())
}

async fn save(form: &[(&str, &str)]) -> (StatusCode, Value) {
    let client = Client::new();
    let resp = client
        .post(settings_url())
        .form(form)
        .send()
        .await
        .expect("request failed");

    let status = resp.status();
    let body: Value = resp.json().await.unwrap_or(Value::Null);
    (status, body)
}

async fn current_config() -> Value {
    let client = Client::new();
    client
        .get(settings_url())
        .send()
        .await
        .expect("request failed")
        .json()
        .await
        .expect("invalid config body")
}

#[tokio::test]
#[ignore = "Requires running server and seeded shop"]
async fn test_get_settings_provisions_store() {
    let config = current_config().await;
    assert_eq!(config["shop"], test_shop());
    assert!(config["lowPctOff"].as_f64().is_some());
    assert!(config["useWordGame"].is_boolean());
}

#[tokio::test]
#[ignore = "Requires running server, seeded shop, and Shopify credentials"]
async fn test_valid_save_persists_exact_values() {
    let (status, body) = save(&[
        ("lowPctOff", "0.11"),
        ("midPctOff", "0.17"),
        ("highPctOff", "0.29"),
        ("lowProb", "0.5"),
        ("midProb", "0.3"),
        ("highProb", "0.2"),
        ("useWordGame", "true"),
        ("useBirdGame", "true"),
    ])
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Updated successfully");

    let config = current_config().await;
    assert_eq!(config["lowPctOff"], 0.11);
    assert_eq!(config["midPctOff"], 0.17);
    assert_eq!(config["highPctOff"], 0.29);
    assert_eq!(config["lowProb"], 0.5);
}

#[tokio::test]
#[ignore = "Requires running server and seeded shop"]
async fn test_bad_probability_sum_changes_nothing() {
    let before = current_config().await;

    let (status, body) = save(&[
        ("lowProb", "0.3"),
        ("midProb", "0.3"),
        ("highProb", "0.3"),
        ("useWordGame", "false"),
    ])
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Probabilities must add up to 100%");

    // The save is all-or-nothing: probabilities AND the flag are untouched
    let after = current_config().await;
    assert_eq!(before["lowProb"], after["lowProb"]);
    assert_eq!(before["useWordGame"], after["useWordGame"]);
}

#[tokio::test]
#[ignore = "Requires running server and seeded shop"]
async fn test_unordered_tiers_rejected() {
    let before = current_config().await;

    let (status, body) = save(&[
        ("lowPctOff", "0.2"),
        ("midPctOff", "0.1"),
        ("highPctOff", "0.3"),
    ])
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "Higher tier discounts must provide a larger percentage off than the tiers below them"
    );

    let after = current_config().await;
    assert_eq!(before["lowPctOff"], after["lowPctOff"]);
    assert_eq!(before["midPctOff"], after["midPctOff"]);
}

#[tokio::test]
#[ignore = "Requires running server and seeded shop"]
async fn test_flags_only_save_succeeds() {
    let (status, body) = save(&[("useWordGame", "true"), ("useBirdGame", "false")]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let config = current_config().await;
    assert_eq!(config["useWordGame"], true);
    assert_eq!(config["useBirdGame"], false);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_invalid_shop_parameter_rejected() {
    let client = Client::new();
    let resp = client
        .post(format!("{}/app/settings?shop=not a domain", base_url()))
        .form(&[("useWordGame", "true")])
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
