//! Blockage API integration tests.
//!
//! Run with: cargo test --test blockage_test -- --ignored
//! Requires a running detour server.

use reqwest::Client;
use serde_json::{json, Value};

fn base_url() -> String {
    std::env::var("DETOUR_TEST_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Create, fetch and delete a blockage.
#[tokio::test]
#[ignore]
async fn test_blockage_lifecycle() {
    let client = Client::new();
    let base = base_url();

    let resp = client
        .post(format!("{}/v1/blockages", base))
        .json(&json!({"lat": 19.11, "lon": 72.875, "radius": 800, "description": "Integration"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let created: Value = resp.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let resp = client
        .get(format!("{}/v1/blockages/{}", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let fetched: Value = resp.json().await.unwrap();
    assert_eq!(fetched["description"], "Integration");

    let resp = client
        .delete(format!("{}/v1/blockages/{}", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let resp = client
        .get(format!("{}/v1/blockages/{}", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

/// Negative radius must be rejected.
#[tokio::test]
#[ignore]
async fn test_invalid_blockage_rejected() {
    let client = Client::new();
    let resp = client
        .post(format!("{}/v1/blockages", base_url()))
        .json(&json!({"lat": 19.11, "lon": 72.875, "radius_m": -5}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid blockage");
}
