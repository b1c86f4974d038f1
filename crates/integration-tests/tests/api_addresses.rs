//! Integration tests for the address book.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The server running (cargo run -p hemline-server)
//!
//! Run with: cargo test -p hemline-integration-tests -- --ignored

#![allow(clippy::indexing_slicing)]

use hemline_integration_tests::TestApi;
use reqwest::StatusCode;
use serde_json::{Value, json};

fn address_payload(name: &str, is_default: bool) -> Value {
    json!({
        "name": name,
        "phone": "9876543210",
        "house": "12B",
        "street": "MG Road",
        "city": "Pune",
        "state": "MH",
        "zip_code": "411001",
        "is_default": is_default,
    })
}

async fn create_address(api: &TestApi, token: &str, payload: &Value) -> i64 {
    let resp = api
        .client
        .post(format!("{}/api/user/addresses", api.base_url))
        .bearer_auth(token)
        .json(payload)
        .send()
        .await
        .expect("Failed to create address");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("Failed to parse create response");
    assert_eq!(body["message"], "Address added successfully");
    body["address_id"].as_i64().expect("address_id present")
}

async fn list_addresses(api: &TestApi, token: &str) -> Vec<Value> {
    let resp = api
        .client
        .get(format!("{}/api/user/addresses", api.base_url))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to list addresses");
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.expect("Failed to parse address list")
}

// ============================================================================
// CRUD
// ============================================================================

#[tokio::test]
#[ignore = "Requires running hemline server and database"]
async fn test_create_and_list() {
    let api = TestApi::new();
    let (token, _) = api.register_shopper().await;

    create_address(&api, &token, &address_payload("Home", false)).await;
    create_address(&api, &token, &address_payload("Work", false)).await;

    let addresses = list_addresses(&api, &token).await;
    assert_eq!(addresses.len(), 2);
    assert_eq!(addresses[0]["country"], "IN", "country defaults applied");
}

#[tokio::test]
#[ignore = "Requires running hemline server and database"]
async fn test_create_rejects_blank_required_field() {
    let api = TestApi::new();
    let (token, _) = api.register_shopper().await;

    let mut payload = address_payload("Home", false);
    payload["phone"] = json!("   ");

    let resp = api
        .client
        .post(format!("{}/api/user/addresses", api.base_url))
        .bearer_auth(&token)
        .json(&payload)
        .send()
        .await
        .expect("Failed to send address");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse error body");
    assert_eq!(body["error"], "phone is required");
}

#[tokio::test]
#[ignore = "Requires running hemline server and database"]
async fn test_update_replaces_fields() {
    let api = TestApi::new();
    let (token, _) = api.register_shopper().await;
    let id = create_address(&api, &token, &address_payload("Home", false)).await;

    let mut payload = address_payload("Home", false);
    payload["city"] = json!("Mumbai");

    let resp = api
        .client
        .put(format!("{}/api/user/addresses/{id}", api.base_url))
        .bearer_auth(&token)
        .json(&payload)
        .send()
        .await
        .expect("Failed to update address");
    assert_eq!(resp.status(), StatusCode::OK);

    let addresses = list_addresses(&api, &token).await;
    assert_eq!(addresses[0]["city"], "Mumbai");
}

#[tokio::test]
#[ignore = "Requires running hemline server and database"]
async fn test_update_foreign_address_is_404() {
    let api = TestApi::new();
    let (owner_token, _) = api.register_shopper().await;
    let (other_token, _) = api.register_shopper().await;
    let id = create_address(&api, &owner_token, &address_payload("Home", false)).await;

    let resp = api
        .client
        .put(format!("{}/api/user/addresses/{id}", api.base_url))
        .bearer_auth(&other_token)
        .json(&address_payload("Hijack", false))
        .send()
        .await
        .expect("Failed to send update");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.expect("Failed to parse error body");
    assert_eq!(body["error"], "Address not found");
}

#[tokio::test]
#[ignore = "Requires running hemline server and database"]
async fn test_delete_address() {
    let api = TestApi::new();
    let (token, _) = api.register_shopper().await;
    let id = create_address(&api, &token, &address_payload("Home", false)).await;

    let resp = api
        .client
        .delete(format!("{}/api/user/addresses/{id}", api.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to delete address");
    assert_eq!(resp.status(), StatusCode::OK);

    assert!(list_addresses(&api, &token).await.is_empty());
}

// ============================================================================
// Default Flag
// ============================================================================

/// Making a second address the default clears the flag on the first;
/// exactly one address is ever the default.
#[tokio::test]
#[ignore = "Requires running hemline server and database"]
async fn test_default_moves_between_addresses() {
    let api = TestApi::new();
    let (token, _) = api.register_shopper().await;

    let first = create_address(&api, &token, &address_payload("Home", true)).await;
    let second = create_address(&api, &token, &address_payload("Work", true)).await;

    let addresses = list_addresses(&api, &token).await;
    let defaults: Vec<i64> = addresses
        .iter()
        .filter(|a| a["is_default"] == true)
        .map(|a| a["id"].as_i64().expect("address id"))
        .collect();

    assert_eq!(defaults, vec![second], "only the newest default remains");
    assert!(
        addresses.iter().any(|a| a["id"] == first && a["is_default"] == false),
        "previous default was cleared"
    );
}
