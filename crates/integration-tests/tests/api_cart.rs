//! Integration tests for the cart.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied and the
//!   catalog seeded (hemline seed)
//! - The server running (cargo run -p hemline-server)
//!
//! Run with: cargo test -p hemline-integration-tests -- --ignored

#![allow(clippy::indexing_slicing)]

use hemline_integration_tests::TestApi;
use reqwest::StatusCode;
use serde_json::{Value, json};

// ============================================================================
// Adding Items
// ============================================================================

#[tokio::test]
#[ignore = "Requires running hemline server and seeded database"]
async fn test_add_item_lands_in_cart() {
    let api = TestApi::new();
    let (token, _) = api.register_shopper().await;
    let products = api.products_with_stock(1).await;

    let item = api.add_to_cart(&token, &products[0], 1).await;
    assert_eq!(item["product_name"], products[0]["name"]);
    assert_eq!(item["quantity"], 1);

    let items = api.cart_items(&token).await;
    assert_eq!(items.len(), 1);
}

/// Re-adding the same selection folds into the existing line with a
/// bump of exactly one, regardless of the quantity later calls ask for.
#[tokio::test]
#[ignore = "Requires running hemline server and seeded database"]
async fn test_repeat_add_folds_into_quantity() {
    let api = TestApi::new();
    let (token, _) = api.register_shopper().await;
    let products = api.products_with_stock(1).await;

    api.add_to_cart(&token, &products[0], 1).await;
    api.add_to_cart(&token, &products[0], 5).await;
    api.add_to_cart(&token, &products[0], 5).await;

    let items = api.cart_items(&token).await;
    assert_eq!(items.len(), 1, "repeat adds stay on one line");
    assert_eq!(items[0]["quantity"], 3, "each repeat bumps by exactly one");
}

// ============================================================================
// Quantity Updates
// ============================================================================

#[tokio::test]
#[ignore = "Requires running hemline server and seeded database"]
async fn test_update_quantity() {
    let api = TestApi::new();
    let (token, _) = api.register_shopper().await;
    let products = api.products_with_stock(1).await;
    let item = api.add_to_cart(&token, &products[0], 1).await;

    let resp = api
        .client
        .put(format!("{}/api/cart/{}", api.base_url, item["id"]))
        .bearer_auth(&token)
        .json(&json!({ "quantity": 2 }))
        .send()
        .await
        .expect("Failed to update quantity");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse update response");
    assert_eq!(body["message"], "Cart updated successfully");
    assert_eq!(body["item"]["quantity"], 2);
}

#[tokio::test]
#[ignore = "Requires running hemline server and seeded database"]
async fn test_update_without_quantity_rejected() {
    let api = TestApi::new();
    let (token, _) = api.register_shopper().await;
    let products = api.products_with_stock(1).await;
    let item = api.add_to_cart(&token, &products[0], 1).await;

    let resp = api
        .client
        .put(format!("{}/api/cart/{}", api.base_url, item["id"]))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send update");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse error body");
    assert_eq!(body["error"], "Valid quantity is required");
}

/// A quantity beyond the size's available stock is refused and the line
/// keeps its previous quantity.
#[tokio::test]
#[ignore = "Requires running hemline server and seeded database"]
async fn test_update_beyond_stock_rejected() {
    let api = TestApi::new();
    let (token, _) = api.register_shopper().await;
    let products = api.products_with_stock(1).await;
    let item = api.add_to_cart(&token, &products[0], 1).await;

    let resp = api
        .client
        .put(format!("{}/api/cart/{}", api.base_url, item["id"]))
        .bearer_auth(&token)
        .json(&json!({ "quantity": 1_000_000 }))
        .send()
        .await
        .expect("Failed to send update");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse error body");
    let error = body["error"].as_str().expect("error is a string");
    assert!(
        error.contains("items available for this size"),
        "unexpected error: {error}"
    );

    let items = api.cart_items(&token).await;
    assert_eq!(items[0]["quantity"], 1, "quantity unchanged after refusal");
}

#[tokio::test]
#[ignore = "Requires running hemline server and seeded database"]
async fn test_update_missing_item_is_404() {
    let api = TestApi::new();
    let (token, _) = api.register_shopper().await;

    let resp = api
        .client
        .put(format!("{}/api/cart/999999", api.base_url))
        .bearer_auth(&token)
        .json(&json!({ "quantity": 1 }))
        .send()
        .await
        .expect("Failed to send update");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.expect("Failed to parse error body");
    assert_eq!(body["error"], "Item not found");
}

// ============================================================================
// Removal
// ============================================================================

#[tokio::test]
#[ignore = "Requires running hemline server and seeded database"]
async fn test_remove_item() {
    let api = TestApi::new();
    let (token, _) = api.register_shopper().await;
    let products = api.products_with_stock(1).await;
    let item = api.add_to_cart(&token, &products[0], 1).await;

    let resp = api
        .client
        .delete(format!("{}/api/cart/{}", api.base_url, item["id"]))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to remove item");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Item removed from cart successfully");

    assert!(api.cart_items(&token).await.is_empty());
}

#[tokio::test]
#[ignore = "Requires running hemline server and seeded database"]
async fn test_clear_cart() {
    let api = TestApi::new();
    let (token, _) = api.register_shopper().await;
    let products = api.products_with_stock(2).await;
    api.add_to_cart(&token, &products[0], 1).await;
    api.add_to_cart(&token, &products[1], 1).await;

    let resp = api
        .client
        .delete(format!("{}/api/cart", api.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to clear cart");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Cart cleared successfully");

    assert!(api.cart_items(&token).await.is_empty());
}
