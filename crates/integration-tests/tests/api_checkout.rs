//! Integration tests for order placement and history.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied and the
//!   catalog seeded (hemline seed)
//! - The server running (cargo run -p hemline-server)
//!
//! Run with: cargo test -p hemline-integration-tests -- --ignored

#![allow(clippy::indexing_slicing)]

use hemline_integration_tests::{TestApi, first_size};
use reqwest::StatusCode;
use serde_json::{Value, json};

/// Fixed cash-on-delivery charge in minor units.
const COD_CHARGE: i64 = 1000;

fn checkout_item(product: &Value, quantity: i64) -> Value {
    json!({
        "product_id": product["id"],
        "product_name": product["name"],
        "price": product["price"],
        "quantity": quantity,
        "size": first_size(product),
    })
}

async fn order_history(api: &TestApi, token: &str) -> Vec<Value> {
    let resp = api
        .client
        .get(format!("{}/api/orders", api.base_url))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to fetch orders");
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.expect("Failed to parse order history")
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
#[ignore = "Requires running hemline server and seeded database"]
async fn test_upi_order_with_malformed_utr_creates_nothing() {
    let api = TestApi::new();
    let (token, _) = api.register_shopper().await;
    let products = api.products_with_stock(1).await;

    let resp = api
        .client
        .post(format!("{}/api/orders", api.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "items": [checkout_item(&products[0], 1)],
            "total_amount": products[0]["price"],
            "payment_method": "upi",
            "utr_number": "12345",
        }))
        .send()
        .await
        .expect("Failed to send order");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse error body");
    assert_eq!(body["error"], "UTR number must be exactly 12 digits");

    assert!(
        order_history(&api, &token).await.is_empty(),
        "rejected order must not be recorded"
    );
}

#[tokio::test]
#[ignore = "Requires running hemline server and seeded database"]
async fn test_order_requires_items() {
    let api = TestApi::new();
    let (token, _) = api.register_shopper().await;

    let resp = api
        .client
        .post(format!("{}/api/orders", api.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "items": [],
            "total_amount": 1000,
            "payment_method": "cod",
        }))
        .send()
        .await
        .expect("Failed to send order");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse error body");
    assert_eq!(body["error"], "Items are required");
}

// ============================================================================
// COD Placement
// ============================================================================

#[tokio::test]
#[ignore = "Requires running hemline server and seeded database"]
async fn test_cod_order_carries_delivery_charge_line() {
    let api = TestApi::new();
    let (token, _) = api.register_shopper().await;
    let products = api.products_with_stock(1).await;

    let resp = api
        .client
        .post(format!("{}/api/orders", api.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "items": [checkout_item(&products[0], 2)],
            "total_amount": products[0]["price"].as_i64().expect("price is a number") * 2,
            "payment_method": "cod",
        }))
        .send()
        .await
        .expect("Failed to send order");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse order response");
    assert_eq!(body["message"], "Order created successfully");

    let orders = order_history(&api, &token).await;
    assert_eq!(orders.len(), 1);

    let items = orders[0]["items"].as_array().expect("order carries items");
    assert_eq!(items.len(), 2, "one submitted line plus the COD charge");

    let charge = items
        .iter()
        .find(|i| i["product_name"] == "Cash on Delivery Charge")
        .expect("COD charge line present");
    assert_eq!(charge["price"], COD_CHARGE);
    assert_eq!(charge["quantity"], 1);
}

/// End to end: register, fill the cart with two products, check out with
/// COD. The order total is the catalog prices times quantities plus the
/// delivery charge, and the cart is empty afterwards.
#[tokio::test]
#[ignore = "Requires running hemline server and seeded database"]
async fn test_cod_checkout_end_to_end() {
    let api = TestApi::new();
    let (token, _) = api.register_shopper().await;
    let products = api.products_with_stock(2).await;

    api.add_to_cart(&token, &products[0], 1).await;
    api.add_to_cart(&token, &products[1], 1).await;

    let price = |p: &Value| p["price"].as_i64().expect("price is a number");
    let expected_total = price(&products[0]) * 2 + price(&products[1]) + COD_CHARGE;

    let resp = api
        .client
        .post(format!("{}/api/orders", api.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "items": [
                checkout_item(&products[0], 2),
                checkout_item(&products[1], 1),
            ],
            "total_amount": expected_total - COD_CHARGE,
            "payment_method": "cod",
        }))
        .send()
        .await
        .expect("Failed to send order");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let orders = order_history(&api, &token).await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["total_amount"], expected_total);
    assert_eq!(orders[0]["payment_method"], "cod");

    assert!(
        api.cart_items(&token).await.is_empty(),
        "checkout clears the cart"
    );
}

// ============================================================================
// UPI Placement
// ============================================================================

#[tokio::test]
#[ignore = "Requires running hemline server and seeded database"]
async fn test_upi_order_records_utr() {
    let api = TestApi::new();
    let (token, _) = api.register_shopper().await;
    let products = api.products_with_stock(1).await;

    let resp = api
        .client
        .post(format!("{}/api/orders", api.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "items": [checkout_item(&products[0], 1)],
            "total_amount": products[0]["price"],
            "payment_method": "upi",
            "utr_number": "123456789012",
        }))
        .send()
        .await
        .expect("Failed to send order");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let orders = order_history(&api, &token).await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["utr_number"], "123456789012");

    let items = orders[0]["items"].as_array().expect("order carries items");
    assert_eq!(items.len(), 1, "no delivery charge on UPI orders");
}
