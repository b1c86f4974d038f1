//! Integration tests for colour-variant grouping.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The server running (cargo run -p hemline-server)
//! - An admin account matching `HEMLINE_TEST_ADMIN_EMAIL` /
//!   `HEMLINE_TEST_ADMIN_PASSWORD` (create with `hemline admin create`)
//!
//! Run with: cargo test -p hemline-integration-tests -- --ignored

#![allow(clippy::indexing_slicing)]

use hemline_integration_tests::TestApi;
use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

/// Create a bare product via the admin form; returns its id.
async fn create_product(api: &TestApi, admin: &str, name: &str) -> i64 {
    let form = reqwest::multipart::Form::new()
        .text("name", name.to_owned())
        .text("category", "T-Shirts")
        .text("price", "129900")
        .text("stock", "10")
        .text("image", format!("https://cdn.example.com/{name}.jpg"));

    let resp = api
        .client
        .post(format!("{}/api/products", api.base_url))
        .bearer_auth(admin)
        .multipart(form)
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("Failed to parse create response");
    assert_eq!(body["message"], "Product created successfully");
    body["product_id"].as_i64().expect("product_id present")
}

async fn delete_product(api: &TestApi, admin: &str, id: i64) {
    let _ = api
        .client
        .delete(format!("{}/api/admin/products/{id}", api.base_url))
        .bearer_auth(admin)
        .send()
        .await;
}

/// Ids a product's colour links point at, sorted.
async fn color_link_ids(api: &TestApi, id: i64) -> Vec<i64> {
    let resp = api
        .client
        .get(format!("{}/api/products/{id}", api.base_url))
        .send()
        .await
        .expect("Failed to fetch product");
    assert_eq!(resp.status(), StatusCode::OK);

    let product: Value = resp.json().await.expect("Failed to parse product");
    let mut ids: Vec<i64> = product["colors"]
        .as_array()
        .expect("colors is an array")
        .iter()
        .map(|link| link["id"].as_i64().expect("link id"))
        .collect();
    ids.sort_unstable();
    ids
}

// ============================================================================
// Grouping
// ============================================================================

/// Grouping three products links each to the other two, symmetrically.
#[tokio::test]
#[ignore = "Requires running hemline server, database and admin account"]
async fn test_group_links_every_pair() {
    let api = TestApi::new();
    let admin = api.admin_token().await;
    let suffix = Uuid::new_v4();

    let a = create_product(&api, &admin, &format!("Tee {suffix} Red")).await;
    let b = create_product(&api, &admin, &format!("Tee {suffix} Blue")).await;
    let c = create_product(&api, &admin, &format!("Tee {suffix} Green")).await;

    let resp = api
        .client
        .post(format!("{}/api/admin/products/group", api.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "product_ids": [a, b, c] }))
        .send()
        .await
        .expect("Failed to group products");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse group response");
    assert_eq!(body["message"], "Products successfully grouped and linked.");

    assert_eq!(color_link_ids(&api, a).await, vec![b, c]);
    assert_eq!(color_link_ids(&api, b).await, vec![a, c]);
    assert_eq!(color_link_ids(&api, c).await, vec![a, b]);

    for id in [a, b, c] {
        delete_product(&api, &admin, id).await;
    }
}

#[tokio::test]
#[ignore = "Requires running hemline server, database and admin account"]
async fn test_group_needs_at_least_two_products() {
    let api = TestApi::new();
    let admin = api.admin_token().await;
    let suffix = Uuid::new_v4();
    let a = create_product(&api, &admin, &format!("Tee {suffix} Solo")).await;

    let resp = api
        .client
        .post(format!("{}/api/admin/products/group", api.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "product_ids": [a] }))
        .send()
        .await
        .expect("Failed to send group request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse error body");
    assert_eq!(body["error"], "Please select at least 2 products to group.");

    delete_product(&api, &admin, a).await;
}

#[tokio::test]
#[ignore = "Requires running hemline server, database and admin account"]
async fn test_group_rejects_unknown_product() {
    let api = TestApi::new();
    let admin = api.admin_token().await;
    let suffix = Uuid::new_v4();
    let a = create_product(&api, &admin, &format!("Tee {suffix} Known")).await;

    let resp = api
        .client
        .post(format!("{}/api/admin/products/group", api.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "product_ids": [a, 99_999_999] }))
        .send()
        .await
        .expect("Failed to send group request");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.expect("Failed to parse error body");
    assert_eq!(body["error"], "One or more products not found.");

    delete_product(&api, &admin, a).await;
}

// ============================================================================
// Ungrouping
// ============================================================================

/// Pulling one product out of a clique leaves the remaining pair linked
/// and the removed product unlinked.
#[tokio::test]
#[ignore = "Requires running hemline server, database and admin account"]
async fn test_ungroup_detaches_only_selected() {
    let api = TestApi::new();
    let admin = api.admin_token().await;
    let suffix = Uuid::new_v4();

    let a = create_product(&api, &admin, &format!("Tee {suffix} Red")).await;
    let b = create_product(&api, &admin, &format!("Tee {suffix} Blue")).await;
    let c = create_product(&api, &admin, &format!("Tee {suffix} Green")).await;

    let resp = api
        .client
        .post(format!("{}/api/admin/products/group", api.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "product_ids": [a, b, c] }))
        .send()
        .await
        .expect("Failed to group products");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = api
        .client
        .post(format!("{}/api/admin/products/ungroup", api.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "product_ids": [b] }))
        .send()
        .await
        .expect("Failed to ungroup product");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse ungroup response");
    assert_eq!(body["message"], "Products successfully ungrouped.");

    assert_eq!(color_link_ids(&api, a).await, vec![c]);
    assert_eq!(color_link_ids(&api, b).await, Vec::<i64>::new());
    assert_eq!(color_link_ids(&api, c).await, vec![a]);

    for id in [a, b, c] {
        delete_product(&api, &admin, id).await;
    }
}
