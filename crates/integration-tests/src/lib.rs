//! Integration test harness for Hemline.
//!
//! # Running Tests
//!
//! ```bash
//! # Apply migrations, seed the catalog and create the test admin
//! cargo run -p hemline-cli -- migrate
//! cargo run -p hemline-cli -- seed
//! cargo run -p hemline-cli -- admin create -e admin@example.com -p integration-admin-pw
//!
//! # Start the server, then run the ignored tests
//! cargo run -p hemline-server
//! cargo test -p hemline-integration-tests -- --ignored
//! ```
//!
//! Tests talk to a running server over HTTP. `HEMLINE_TEST_BASE_URL`
//! overrides the default `http://localhost:3000`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL of the server under test (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("HEMLINE_TEST_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Credentials the admin-surface tests sign in with. Create the account
/// first with `hemline admin create`.
#[must_use]
pub fn admin_credentials() -> (String, String) {
    let email = std::env::var("HEMLINE_TEST_ADMIN_EMAIL")
        .unwrap_or_else(|_| "admin@example.com".to_string());
    let password = std::env::var("HEMLINE_TEST_ADMIN_PASSWORD")
        .unwrap_or_else(|_| "integration-admin-pw".to_string());
    (email, password)
}

/// HTTP harness for one test: a client plus the target base URL.
pub struct TestApi {
    pub client: Client,
    pub base_url: String,
}

impl Default for TestApi {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApi {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: base_url(),
        }
    }

    /// Register a fresh shopper with a unique email.
    ///
    /// Returns the bearer token and the user object from the response.
    ///
    /// # Panics
    ///
    /// Panics when the server is unreachable or registration fails.
    pub async fn register_shopper(&self) -> (String, Value) {
        let email = format!("shopper-{}@example.com", Uuid::new_v4());
        let resp = self
            .client
            .post(format!("{}/api/register", self.base_url))
            .json(&json!({
                "first_name": "Test",
                "last_name": "Shopper",
                "email": email,
                "password": "correct-horse-battery",
            }))
            .send()
            .await
            .expect("Failed to register shopper");

        assert_eq!(resp.status(), 201, "registration should succeed");
        let body: Value = resp.json().await.expect("Failed to parse register response");
        let token = body
            .get("token")
            .and_then(Value::as_str)
            .expect("register response carries a token")
            .to_owned();
        let user = body.get("user").cloned().expect("register response carries the user");
        (token, user)
    }

    /// Log in and return the bearer token.
    ///
    /// # Panics
    ///
    /// Panics when the server is unreachable or the credentials are
    /// rejected.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let resp = self
            .client
            .post(format!("{}/api/login", self.base_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to log in");

        assert_eq!(resp.status(), 200, "login should succeed");
        let body: Value = resp.json().await.expect("Failed to parse login response");
        body.get("token")
            .and_then(Value::as_str)
            .expect("login response carries a token")
            .to_owned()
    }

    /// Log in as the test admin.
    ///
    /// # Panics
    ///
    /// Panics when the admin account does not exist; create it with
    /// `hemline admin create` first.
    pub async fn admin_token(&self) -> String {
        let (email, password) = admin_credentials();
        self.login(&email, &password).await
    }

    /// Catalog products with stock, for cart and checkout tests.
    ///
    /// # Panics
    ///
    /// Panics when the catalog has fewer than `count` stocked products;
    /// run `hemline seed` first.
    pub async fn products_with_stock(&self, count: usize) -> Vec<Value> {
        let resp = self
            .client
            .get(format!("{}/api/products", self.base_url))
            .send()
            .await
            .expect("Failed to list products");

        assert_eq!(resp.status(), 200);
        let products: Vec<Value> = resp.json().await.expect("Failed to parse product list");
        let stocked: Vec<Value> = products
            .into_iter()
            .filter(|p| p.get("stock").and_then(Value::as_i64).unwrap_or(0) > 0)
            .take(count)
            .collect();
        assert!(
            stocked.len() >= count,
            "catalog needs at least {count} stocked products; run `hemline seed`"
        );
        stocked
    }

    /// Add a catalog product to the cart, selecting the first size with
    /// stock when the product differentiates sizes.
    ///
    /// Returns the cart item from the response.
    ///
    /// # Panics
    ///
    /// Panics when the add is rejected.
    pub async fn add_to_cart(&self, token: &str, product: &Value, quantity: i64) -> Value {
        let resp = self
            .client
            .post(format!("{}/api/cart", self.base_url))
            .bearer_auth(token)
            .json(&json!({
                "product_name": product.get("name"),
                "product_id": product.get("id"),
                "price": product.get("price"),
                "quantity": quantity,
                "size": first_size(product),
            }))
            .send()
            .await
            .expect("Failed to add to cart");

        assert_eq!(resp.status(), 200, "add to cart should succeed");
        let body: Value = resp.json().await.expect("Failed to parse cart response");
        body.get("item").cloned().expect("cart response carries the item")
    }

    /// The caller's cart items.
    ///
    /// # Panics
    ///
    /// Panics when the cart cannot be fetched.
    pub async fn cart_items(&self, token: &str) -> Vec<Value> {
        let resp = self
            .client
            .get(format!("{}/api/cart", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to fetch cart");

        assert_eq!(resp.status(), 200);
        resp.json().await.expect("Failed to parse cart")
    }
}

/// First size label with positive stock, if the product differentiates
/// sizes.
#[must_use]
pub fn first_size(product: &Value) -> Option<String> {
    product
        .get("sizes")
        .and_then(Value::as_object)
        .and_then(|sizes| {
            sizes
                .iter()
                .find(|(_, qty)| qty.as_i64().unwrap_or(0) > 0)
                .map(|(label, _)| label.clone())
        })
}
