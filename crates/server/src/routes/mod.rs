//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST /api/register                        - Create an account
//! POST /api/login                           - Email/password login
//! GET  /auth/google                         - Redirect to Google consent
//! GET  /auth/google/callback                - Handle OAuth callback
//!
//! # Catalog (public)
//! GET  /api/products                        - Product listing (?category=&collection=)
//! GET  /api/products/{id}                   - Product detail
//! GET  /api/categories                      - Category listing
//!
//! # Cart (requires auth)
//! GET    /api/cart                          - List cart items
//! POST   /api/cart                          - Add item (repeat add increments)
//! PUT    /api/cart/{id}                     - Update quantity
//! DELETE /api/cart/{id}                     - Remove item
//! DELETE /api/cart                          - Clear cart
//!
//! # Orders (requires auth)
//! GET  /api/orders                          - Own order history
//! POST /api/orders                          - Place an order
//!
//! # Addresses (requires auth)
//! GET    /api/user/addresses                - List saved addresses
//! POST   /api/user/addresses                - Add address
//! PUT    /api/user/addresses/{id}           - Update address
//! DELETE /api/user/addresses/{id}           - Delete address
//!
//! # Profile (requires auth)
//! GET /api/profile                          - Own account
//! PUT /api/profile                          - Update name/phone
//!
//! # Admin catalog
//! POST   /api/products                      - Create product (multipart)
//! PUT    /api/admin/products/{id}           - Update product (multipart)
//! DELETE /api/admin/products/{id}           - Delete product
//! POST   /api/admin/products/{id}/add-stock - Add stock quantities
//! POST   /api/admin/products/group          - Link products as colour variants
//! POST   /api/admin/products/ungroup        - Unlink colour variants
//! POST   /api/categories                    - Create category
//! GET    /api/admin/categories              - Category listing (admin)
//! POST   /api/admin/categories              - Create category
//!
//! # Admin orders
//! GET    /api/admin/orders                  - All orders with customers
//! PUT    /api/admin/orders/{id}             - Update status/payment status
//! DELETE /api/admin/orders/{id}             - Delete order
//! GET    /api/admin/orders/{id}/details     - Order with customer contact
//!
//! # Admin users
//! GET    /api/admin/users                   - All accounts
//! POST   /api/admin/users                   - Create account (role settable)
//! PUT    /api/admin/users/{id}              - Update account
//! DELETE /api/admin/users/{id}              - Delete account and its data
//! ```

pub mod addresses;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;
pub mod profile;
pub mod users;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};
use serde::Serialize;

use crate::state::AppState;

/// Largest accepted product form, dominated by image uploads.
const PRODUCT_FORM_LIMIT: usize = 20 * 1024 * 1024;

/// Plain `{"message": …}` acknowledgement body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    #[must_use]
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}

/// Create the auth routes router.
pub fn auth_routes(google_enabled: bool) -> Router<AppState> {
    let router = Router::new()
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login));

    if google_enabled {
        router
            .route("/auth/google", get(auth::google_login))
            .route("/auth/google/callback", get(auth::google_callback))
    } else {
        router
    }
}

/// Create the product routes router, public and admin.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/products",
            get(products::list).post(products::create),
        )
        .route("/api/products/{id}", get(products::show))
        .route(
            "/api/admin/products/{id}",
            put(products::update).delete(products::remove),
        )
        .route(
            "/api/admin/products/{id}/add-stock",
            post(products::add_stock),
        )
        .route("/api/admin/products/group", post(products::group))
        .route("/api/admin/products/ungroup", post(products::ungroup))
        .layer(DefaultBodyLimit::max(PRODUCT_FORM_LIMIT))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/api/admin/categories",
            get(categories::admin_list).post(categories::create),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/cart",
            get(cart::list).post(cart::add).delete(cart::clear),
        )
        .route(
            "/api/cart/{id}",
            put(cart::update).delete(cart::remove),
        )
}

/// Create the order routes router, customer and admin.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(orders::my_orders).post(orders::place))
        .route("/api/admin/orders", get(orders::admin_list))
        .route(
            "/api/admin/orders/{id}",
            put(orders::admin_update).delete(orders::admin_remove),
        )
        .route("/api/admin/orders/{id}/details", get(orders::admin_details))
}

/// Create the address book routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/user/addresses",
            get(addresses::list).post(addresses::create),
        )
        .route(
            "/api/user/addresses/{id}",
            put(addresses::update).delete(addresses::remove),
        )
}

/// Create the profile routes router.
pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/api/profile", get(profile::show).put(profile::update))
}

/// Create the admin user management routes router.
pub fn admin_user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/users", get(users::list).post(users::create))
        .route(
            "/api/admin/users/{id}",
            put(users::update).delete(users::remove),
        )
}

/// Create all routes for the API.
///
/// Google login routes are mounted only when OAuth credentials are
/// configured.
pub fn routes(google_enabled: bool) -> Router<AppState> {
    Router::new()
        .merge(auth_routes(google_enabled))
        .merge(product_routes())
        .merge(category_routes())
        .merge(cart_routes())
        .merge(order_routes())
        .merge(address_routes())
        .merge(profile_routes())
        .merge(admin_user_routes())
}
