use chrono::{DateTime, Utc};
use hemline_core::{CartItemId, Price, ProductId, UserId};
use serde::{Deserialize, Serialize};

/// One cart row. Rows are unique per (user, product name, size); adding
/// the same selection again increments the quantity instead.
#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub username: String,
    pub product_name: String,
    pub product_id: Option<ProductId>,
    pub price: Price,
    pub quantity: i32,
    pub size: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a fresh cart row.
#[derive(Debug, Clone)]
pub struct NewCartItem {
    pub user_id: UserId,
    pub username: String,
    pub product_name: String,
    pub product_id: Option<ProductId>,
    pub price: Price,
    pub quantity: i32,
    pub size: Option<String>,
}

/// A product selection arriving from the storefront. The quantity is
/// optional and only honored for brand-new rows. Field aliases accept
/// the camelCase names older storefront builds send.
#[derive(Debug, Clone, Deserialize)]
pub struct CartSelection {
    #[serde(alias = "productName")]
    pub product_name: String,
    #[serde(default, alias = "productId")]
    pub product_id: Option<ProductId>,
    pub price: Price,
    pub quantity: Option<i32>,
    pub size: Option<String>,
}
