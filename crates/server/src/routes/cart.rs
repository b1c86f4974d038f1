//! Cart route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use hemline_core::CartItemId;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::middleware::RequireUser;
use crate::models::{CartItem, CartSelection};
use crate::routes::MessageResponse;
use crate::services::CartService;
use crate::state::AppState;

/// Request for setting a cart item's quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub quantity: Option<i32>,
}

/// Response carrying the affected cart row.
#[derive(Debug, Serialize)]
pub struct CartItemResponse {
    pub message: &'static str,
    pub item: CartItem,
}

/// List the caller's cart.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn list(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CartItem>>> {
    let items = CartService::new(state.pool()).list(claims.sub).await?;

    Ok(Json(items))
}

/// Add a selection to the caller's cart.
///
/// Re-adding the same product and size bumps the existing row by one.
///
/// # Errors
///
/// Returns 400 for a blank product name, 404 when the account is gone.
pub async fn add(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
    Json(selection): Json<CartSelection>,
) -> Result<Json<CartItemResponse>> {
    let item = CartService::new(state.pool())
        .add_item(claims.sub, selection)
        .await?;

    Ok(Json(CartItemResponse {
        message: "Item added to cart successfully",
        item,
    }))
}

/// Set a cart item's quantity.
///
/// # Errors
///
/// Returns 400 for quantities below one or beyond available stock, 404
/// when the item is not in the caller's cart.
pub async fn update(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<CartItemId>,
    Json(body): Json<UpdateCartRequest>,
) -> Result<Json<CartItemResponse>> {
    let item = CartService::new(state.pool())
        .update_quantity(claims.sub, id, body.quantity.unwrap_or(0))
        .await?;

    Ok(Json(CartItemResponse {
        message: "Cart updated successfully",
        item,
    }))
}

/// Remove one item from the caller's cart.
///
/// # Errors
///
/// Returns 404 when the item is not in the caller's cart.
pub async fn remove(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<CartItemId>,
) -> Result<Json<MessageResponse>> {
    CartService::new(state.pool())
        .remove_item(claims.sub, id)
        .await?;

    Ok(Json(MessageResponse::new(
        "Item removed from cart successfully",
    )))
}

/// Empty the caller's cart.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn clear(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>> {
    CartService::new(state.pool()).clear(claims.sub).await?;

    Ok(Json(MessageResponse::new("Cart cleared successfully")))
}
