//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use hemline_core::OrderId;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::middleware::{RequireAdmin, RequireUser};
use crate::models::{OrderDetails, OrderSummary, OrderWithItems};
use crate::routes::MessageResponse;
use crate::services::{CheckoutRequest, OrderService};
use crate::state::AppState;

/// Response after placing an order.
#[derive(Debug, Serialize)]
pub struct PlaceOrderResponse {
    pub message: &'static str,
    pub order_id: OrderId,
}

/// Admin request for updating an order.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    pub status: Option<String>,
    pub payment_status: Option<String>,
}

// =============================================================================
// Customer Handlers
// =============================================================================

/// Place an order and empty the caller's cart.
///
/// # Errors
///
/// Returns 400 for empty items, bad totals, a missing payment method or
/// an invalid UTR; 404 when the shipping address is not the caller's.
pub async fn place(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<PlaceOrderResponse>)> {
    let order_id = OrderService::new(state.pool())
        .place(claims.sub, request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PlaceOrderResponse {
            message: "Order created successfully",
            order_id,
        }),
    ))
}

/// List the caller's orders, newest first, with their items.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn my_orders(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderWithItems>>> {
    let orders = OrderService::new(state.pool())
        .history_for_user(claims.sub)
        .await?;

    Ok(Json(orders))
}

// =============================================================================
// Admin Handlers
// =============================================================================

/// List every order with its customer name and items.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn admin_list(
    RequireAdmin(_claims): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderSummary>>> {
    let orders = OrderService::new(state.pool()).admin_list().await?;

    Ok(Json(orders))
}

/// Get one order with customer contact details.
///
/// # Errors
///
/// Returns 404 when the order does not exist.
pub async fn admin_details(
    RequireAdmin(_claims): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetails>> {
    let details = OrderService::new(state.pool()).admin_details(id).await?;

    Ok(Json(details))
}

/// Update an order's status and/or payment status.
///
/// # Errors
///
/// Returns 404 when the order does not exist.
pub async fn admin_update(
    RequireAdmin(_claims): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<UpdateOrderRequest>,
) -> Result<Json<MessageResponse>> {
    OrderService::new(state.pool())
        .admin_update(id, body.status.as_deref(), body.payment_status.as_deref())
        .await?;

    Ok(Json(MessageResponse::new("Order updated successfully")))
}

/// Delete an order and its line items.
///
/// # Errors
///
/// Returns 404 when the order does not exist.
pub async fn admin_remove(
    RequireAdmin(_claims): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<MessageResponse>> {
    OrderService::new(state.pool()).admin_delete(id).await?;

    Ok(Json(MessageResponse::new("Order deleted successfully")))
}
