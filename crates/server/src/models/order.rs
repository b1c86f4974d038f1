//! Order models. Orders denormalize everything a receipt needs: item
//! names, unit prices and the shipping address as placed.

use chrono::{DateTime, Utc};
use hemline_core::{OrderId, OrderItemId, Price, ProductId, UserId};
use serde::{Deserialize, Serialize};

/// Shipping address snapshot stored on the order. Later edits to the
/// saved address never touch this copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub house: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_amount: Price,
    pub status: String,
    pub payment_status: Option<String>,
    pub payment_method: String,
    pub utr_number: Option<String>,
    pub shipping_address: Option<ShippingAddress>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_name: String,
    pub price: Price,
    pub quantity: i32,
    pub size: Option<String>,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(i64::from(self.quantity))
    }
}

/// Line item as returned by the API, with the line total precomputed.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemView {
    pub id: OrderItemId,
    pub product_name: String,
    pub price: Price,
    pub quantity: i32,
    pub size: Option<String>,
    pub total: Price,
}

impl From<OrderItem> for OrderItemView {
    fn from(item: OrderItem) -> Self {
        let total = item.line_total();
        Self {
            id: item.id,
            product_name: item.product_name,
            price: item.price,
            quantity: item.quantity,
            size: item.size,
            total,
        }
    }
}

/// Customer-facing order history entry.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemView>,
}

/// Admin order list entry, annotated with the customer's display name.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    #[serde(flatten)]
    pub order: Order,
    pub customer_name: String,
    pub items: Vec<OrderItemView>,
}

/// Admin order detail view with customer contact information.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub items: Vec<OrderItemView>,
}

/// Line item ready for persistence, after price re-derivation.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_name: String,
    pub price: Price,
    pub quantity: i32,
    pub size: Option<String>,
}

/// Best-effort stock adjustment carried out inside the order
/// transaction. A missing product is logged and skipped.
#[derive(Debug, Clone)]
pub struct StockDecrement {
    pub product_id: ProductId,
    pub quantity: i64,
    pub size: Option<String>,
}

/// Fully validated and priced order, ready for a single transaction.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub total_amount: Price,
    pub payment_method: String,
    pub utr_number: Option<String>,
    pub shipping_address: Option<ShippingAddress>,
    pub items: Vec<NewOrderItem>,
    pub decrements: Vec<StockDecrement>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total_multiplies_unit_price() {
        let item = OrderItem {
            id: OrderItemId::new(1),
            order_id: OrderId::new(1),
            product_name: "Black Hoodie".to_owned(),
            price: Price::from_major(1899),
            quantity: 3,
            size: Some("M".to_owned()),
        };
        assert_eq!(item.line_total(), Price::from_major(5697));
    }

    #[test]
    fn test_item_view_carries_total() {
        let item = OrderItem {
            id: OrderItemId::new(2),
            order_id: OrderId::new(1),
            product_name: "Denim Jacket".to_owned(),
            price: Price::new(349_900),
            quantity: 2,
            size: None,
        };
        let view = OrderItemView::from(item);
        assert_eq!(view.total, Price::new(699_800));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["total"], 699_800);
    }
}
