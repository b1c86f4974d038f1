//! Order service.
//!
//! Checkout validation, server-side price re-derivation, the cash-on-
//! delivery charge and order views for customers and admins.

use std::collections::HashMap;

use serde::Deserialize;
use sqlx::PgPool;

use hemline_core::{AddressId, OrderId, Price, ProductId, UserId};

use crate::db::{AddressRepository, OrderRepository, ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::models::{
    NewOrder, NewOrderItem, OrderDetails, OrderItemView, OrderSummary, OrderWithItems,
    ShippingAddress, StockDecrement,
};

/// Fixed charge appended as its own line item on cash-on-delivery orders.
pub const COD_CHARGE: Price = Price::new(1000);

/// Line-item name of the cash-on-delivery charge.
pub const COD_CHARGE_NAME: &str = "Cash on Delivery Charge";

pub const PAYMENT_METHOD_COD: &str = "cod";
pub const PAYMENT_METHOD_UPI: &str = "upi";

/// UPI transaction references are exactly twelve digits.
const UTR_LENGTH: usize = 12;

/// Checkout payload. Field aliases accept the camelCase names older
/// storefront builds send.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub items: Vec<CheckoutItem>,
    #[serde(default, alias = "totalAmount")]
    pub total_amount: Option<Price>,
    #[serde(default, alias = "paymentMethod")]
    pub payment_method: Option<String>,
    #[serde(default, alias = "utrNumber")]
    pub utr_number: Option<String>,
    #[serde(default, alias = "shippingAddressId")]
    pub shipping_address_id: Option<AddressId>,
}

/// One line of the checkout payload. The client price is only trusted
/// when the product no longer exists in the catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutItem {
    #[serde(default, alias = "productId")]
    pub product_id: Option<ProductId>,
    #[serde(alias = "productName")]
    pub product_name: String,
    pub price: Price,
    pub quantity: i32,
    pub size: Option<String>,
}

/// Order service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
    products: ProductRepository<'a>,
    addresses: AddressRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            products: ProductRepository::new(pool),
            addresses: AddressRepository::new(pool),
        }
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Validate and place an order.
    ///
    /// Prices are re-derived from the catalog, cash-on-delivery orders
    /// gain the fixed charge, and the snapshot of the chosen shipping
    /// address is embedded into the order. The cart is emptied in the
    /// same transaction.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for an empty or malformed payload.
    /// Returns `AppError::NotFound` if the shipping address is not in the
    /// user's address book.
    pub async fn place(&self, user_id: UserId, request: CheckoutRequest) -> Result<OrderId> {
        if request.items.is_empty() {
            return Err(AppError::Validation("Items are required".to_owned()));
        }
        if !request.total_amount.unwrap_or(Price::ZERO).is_positive() {
            return Err(AppError::Validation(
                "Valid total amount is required".to_owned(),
            ));
        }
        let payment_method = match request.payment_method {
            Some(method) if !method.trim().is_empty() => method,
            _ => {
                return Err(AppError::Validation(
                    "Payment method is required".to_owned(),
                ));
            }
        };

        let utr_number = validate_payment(&payment_method, request.utr_number.as_deref())?;

        let shipping_address = match request.shipping_address_id {
            Some(address_id) => {
                let address = self
                    .addresses
                    .get_for_user(address_id, user_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Address not found".to_owned()))?;
                Some(ShippingAddress::from(&address))
            }
            None => None,
        };

        let catalog_prices = self.catalog_prices(&request.items).await?;
        let (items, decrements, total_amount) =
            assemble_items(&request.items, &catalog_prices, &payment_method);

        let new_order = NewOrder {
            user_id,
            total_amount,
            payment_method,
            utr_number,
            shipping_address,
            items,
            decrements,
        };

        let order_id = self.orders.create(&new_order).await?;
        tracing::info!(
            order_id = %order_id,
            user_id = %user_id,
            total = %total_amount,
            "Order placed"
        );
        Ok(order_id)
    }

    /// Current catalog price for every item that still references a
    /// product.
    async fn catalog_prices(
        &self,
        items: &[CheckoutItem],
    ) -> Result<HashMap<ProductId, Price>> {
        let ids: Vec<ProductId> = items.iter().filter_map(|item| item.product_id).collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let products = self.products.get_by_ids(&ids).await?;
        Ok(products
            .into_iter()
            .map(|product| (product.id, product.price))
            .collect())
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// A user's order history, newest first, with line items attached.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if a query fails.
    pub async fn history_for_user(&self, user_id: UserId) -> Result<Vec<OrderWithItems>> {
        let orders = self.orders.list_for_user(user_id).await?;
        let ids: Vec<OrderId> = orders.iter().map(|order| order.id).collect();
        let mut items = self.items_grouped(&ids).await?;

        Ok(orders
            .into_iter()
            .map(|order| OrderWithItems {
                items: items.remove(&order.id).unwrap_or_default(),
                order,
            })
            .collect())
    }

    /// Every order with customer names and line items, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if a query fails.
    pub async fn admin_list(&self) -> Result<Vec<OrderSummary>> {
        let orders = self.orders.list_all_with_customers().await?;
        let ids: Vec<OrderId> = orders.iter().map(|(order, _)| order.id).collect();
        let mut items = self.items_grouped(&ids).await?;

        Ok(orders
            .into_iter()
            .map(|(order, customer_name)| OrderSummary {
                items: items.remove(&order.id).unwrap_or_default(),
                customer_name,
                order,
            })
            .collect())
    }

    /// Full admin view of one order, including customer contact details.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the order does not exist.
    pub async fn admin_details(&self, id: OrderId) -> Result<OrderDetails> {
        let (order, customer) = self
            .orders
            .get_with_customer(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

        let mut items = self.items_grouped(&[id]).await?;

        Ok(OrderDetails {
            items: items.remove(&id).unwrap_or_default(),
            customer_name: customer.name,
            customer_email: customer.email,
            customer_phone: customer.phone,
            order,
        })
    }

    /// Update an order's fulfilment and/or payment status.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the order does not exist.
    pub async fn admin_update(
        &self,
        id: OrderId,
        status: Option<&str>,
        payment_status: Option<&str>,
    ) -> Result<()> {
        match self.orders.update_status(id, status, payment_status).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => {
                Err(AppError::NotFound("Order not found".to_owned()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete an order and its line items.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the order does not exist.
    pub async fn admin_delete(&self, id: OrderId) -> Result<()> {
        if self.orders.delete(id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Order not found".to_owned()))
        }
    }

    async fn items_grouped(
        &self,
        ids: &[OrderId],
    ) -> Result<HashMap<OrderId, Vec<OrderItemView>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut grouped: HashMap<OrderId, Vec<OrderItemView>> = HashMap::new();
        for item in self.orders.items_for_orders(ids).await? {
            grouped.entry(item.order_id).or_default().push(item.into());
        }
        Ok(grouped)
    }
}

// =============================================================================
// Checkout Helpers
// =============================================================================

/// Builds the persisted line items, the stock decrements and the
/// server-side total. Catalog prices win over client prices whenever the
/// product still exists; cash-on-delivery orders gain the fixed charge
/// as a final line.
fn assemble_items(
    items: &[CheckoutItem],
    catalog_prices: &HashMap<ProductId, Price>,
    payment_method: &str,
) -> (Vec<NewOrderItem>, Vec<StockDecrement>, Price) {
    let mut lines = Vec::with_capacity(items.len() + 1);
    let mut decrements = Vec::new();
    let mut total = Price::ZERO;

    for item in items {
        let unit_price = item
            .product_id
            .and_then(|id| catalog_prices.get(&id).copied())
            .unwrap_or_else(|| {
                if item.product_id.is_some() {
                    tracing::warn!(
                        product_name = %item.product_name,
                        "Checkout item references a missing product, keeping client price"
                    );
                }
                item.price
            });

        total += unit_price.times(i64::from(item.quantity));

        lines.push(NewOrderItem {
            product_name: item.product_name.clone(),
            price: unit_price,
            quantity: item.quantity,
            size: item.size.clone(),
        });

        if let Some(product_id) = item.product_id {
            decrements.push(StockDecrement {
                product_id,
                quantity: i64::from(item.quantity),
                size: item.size.clone(),
            });
        }
    }

    if payment_method == PAYMENT_METHOD_COD {
        lines.push(NewOrderItem {
            product_name: COD_CHARGE_NAME.to_owned(),
            price: COD_CHARGE,
            quantity: 1,
            size: None,
        });
        total += COD_CHARGE;
    }

    (lines, decrements, total)
}

/// UPI orders must carry a twelve-digit UTR reference; other methods
/// store no UTR at all.
fn validate_payment(method: &str, utr: Option<&str>) -> Result<Option<String>> {
    if method != PAYMENT_METHOD_UPI {
        return Ok(None);
    }

    let Some(utr) = utr.map(str::trim).filter(|value| !value.is_empty()) else {
        return Err(AppError::Validation(
            "UTR number is required for UPI payments".to_owned(),
        ));
    };
    if !is_valid_utr(utr) {
        return Err(AppError::Validation(
            "UTR number must be exactly 12 digits".to_owned(),
        ));
    }

    Ok(Some(utr.to_owned()))
}

fn is_valid_utr(utr: &str) -> bool {
    utr.len() == UTR_LENGTH && utr.bytes().all(|b| b.is_ascii_digit())
}
