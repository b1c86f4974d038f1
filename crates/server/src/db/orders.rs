//! Order repository.
//!
//! Order placement is a single transaction: the order row, its line
//! items, best-effort stock decrements and the cart wipe either all land
//! or none do.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use hemline_core::{OrderId, OrderItemId, Price, UserId};

use super::RepositoryError;
use crate::models::{NewOrder, Order, OrderItem, ShippingAddress, customer_display_name};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    total_amount: i64,
    status: String,
    payment_status: Option<String>,
    payment_method: String,
    utr_number: Option<String>,
    shipping_address: Option<Json<ShippingAddress>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            total_amount: Price::new(row.total_amount),
            status: row.status,
            payment_status: row.payment_status,
            payment_method: row.payment_method,
            utr_number: row.utr_number,
            shipping_address: row.shipping_address.map(|json| json.0),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Internal row type for `PostgreSQL` order item queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    product_name: String,
    price: i64,
    quantity: i32,
    size: Option<String>,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: OrderItemId::new(row.id),
            order_id: OrderId::new(row.order_id),
            product_name: row.product_name,
            price: Price::new(row.price),
            quantity: row.quantity,
            size: row.size,
        }
    }
}

/// Order row joined with the owning account's name fields. The join is a
/// LEFT JOIN so orders survive account deletion.
#[derive(Debug, sqlx::FromRow)]
struct OrderCustomerRow {
    #[sqlx(flatten)]
    order: OrderRow,
    first_name: Option<String>,
    last_name: Option<String>,
    customer_email: Option<String>,
    customer_phone: Option<String>,
}

/// Customer contact details attached to an order.
#[derive(Debug, Clone)]
pub struct OrderCustomer {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl OrderCustomerRow {
    fn customer(&self) -> OrderCustomer {
        OrderCustomer {
            name: customer_display_name(
                self.first_name.as_deref(),
                self.last_name.as_deref(),
                self.customer_email.as_deref(),
            ),
            email: self.customer_email.clone(),
            phone: self.customer_phone.clone(),
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist an order: the order row, its items, stock decrements for
    /// every item that still references a product, and the cart wipe.
    ///
    /// Decrements against products that no longer exist are logged and
    /// skipped; the order itself still goes through.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn create(&self, new_order: &NewOrder) -> Result<OrderId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order_id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO store.order
                (user_id, total_amount, payment_method, utr_number, shipping_address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(new_order.user_id.as_i32())
        .bind(new_order.total_amount.minor_units())
        .bind(&new_order.payment_method)
        .bind(&new_order.utr_number)
        .bind(new_order.shipping_address.as_ref().map(Json))
        .fetch_one(&mut *tx)
        .await?;

        for item in &new_order.items {
            sqlx::query(
                r"
                INSERT INTO store.order_item (order_id, product_name, price, quantity, size)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(order_id)
            .bind(&item.product_name)
            .bind(item.price.minor_units())
            .bind(item.quantity)
            .bind(&item.size)
            .execute(&mut *tx)
            .await?;
        }

        for decrement in &new_order.decrements {
            let updated = sqlx::query(
                r"
                UPDATE store.product
                SET stock = stock - $2, updated_at = NOW()
                WHERE id = $1
                ",
            )
            .bind(decrement.product_id.as_i32())
            .bind(decrement.quantity)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if updated == 0 {
                tracing::warn!(
                    product_id = %decrement.product_id,
                    "Skipping stock decrement for missing product"
                );
                continue;
            }

            if let Some(size) = &decrement.size {
                sqlx::query(
                    r"
                    UPDATE store.product
                    SET sizes = jsonb_set(
                            COALESCE(sizes, '{}'::jsonb),
                            ARRAY[$2],
                            to_jsonb(COALESCE((sizes ->> $2)::bigint, 0) - $3),
                            true
                        )
                    WHERE id = $1
                    ",
                )
                .bind(decrement.product_id.as_i32())
                .bind(size)
                .bind(decrement.quantity)
                .execute(&mut *tx)
                .await?;
            }
        }

        // The cart is wiped even when some decrements were skipped.
        sqlx::query("DELETE FROM store.cart_item WHERE user_id = $1")
            .bind(new_order.user_id.as_i32())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(OrderId::new(order_id))
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, total_amount, status, payment_status,
                   payment_method, utr_number, shipping_address, created_at,
                   updated_at
            FROM store.order
            WHERE user_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List every order, newest first, with the customer display name
    /// resolved from the joined account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all_with_customers(
        &self,
    ) -> Result<Vec<(Order, String)>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderCustomerRow>(
            r"
            SELECT o.id, o.user_id, o.total_amount, o.status, o.payment_status,
                   o.payment_method, o.utr_number, o.shipping_address,
                   o.created_at, o.updated_at,
                   u.first_name, u.last_name,
                   u.email AS customer_email, u.phone AS customer_phone
            FROM store.order o
            LEFT JOIN store.user u ON u.id = o.user_id
            ORDER BY o.created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let name = row.customer().name;
                (row.order.into(), name)
            })
            .collect())
    }

    /// Get one order together with its customer contact details.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_customer(
        &self,
        id: OrderId,
    ) -> Result<Option<(Order, OrderCustomer)>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderCustomerRow>(
            r"
            SELECT o.id, o.user_id, o.total_amount, o.status, o.payment_status,
                   o.payment_method, o.utr_number, o.shipping_address,
                   o.created_at, o.updated_at,
                   u.first_name, u.last_name,
                   u.email AS customer_email, u.phone AS customer_phone
            FROM store.order o
            LEFT JOIN store.user u ON u.id = o.user_id
            WHERE o.id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|row| {
            let customer = row.customer();
            (row.order.into(), customer)
        }))
    }

    /// Fetch the line items of every listed order in one query.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items_for_orders(
        &self,
        ids: &[OrderId],
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        let raw_ids: Vec<i32> = ids.iter().map(OrderId::as_i32).collect();

        let rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT id, order_id, product_name, price, quantity, size
            FROM store.order_item
            WHERE order_id = ANY($1)
            ORDER BY id ASC
            ",
        )
        .bind(&raw_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Update an order's fulfilment and/or payment status. Fields left as
    /// `None` keep their stored value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: Option<&str>,
        payment_status: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE store.order
            SET status = COALESCE($2, status),
                payment_status = COALESCE($3, payment_status),
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .bind(status)
        .bind(payment_status)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete an order and its line items. Returns `true` if the order
    /// existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM store.order_item WHERE order_id = $1")
            .bind(id.as_i32())
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM store.order WHERE id = $1")
            .bind(id.as_i32())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        Ok(deleted > 0)
    }
}
