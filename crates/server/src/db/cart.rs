//! Cart repository.
//!
//! Cart rows are keyed per user on `(product_name, size)`; a missing size
//! is treated as the empty string so the same unsized product always lands
//! on the same row.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use hemline_core::{CartItemId, Price, ProductId, UserId};

use super::RepositoryError;
use crate::models::{CartItem, NewCartItem};

/// Internal row type for `PostgreSQL` cart queries.
#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: i32,
    user_id: i32,
    username: String,
    product_name: String,
    product_id: Option<i32>,
    price: i64,
    quantity: i32,
    size: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: CartItemId::new(row.id),
            user_id: UserId::new(row.user_id),
            username: row.username,
            product_name: row.product_name,
            product_id: row.product_id.map(ProductId::new),
            price: Price::new(row.price),
            quantity: row.quantity,
            size: row.size,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's cart in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            r"
            SELECT id, user_id, username, product_name, product_id, price,
                   quantity, size, created_at, updated_at
            FROM store.cart_item
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Find the row a `(product_name, size)` selection would land on.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find(
        &self,
        user_id: UserId,
        product_name: &str,
        size: Option<&str>,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(
            r"
            SELECT id, user_id, username, product_name, product_id, price,
                   quantity, size, created_at, updated_at
            FROM store.cart_item
            WHERE user_id = $1
              AND product_name = $2
              AND COALESCE(size, '') = COALESCE($3, '')
            ",
        )
        .bind(user_id.as_i32())
        .bind(product_name)
        .bind(size)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Get a cart item scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        id: CartItemId,
        user_id: UserId,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(
            r"
            SELECT id, user_id, username, product_name, product_id, price,
                   quantity, size, created_at, updated_at
            FROM store.cart_item
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Insert a new cart item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a row for the same selection
    /// already exists.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn insert(&self, item: &NewCartItem) -> Result<CartItem, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(
            r"
            INSERT INTO store.cart_item
                (user_id, username, product_name, product_id, price, quantity, size)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, username, product_name, product_id, price,
                      quantity, size, created_at, updated_at
            ",
        )
        .bind(item.user_id.as_i32())
        .bind(&item.username)
        .bind(&item.product_name)
        .bind(item.product_id.map(|id| id.as_i32()))
        .bind(item.price.minor_units())
        .bind(item.quantity)
        .bind(&item.size)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("cart item already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }

    /// Bump a cart item's quantity by one and refresh the stamped display
    /// name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn increment(
        &self,
        id: CartItemId,
        username: &str,
    ) -> Result<CartItem, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(
            r"
            UPDATE store.cart_item
            SET quantity = quantity + 1, username = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, username, product_name, product_id, price,
                      quantity, size, created_at, updated_at
            ",
        )
        .bind(id.as_i32())
        .bind(username)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Set a cart item's quantity, scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item does not exist or
    /// belongs to another user.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_quantity(
        &self,
        id: CartItemId,
        user_id: UserId,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(
            r"
            UPDATE store.cart_item
            SET quantity = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, username, product_name, product_id, price,
                      quantity, size, created_at, updated_at
            ",
        )
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .bind(quantity)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Remove a cart item scoped to its owner. Returns `true` if a row was
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: CartItemId, user_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM store.cart_item
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove every cart item a user has. Returns the number of rows
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM store.cart_item WHERE user_id = $1")
            .bind(user_id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
