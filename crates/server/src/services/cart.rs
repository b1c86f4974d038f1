//! Cart service.
//!
//! Stamps the owner's display name onto rows, folds repeat adds into a
//! quantity bump and checks per-size stock before quantity updates.

use sqlx::PgPool;

use hemline_core::{CartItemId, UserId};

use crate::db::{CartRepository, ProductRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::models::{CartItem, CartSelection, NewCartItem};

/// Cart service.
pub struct CartService<'a> {
    carts: CartRepository<'a>,
    products: ProductRepository<'a>,
    users: UserRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            carts: CartRepository::new(pool),
            products: ProductRepository::new(pool),
            users: UserRepository::new(pool),
        }
    }

    /// List the user's cart in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<CartItem>> {
        Ok(self.carts.list_for_user(user_id).await?)
    }

    /// Add a selection to the cart. Adding the same `(product, size)`
    /// again bumps the existing row's quantity by one and refreshes the
    /// stamped display name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the product name is blank.
    /// Returns `AppError::NotFound` if the account no longer exists.
    pub async fn add_item(&self, user_id: UserId, selection: CartSelection) -> Result<CartItem> {
        if selection.product_name.trim().is_empty() {
            return Err(AppError::Validation("Product name is required".to_owned()));
        }

        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;
        let username = user.display_name();

        if let Some(existing) = self
            .carts
            .find(user_id, &selection.product_name, selection.size.as_deref())
            .await?
        {
            return Ok(self.carts.increment(existing.id, &username).await?);
        }

        let new_item = NewCartItem {
            user_id,
            username,
            product_name: selection.product_name,
            product_id: selection.product_id,
            price: selection.price,
            quantity: initial_quantity(selection.quantity),
            size: selection.size,
        };
        Ok(self.carts.insert(&new_item).await?)
    }

    /// Set a cart item's quantity, refusing amounts beyond the stock
    /// available for the item's size.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the quantity is below one.
    /// Returns `AppError::NotFound` if the item is not in the user's cart.
    /// Returns `AppError::Stock` if the requested quantity exceeds stock.
    pub async fn update_quantity(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<CartItem> {
        if quantity < 1 {
            return Err(AppError::Validation("Valid quantity is required".to_owned()));
        }

        let item = self
            .carts
            .get_for_user(item_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found".to_owned()))?;

        // Rows without a product reference (or whose product has been
        // deleted since) skip the stock check.
        let product = match item.product_id {
            Some(product_id) => self.products.get(product_id).await?,
            None => None,
        };
        if let Some(product) = product {
            let available = product.available_stock(item.size.as_deref());
            if i64::from(quantity) > available {
                return Err(AppError::Stock(format!(
                    "Only {available} items available for this size"
                )));
            }
        }

        Ok(self.carts.update_quantity(item_id, user_id, quantity).await?)
    }

    /// Remove one cart item.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the item is not in the user's cart.
    pub async fn remove_item(&self, user_id: UserId, item_id: CartItemId) -> Result<()> {
        if self.carts.delete(item_id, user_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Item not found".to_owned()))
        }
    }

    /// Empty the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn clear(&self, user_id: UserId) -> Result<()> {
        let removed = self.carts.clear(user_id).await?;
        tracing::debug!(user_id = %user_id, removed, "Cart cleared");
        Ok(())
    }
}

/// New rows default to a quantity of one; anything below one in the
/// request is ignored.
fn initial_quantity(requested: Option<i32>) -> i32 {
    requested.filter(|qty| *qty >= 1).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_quantity_defaults_to_one() {
        assert_eq!(initial_quantity(None), 1);
        assert_eq!(initial_quantity(Some(0)), 1);
        assert_eq!(initial_quantity(Some(-3)), 1);
        assert_eq!(initial_quantity(Some(1)), 1);
        assert_eq!(initial_quantity(Some(4)), 4);
    }
}
