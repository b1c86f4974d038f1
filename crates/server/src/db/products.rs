//! Product repository for catalog storage, stock movements and
//! colour-variant links.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use hemline_core::{Price, ProductId};

use super::RepositoryError;
use crate::models::{ColorLink, Product, ProductInput};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    category: String,
    price: i64,
    description: Option<String>,
    stock: i64,
    sizes: Json<BTreeMap<String, i64>>,
    images: Json<Vec<String>>,
    colors: Json<Vec<ColorLink>>,
    collections: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            category: row.category,
            price: Price::new(row.price),
            description: row.description,
            stock: row.stock,
            sizes: row.sizes.0,
            images: row.images.0,
            colors: row.colors.0,
            collections: row.collections,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products, newest first, optionally narrowed to a category
    /// and/or a collection tag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        category: Option<&str>,
        collection: Option<&str>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, category, price, description, stock, sizes, images,
                   colors, collections, created_at, updated_at
            FROM store.product
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::text IS NULL OR $2 = ANY(collections))
            ORDER BY created_at DESC
            ",
        )
        .bind(category)
        .bind(collection)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, category, price, description, stock, sizes, images,
                   colors, collections, created_at, updated_at
            FROM store.product
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Get every product whose ID appears in `ids`. Missing IDs are simply
    /// absent from the result.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let raw_ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();

        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, category, price, description, stock, sizes, images,
                   colors, collections, created_at, updated_at
            FROM store.product
            WHERE id = ANY($1)
            ",
        )
        .bind(&raw_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO store.product
                (name, category, price, description, stock, sizes, images,
                 colors, collections)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, name, category, price, description, stock, sizes,
                      images, colors, collections, created_at, updated_at
            ",
        )
        .bind(&input.name)
        .bind(&input.category)
        .bind(input.price.minor_units())
        .bind(&input.description)
        .bind(input.stock)
        .bind(Json(&input.sizes))
        .bind(Json(&input.images))
        .bind(Json(&input.colors))
        .bind(&input.collections)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Replace every editable field of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE store.product
            SET name = $2,
                category = $3,
                price = $4,
                description = $5,
                stock = $6,
                sizes = $7,
                images = $8,
                colors = $9,
                collections = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, category, price, description, stock, sizes,
                      images, colors, collections, created_at, updated_at
            ",
        )
        .bind(id.as_i32())
        .bind(&input.name)
        .bind(&input.category)
        .bind(input.price.minor_units())
        .bind(&input.description)
        .bind(input.stock)
        .bind(Json(&input.sizes))
        .bind(Json(&input.images))
        .bind(Json(&input.colors))
        .bind(&input.collections)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a product. Returns `true` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM store.product WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Add stock to a product: the aggregate grows by `aggregate_add` and
    /// each `(label, qty)` pair increments its size key, all in one
    /// transaction. The updated product is returned.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn add_stock(
        &self,
        id: ProductId,
        aggregate_add: i64,
        size_adds: &[(String, i64)],
    ) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r"
            UPDATE store.product
            SET stock = stock + $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .bind(aggregate_add)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(RepositoryError::NotFound);
        }

        for (label, qty) in size_adds {
            sqlx::query(
                r"
                UPDATE store.product
                SET sizes = jsonb_set(
                        COALESCE(sizes, '{}'::jsonb),
                        ARRAY[$2],
                        to_jsonb(COALESCE((sizes ->> $2)::bigint, 0) + $3),
                        true
                    )
                WHERE id = $1
                ",
            )
            .bind(id.as_i32())
            .bind(label)
            .bind(*qty)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Overwrite the colour-variant links of each listed product in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn replace_color_links(
        &self,
        links: &[(ProductId, Vec<ColorLink>)],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        for (id, colors) in links {
            sqlx::query(
                r"
                UPDATE store.product
                SET colors = $2, updated_at = NOW()
                WHERE id = $1
                ",
            )
            .bind(id.as_i32())
            .bind(Json(colors))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Remove the listed products from every colour group: links pointing
    /// at them are filtered out of all other products, then their own link
    /// lists are emptied. Both phases run in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn clear_color_links(&self, ids: &[ProductId]) -> Result<(), RepositoryError> {
        let raw_ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            UPDATE store.product
            SET colors = COALESCE(
                    (SELECT jsonb_agg(entry)
                     FROM jsonb_array_elements(colors) AS entry
                     WHERE NOT ((entry ->> 'id')::int = ANY($1))),
                    '[]'::jsonb
                ),
                updated_at = NOW()
            WHERE colors <> '[]'::jsonb
            ",
        )
        .bind(&raw_ids)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
            UPDATE store.product
            SET colors = '[]'::jsonb, updated_at = NOW()
            WHERE id = ANY($1)
            ",
        )
        .bind(&raw_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
