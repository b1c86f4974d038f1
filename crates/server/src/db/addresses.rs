//! Address book repository.
//!
//! Every read and write is scoped to the owning user; marking an address
//! as default clears the flag from the user's other addresses in the same
//! transaction.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use hemline_core::{AddressId, UserId};

use super::RepositoryError;
use crate::models::{Address, AddressInput};

/// Internal row type for `PostgreSQL` address queries.
#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    id: i32,
    user_id: i32,
    kind: String,
    name: String,
    email: Option<String>,
    phone: String,
    house: String,
    street: String,
    city: String,
    state: String,
    zip_code: String,
    country: String,
    is_default: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: AddressId::new(row.id),
            user_id: UserId::new(row.user_id),
            kind: row.kind,
            name: row.name,
            email: row.email,
            phone: row.phone,
            house: row.house,
            street: row.street,
            city: row.city,
            state: row.state,
            zip_code: row.zip_code,
            country: row.country,
            is_default: row.is_default,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's addresses, default first, then newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query_as::<_, AddressRow>(
            r"
            SELECT id, user_id, kind, name, email, phone, house, street, city,
                   state, zip_code, country, is_default, created_at, updated_at
            FROM store.address
            WHERE user_id = $1
            ORDER BY is_default DESC, created_at DESC
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get an address scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        id: AddressId,
        user_id: UserId,
    ) -> Result<Option<Address>, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(
            r"
            SELECT id, user_id, kind, name, email, phone, house, street, city,
                   state, zip_code, country, is_default, created_at, updated_at
            FROM store.address
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create an address for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn create(
        &self,
        user_id: UserId,
        input: &AddressInput,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if input.is_default {
            sqlx::query("UPDATE store.address SET is_default = FALSE WHERE user_id = $1")
                .bind(user_id.as_i32())
                .execute(&mut *tx)
                .await?;
        }

        let row = sqlx::query_as::<_, AddressRow>(
            r"
            INSERT INTO store.address
                (user_id, kind, name, email, phone, house, street, city, state,
                 zip_code, country, is_default)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, user_id, kind, name, email, phone, house, street,
                      city, state, zip_code, country, is_default, created_at,
                      updated_at
            ",
        )
        .bind(user_id.as_i32())
        .bind(&input.kind)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.house)
        .bind(&input.street)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.zip_code)
        .bind(&input.country)
        .bind(input.is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    /// Replace an address, scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist or
    /// belongs to another user.
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn update(
        &self,
        id: AddressId,
        user_id: UserId,
        input: &AddressInput,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if input.is_default {
            sqlx::query(
                r"
                UPDATE store.address
                SET is_default = FALSE
                WHERE user_id = $1 AND id <> $2
                ",
            )
            .bind(user_id.as_i32())
            .bind(id.as_i32())
            .execute(&mut *tx)
            .await?;
        }

        let row = sqlx::query_as::<_, AddressRow>(
            r"
            UPDATE store.address
            SET kind = $3,
                name = $4,
                email = $5,
                phone = $6,
                house = $7,
                street = $8,
                city = $9,
                state = $10,
                zip_code = $11,
                country = $12,
                is_default = $13,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, kind, name, email, phone, house, street,
                      city, state, zip_code, country, is_default, created_at,
                      updated_at
            ",
        )
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .bind(&input.kind)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.house)
        .bind(&input.street)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.zip_code)
        .bind(&input.country)
        .bind(input.is_default)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;

        Ok(row.into())
    }

    /// Remove an address scoped to its owner. Returns `true` if a row was
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: AddressId, user_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM store.address
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
