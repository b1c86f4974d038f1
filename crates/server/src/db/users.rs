//! User repository for account storage and admin user management.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use hemline_core::{Email, Role, UserId};

use super::RepositoryError;
use crate::models::{AdminUserUpdate, NewUser, User};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` user queries.
///
/// The password hash is never selected here; credential checks go through
/// [`UserAuthRow`].
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    first_name: Option<String>,
    last_name: Option<String>,
    email: String,
    phone: Option<String>,
    role: String,
    google_id: Option<String>,
    profile_image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role = row.role.parse::<Role>().map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id: UserId::new(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email,
            phone: row.phone,
            role,
            google_id: row.google_id,
            profile_image: row.profile_image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Row carrying the stored password hash alongside the account fields.
#[derive(Debug, sqlx::FromRow)]
struct UserAuthRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: Option<String>,
}

/// Per-table row counts from a cascading account deletion.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DeletedUserData {
    pub cart_items: u64,
    pub addresses: u64,
    pub orders: u64,
    pub order_items: u64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, first_name, last_name, email, phone, role, google_id,
                   profile_image, created_at, updated_at
            FROM store.user
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, first_name, last_name, email, phone, role, google_id,
                   profile_image, created_at, updated_at
            FROM store.user
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user and their stored password hash for a credential check.
    ///
    /// Returns `None` when no account exists for the email or when the
    /// account has no password (Google-only sign-in).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_for_login(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserAuthRow>(
            r"
            SELECT id, first_name, last_name, email, phone, role, google_id,
                   profile_image, created_at, updated_at, password_hash
            FROM store.user
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => {
                let Some(hash) = row.password_hash else {
                    return Ok(None);
                };
                Ok(Some((row.user.try_into()?, hash)))
            }
            None => Ok(None),
        }
    }

    /// List all users, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, first_name, last_name, email, phone, role, google_id,
                   profile_image, created_at, updated_at
            FROM store.user
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already taken.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO store.user
                (first_name, last_name, email, phone, password_hash, role,
                 google_id, profile_image)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, first_name, last_name, email, phone, role, google_id,
                      profile_image, created_at, updated_at
            ",
        )
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(new_user.email.as_str())
        .bind(&new_user.phone)
        .bind(&new_user.password_hash)
        .bind(new_user.role.to_string())
        .bind(&new_user.google_id)
        .bind(&new_user.profile_image)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already registered".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    /// Update the self-service profile fields of a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_profile(
        &self,
        id: UserId,
        first_name: Option<&str>,
        last_name: Option<&str>,
        phone: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE store.user
            SET first_name = $2, last_name = $3, phone = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING id, first_name, last_name, email, phone, role, google_id,
                      profile_image, created_at, updated_at
            ",
        )
        .bind(id.as_i32())
        .bind(first_name)
        .bind(last_name)
        .bind(phone)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Apply an administrative update to a user. The password hash is only
    /// replaced when the update carries one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn admin_update(
        &self,
        id: UserId,
        update: &AdminUserUpdate,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE store.user
            SET first_name = $2,
                last_name = $3,
                phone = $4,
                role = $5,
                password_hash = COALESCE($6, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, first_name, last_name, email, phone, role, google_id,
                      profile_image, created_at, updated_at
            ",
        )
        .bind(id.as_i32())
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.phone)
        .bind(update.role.to_string())
        .bind(&update.password_hash)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Link a Google account to an existing user. An already stored profile
    /// image is kept when the Google profile has none.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn attach_google(
        &self,
        id: UserId,
        google_id: &str,
        profile_image: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE store.user
            SET google_id = $2,
                profile_image = COALESCE($3, profile_image),
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .bind(google_id)
        .bind(profile_image)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a user together with their cart, addresses and orders.
    ///
    /// Everything happens in one transaction; the per-table counts are
    /// reported back for the admin response.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn delete_cascade(&self, id: UserId) -> Result<DeletedUserData, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let cart_items = sqlx::query("DELETE FROM store.cart_item WHERE user_id = $1")
            .bind(id.as_i32())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let addresses = sqlx::query("DELETE FROM store.address WHERE user_id = $1")
            .bind(id.as_i32())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let order_items = sqlx::query(
            r"
            DELETE FROM store.order_item
            WHERE order_id IN (SELECT id FROM store.order WHERE user_id = $1)
            ",
        )
        .bind(id.as_i32())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let orders = sqlx::query("DELETE FROM store.order WHERE user_id = $1")
            .bind(id.as_i32())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM store.user WHERE id = $1")
            .bind(id.as_i32())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            // Dropping the transaction rolls the cascade back.
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;

        Ok(DeletedUserData { cart_items, addresses, orders, order_items })
    }
}
