//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a new admin account (or promote an existing one)
//! hemline admin create -e admin@example.com -p 'a strong password'
//! ```
//!
//! # Environment Variables
//!
//! - `HEMLINE_DATABASE_URL` - `PostgreSQL` connection string
//!   (`DATABASE_URL` is accepted as a fallback)

use hemline_core::Email;
use hemline_server::services::auth::{hash_password, validate_password};
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur during admin account operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password rejected or hashing failed.
    #[error("{0}")]
    Password(String),
}

/// Create an admin account, or promote an existing account to admin.
///
/// The password is hashed with the same argon2 policy the server applies
/// to registration. Running against an email that already has an account
/// resets its password and promotes it to admin.
///
/// # Errors
///
/// Returns an error if the email or password is invalid, the database
/// URL is missing or the query fails.
pub async fn create(
    email: &str,
    password: &str,
    first_name: &str,
    last_name: &str,
) -> Result<i32, AdminError> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email).map_err(|_| AdminError::InvalidEmail(email.to_owned()))?;

    validate_password(password).map_err(|e| AdminError::Password(e.to_string()))?;
    let password_hash = hash_password(password).map_err(|e| AdminError::Password(e.to_string()))?;

    let database_url = std::env::var("HEMLINE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| AdminError::MissingEnvVar("HEMLINE_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Creating admin account: {}", email);

    let user_id: i32 = sqlx::query_scalar(
        r"
        INSERT INTO store.user (first_name, last_name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, 'admin')
        ON CONFLICT (email) DO UPDATE
        SET role = 'admin',
            password_hash = EXCLUDED.password_hash,
            updated_at = NOW()
        RETURNING id
        ",
    )
    .bind(first_name)
    .bind(last_name)
    .bind(email.as_str())
    .bind(&password_hash)
    .fetch_one(&pool)
    .await?;

    tracing::info!("Admin account ready! ID: {}, Email: {}", user_id, email);

    Ok(user_id)
}
