//! Database access layer.
//!
//! Each repository borrows a `PgPool` and maps rows from the `store`
//! schema into domain models. Writes that touch more than one table run
//! inside a single transaction.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub mod addresses;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;
pub mod users;

pub use addresses::AddressRepository;
pub use cart::CartRepository;
pub use categories::CategoryRepository;
pub use orders::{OrderCustomer, OrderRepository};
pub use products::ProductRepository;
pub use users::{DeletedUserData, UserRepository};

/// Creates a connection pool with production settings.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Errors surfaced by repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("data corruption: {0}")]
    DataCorruption(String),

    #[error("not found")]
    NotFound,

    #[error("constraint violation: {0}")]
    Conflict(String),
}
