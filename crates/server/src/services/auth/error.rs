//! Error type for account and session operations.

use thiserror::Error;

use crate::db::RepositoryError;

/// Failures from registration, login and token handling.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email failed shape validation at registration.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] hemline_core::EmailError),

    /// Unknown email, wrong password, or an OAuth-only account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration against an email that already has an account.
    #[error("account already exists")]
    UserAlreadyExists,

    /// Password rejected by policy; the message is shown to the caller.
    #[error("{0}")]
    WeakPassword(String),

    /// Underlying repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("password hashing failed")]
    PasswordHash,

    #[error("token signing failed")]
    TokenSigning,
}
