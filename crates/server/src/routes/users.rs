//! Admin user management route handlers.
//!
//! Admins can list accounts, provision new ones, edit roles and reset
//! passwords, and delete an account together with everything it owns.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use hemline_core::{Role, UserId};
use serde::{Deserialize, Serialize};

use crate::db::{DeletedUserData, RepositoryError, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{AdminUserUpdate, User};
use crate::routes::MessageResponse;
use crate::services::auth::{hash_password, validate_password};
use crate::services::{AuthService, Registration};
use crate::state::AppState;

/// Payload for provisioning an account on someone's behalf. Field
/// aliases accept the camelCase names the admin UI sends, including the
/// legacy `type` name for the role.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default, alias = "firstName")]
    pub first_name: Option<String>,
    #[serde(default, alias = "lastName")]
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    #[serde(default, alias = "type")]
    pub role: Role,
}

/// Payload for editing an account.
///
/// A missing or empty `password` keeps the stored hash.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default, alias = "firstName")]
    pub first_name: Option<String>,
    #[serde(default, alias = "lastName")]
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    #[serde(default, alias = "type")]
    pub role: Role,
}

/// Response after provisioning an account.
#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub message: &'static str,
    pub user: User,
}

/// Response after a cascading account deletion.
#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub message: &'static str,
    pub deleted_items: DeletedUserData,
}

/// List every account. Password hashes never leave the repository.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>> {
    let users = UserRepository::new(state.pool()).list().await?;

    Ok(Json(users))
}

/// Provision an account with an explicit role.
///
/// Unlike self-registration no bearer token is issued; the new owner
/// signs in with the credentials handed to them.
///
/// # Errors
///
/// Returns 400 when the email is taken or the password is too weak.
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>)> {
    let service = AuthService::new(state.pool(), &state.config().jwt_secret);
    let (user, _token) = service
        .register(Registration {
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            phone: body.phone,
            password: body.password,
            role: body.role,
        })
        .await?;

    tracing::info!(user_id = %user.id, role = %user.role, admin = %admin.email, "admin created user");

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            message: "User created successfully",
            user,
        }),
    ))
}

/// Edit an account's names, phone, role and optionally its password.
///
/// # Errors
///
/// Returns 400 when a new password is too weak, 404 when the user does
/// not exist.
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<MessageResponse>> {
    let password_hash = match body.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => {
            validate_password(password)?;
            Some(hash_password(password)?)
        }
        None => None,
    };

    let update = AdminUserUpdate {
        first_name: body.first_name,
        last_name: body.last_name,
        phone: body.phone,
        role: body.role,
        password_hash,
    };

    UserRepository::new(state.pool())
        .admin_update(id, &update)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("User not found".to_string()),
            other => other.into(),
        })?;

    tracing::info!(user_id = %id, role = %update.role, admin = %admin.email, "admin updated user");

    Ok(Json(MessageResponse::new("User updated successfully")))
}

/// Delete an account and everything it owns.
///
/// Cart items, addresses, orders and their line items go with it; the
/// response reports how many rows each table lost.
///
/// # Errors
///
/// Returns 404 when the user does not exist.
pub async fn remove(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<DeleteUserResponse>> {
    let deleted_items = UserRepository::new(state.pool())
        .delete_cascade(id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("User not found".to_string()),
            other => other.into(),
        })?;

    tracing::warn!(user_id = %id, admin = %admin.email, "admin deleted user");

    Ok(Json(DeleteUserResponse {
        message: "User deleted successfully",
        deleted_items,
    }))
}
