//! Profile route handlers.

use axum::{Json, extract::State};
use serde::Deserialize;

use crate::db::{RepositoryError, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::User;
use crate::routes::MessageResponse;
use crate::state::AppState;

/// Request for updating the caller's profile. Field aliases accept the
/// camelCase names older storefront builds send.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default, alias = "firstName")]
    pub first_name: Option<String>,
    #[serde(default, alias = "lastName")]
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

/// Get the caller's account.
///
/// # Errors
///
/// Returns 404 when the account no longer exists.
pub async fn show(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<User>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Update the caller's name and phone.
///
/// # Errors
///
/// Returns 404 when the account no longer exists.
pub async fn update(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<MessageResponse>> {
    UserRepository::new(state.pool())
        .update_profile(
            claims.sub,
            body.first_name.as_deref(),
            body.last_name.as_deref(),
            body.phone.as_deref(),
        )
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("User not found".to_string()),
            other => other.into(),
        })?;

    Ok(Json(MessageResponse::new("Profile updated successfully")))
}
