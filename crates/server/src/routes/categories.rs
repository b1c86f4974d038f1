//! Category route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::db::{CategoryRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Category;
use crate::state::AppState;

/// Request for creating a category.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// List categories sorted by name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CategoryRepository::new(state.pool()).list().await?;

    Ok(Json(categories))
}

/// List categories for the admin UI.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn admin_list(
    RequireAdmin(_claims): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>> {
    let categories = CategoryRepository::new(state.pool()).list().await?;

    Ok(Json(categories))
}

/// Create a category.
///
/// Names are unique case-insensitively.
///
/// # Errors
///
/// Returns 400 for a blank name or a duplicate.
pub async fn create(
    RequireAdmin(claims): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>)> {
    let name = body
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Validation("Category name is required".to_string()))?;

    let category = CategoryRepository::new(state.pool())
        .create(name, body.description.as_deref(), &claims.email)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                AppError::Validation("Category already exists".to_string())
            }
            other => other.into(),
        })?;

    tracing::info!(category_id = %category.id, "Category created");

    Ok((StatusCode::CREATED, Json(category)))
}
