//! Address book route handlers.
//!
//! All operations are scoped to the authenticated caller.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use hemline_core::AddressId;
use serde::Serialize;

use crate::db::{AddressRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::{Address, AddressInput};
use crate::routes::MessageResponse;
use crate::state::AppState;

/// Response after saving an address.
#[derive(Debug, Serialize)]
pub struct CreateAddressResponse {
    pub message: &'static str,
    pub address_id: AddressId,
}

/// List the caller's addresses, default first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn list(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Address>>> {
    let addresses = AddressRepository::new(state.pool())
        .list_for_user(claims.sub)
        .await?;

    Ok(Json(addresses))
}

/// Save a new address.
///
/// Setting it as default clears the flag on the caller's other rows.
///
/// # Errors
///
/// Returns 400 when a required field is blank.
pub async fn create(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
    Json(input): Json<AddressInput>,
) -> Result<(StatusCode, Json<CreateAddressResponse>)> {
    validate(&input)?;

    let address = AddressRepository::new(state.pool())
        .create(claims.sub, &input)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateAddressResponse {
            message: "Address added successfully",
            address_id: address.id,
        }),
    ))
}

/// Replace a saved address.
///
/// # Errors
///
/// Returns 400 when a required field is blank, 404 when the address is
/// not the caller's.
pub async fn update(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<AddressId>,
    Json(input): Json<AddressInput>,
) -> Result<Json<MessageResponse>> {
    validate(&input)?;

    AddressRepository::new(state.pool())
        .update(id, claims.sub, &input)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Address not found".to_string()),
            other => other.into(),
        })?;

    Ok(Json(MessageResponse::new("Address updated successfully")))
}

/// Delete a saved address.
///
/// # Errors
///
/// Returns 404 when the address is not the caller's.
pub async fn remove(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<AddressId>,
) -> Result<Json<MessageResponse>> {
    let deleted = AddressRepository::new(state.pool())
        .delete(id, claims.sub)
        .await?;

    if !deleted {
        return Err(AppError::NotFound("Address not found".to_string()));
    }

    Ok(Json(MessageResponse::new("Address deleted successfully")))
}

fn validate(input: &AddressInput) -> Result<()> {
    if let Some(field) = input.missing_field() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}
