//! Product route handlers.
//!
//! Create and update arrive as multipart forms because the admin UI
//! submits image files together with the product fields.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{
        Multipart, Path, Query, State,
        multipart::{Field, MultipartError},
    },
    http::StatusCode,
};
use hemline_core::ProductId;
use serde::{Deserialize, Serialize};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Product;
use crate::routes::MessageResponse;
use crate::services::catalog::StockAddition;
use crate::services::{CatalogService, GroupingService, ProductForm, UploadedImage};
use crate::state::AppState;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Filters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub category: Option<String>,
    pub collection: Option<String>,
}

/// Response after creating a product.
#[derive(Debug, Serialize)]
pub struct CreateProductResponse {
    pub message: &'static str,
    pub product_id: ProductId,
    pub images: Vec<String>,
}

/// Response after updating a product.
#[derive(Debug, Serialize)]
pub struct UpdateProductResponse {
    pub message: &'static str,
    pub images: Vec<String>,
}

/// Request for adding stock quantities.
#[derive(Debug, Deserialize)]
pub struct AddStockRequest {
    pub stock_update: Option<BTreeMap<String, i64>>,
}

/// Response after adding stock.
#[derive(Debug, Serialize)]
pub struct AddStockResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub addition: StockAddition,
}

/// Request for grouping or ungrouping colour variants.
#[derive(Debug, Deserialize)]
pub struct GroupRequest {
    #[serde(default, alias = "productIds")]
    pub product_ids: Vec<ProductId>,
}

// =============================================================================
// Public Handlers
// =============================================================================

/// List products, optionally filtered by category or collection tag.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool())
        .list(query.category.as_deref(), query.collection.as_deref())
        .await?;

    Ok(Json(products))
}

/// Get a single product.
///
/// # Errors
///
/// Returns 404 if the product does not exist.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(product))
}

// =============================================================================
// Admin Handlers
// =============================================================================

/// Create a product from the admin multipart form.
///
/// # Errors
///
/// Returns 400 if required fields are missing or malformed.
pub async fn create(
    RequireAdmin(_claims): RequireAdmin,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CreateProductResponse>)> {
    let form = read_product_form(multipart).await?;

    let service = CatalogService::new(state.pool(), &state.config().upload_dir);
    let product = service.create_product(form).await?;

    tracing::info!(product_id = %product.id, "Product created");

    Ok((
        StatusCode::CREATED,
        Json(CreateProductResponse {
            message: "Product created successfully",
            product_id: product.id,
            images: product.images,
        }),
    ))
}

/// Replace a product from the admin multipart form.
///
/// # Errors
///
/// Returns 400 for bad fields, 404 when the product does not exist.
pub async fn update(
    RequireAdmin(_claims): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Json<UpdateProductResponse>> {
    let form = read_product_form(multipart).await?;

    let service = CatalogService::new(state.pool(), &state.config().upload_dir);
    let product = service.update_product(id, form).await?;

    Ok(Json(UpdateProductResponse {
        message: "Product updated successfully",
        images: product.images,
    }))
}

/// Delete a product.
///
/// Cart rows and orders referencing it are left alone.
///
/// # Errors
///
/// Returns 404 when the product does not exist.
pub async fn remove(
    RequireAdmin(_claims): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<MessageResponse>> {
    let service = CatalogService::new(state.pool(), &state.config().upload_dir);
    service.delete_product(id).await?;

    Ok(Json(MessageResponse::new("Product deleted successfully")))
}

/// Add stock quantities to a product.
///
/// # Errors
///
/// Returns 400 when no positive quantity is supplied, 404 when the
/// product does not exist.
pub async fn add_stock(
    RequireAdmin(_claims): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(body): Json<AddStockRequest>,
) -> Result<Json<AddStockResponse>> {
    let additions = body
        .stock_update
        .ok_or_else(|| AppError::Validation("Stock update data is required".to_string()))?;

    let service = CatalogService::new(state.pool(), &state.config().upload_dir);
    let addition = service.add_stock(id, &additions).await?;

    Ok(Json(AddStockResponse {
        message: "Stock added successfully",
        addition,
    }))
}

/// Link products as colour variants of each other.
///
/// # Errors
///
/// Returns 400 for fewer than two ids, 404 when any id is unknown.
pub async fn group(
    RequireAdmin(_claims): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<GroupRequest>,
) -> Result<Json<MessageResponse>> {
    GroupingService::new(state.pool())
        .group(&body.product_ids)
        .await?;

    Ok(Json(MessageResponse::new(
        "Products successfully grouped and linked.",
    )))
}

/// Remove colour variant links from products.
///
/// # Errors
///
/// Returns 400 when no ids are supplied.
pub async fn ungroup(
    RequireAdmin(_claims): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<GroupRequest>,
) -> Result<Json<MessageResponse>> {
    GroupingService::new(state.pool())
        .ungroup(&body.product_ids)
        .await?;

    Ok(Json(MessageResponse::new("Products successfully ungrouped.")))
}

// =============================================================================
// Multipart Parsing
// =============================================================================

/// Read the admin product form out of a multipart body.
///
/// `collections` and `existing_images` are repeatable fields; `images`
/// parts carry the uploaded files. Unknown fields are ignored.
async fn read_product_form(mut multipart: Multipart) -> Result<ProductForm> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "name" => form.name = Some(read_text(field).await?),
            "category" => form.category = Some(read_text(field).await?),
            "price" => form.price = Some(read_text(field).await?),
            "description" => form.description = Some(read_text(field).await?),
            "stock" => form.stock = Some(read_text(field).await?),
            "sizes" => form.sizes = Some(read_text(field).await?),
            "colors" => form.colors = Some(read_text(field).await?),
            "image" => form.image = Some(read_text(field).await?),
            "collections" => form.collections.push(read_text(field).await?),
            "existing_images" => form.existing_images.push(read_text(field).await?),
            "images" => {
                let file_name = field.file_name().unwrap_or("upload.bin").to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                form.uploads.push(UploadedImage {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: Field<'_>) -> Result<String> {
    field.text().await.map_err(bad_multipart)
}

fn bad_multipart(e: MultipartError) -> AppError {
    AppError::Validation(format!("invalid multipart form: {e}"))
}
