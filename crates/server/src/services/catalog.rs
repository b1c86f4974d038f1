//! Catalog service.
//!
//! Turns the admin product form into a [`ProductInput`], stores uploaded
//! images on disk and plans stock additions.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use sqlx::PgPool;

use hemline_core::{Price, ProductId};

use crate::db::{ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::models::{ColorLink, Product, ProductInput};

/// Size label used when a product is stocked without per-size counts.
/// A stock addition under this label adjusts only the aggregate.
pub const ONE_SIZE_LABEL: &str = "One Size";

const REQUIRED_FIELDS_MESSAGE: &str = "Name, category, and price are required";

/// One uploaded image from the multipart form.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Raw product form fields as they arrive from the admin UI. Everything
/// is optional here; assembly decides what is required.
#[derive(Debug, Default)]
pub struct ProductForm {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub stock: Option<String>,
    pub sizes: Option<String>,
    pub colors: Option<String>,
    pub collections: Vec<String>,
    pub image: Option<String>,
    pub existing_images: Vec<String>,
    pub uploads: Vec<UploadedImage>,
}

/// New totals after a stock addition.
#[derive(Debug, Serialize)]
pub struct StockAddition {
    pub total_stock: i64,
    pub updated_stock: BTreeMap<String, i64>,
}

/// Catalog service.
pub struct CatalogService<'a> {
    products: ProductRepository<'a>,
    upload_dir: &'a Path,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub fn new(pool: &'a PgPool, upload_dir: &'a Path) -> Self {
        Self {
            products: ProductRepository::new(pool),
            upload_dir,
        }
    }

    /// Create a product from the admin form.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if required fields are missing or
    /// malformed.
    pub async fn create_product(&self, form: ProductForm) -> Result<Product> {
        let input = self.build_input(form).await?;
        Ok(self.products.create(&input).await?)
    }

    /// Replace a product's fields from the admin form.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product does not exist.
    /// Returns `AppError::Validation` if required fields are missing or
    /// malformed.
    pub async fn update_product(&self, id: ProductId, form: ProductForm) -> Result<Product> {
        let input = self.build_input(form).await?;
        match self.products.update(id, &input).await {
            Ok(product) => Ok(product),
            Err(RepositoryError::NotFound) => {
                Err(AppError::NotFound("Product not found".to_owned()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product does not exist.
    pub async fn delete_product(&self, id: ProductId) -> Result<()> {
        if self.products.delete(id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Product not found".to_owned()))
        }
    }

    /// Add stock to a product and echo the new totals.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if no entry carries a positive
    /// quantity.
    /// Returns `AppError::NotFound` if the product does not exist.
    pub async fn add_stock(
        &self,
        id: ProductId,
        additions: &BTreeMap<String, i64>,
    ) -> Result<StockAddition> {
        let (aggregate_add, size_adds) = plan_stock_addition(additions)?;

        let product = match self.products.add_stock(id, aggregate_add, &size_adds).await {
            Ok(product) => product,
            Err(RepositoryError::NotFound) => {
                return Err(AppError::NotFound("Product not found".to_owned()));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(StockAddition {
            total_stock: product.stock,
            updated_stock: product.sizes,
        })
    }

    // =========================================================================
    // Form Assembly
    // =========================================================================

    async fn build_input(&self, form: ProductForm) -> Result<ProductInput> {
        let name = required_text(form.name)?;
        let category = required_text(form.category)?;
        let price = parse_price(form.price.as_deref())?;

        let stock_field = match form.stock.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(raw.parse::<i64>().map_err(|_| {
                AppError::Validation("stock must be a whole number".to_owned())
            })?),
            _ => None,
        };

        let sizes = parse_sizes(form.sizes.as_deref(), stock_field)?;
        let colors = parse_colors(form.colors.as_deref())?;

        // Kept images first, then a manually entered URL, then fresh
        // uploads. The first entry is the primary image.
        let mut images = form.existing_images;
        if let Some(manual) = form.image
            && !manual.trim().is_empty()
            && !images.contains(&manual)
        {
            images.push(manual);
        }
        for upload in &form.uploads {
            images.push(self.save_image(upload).await?);
        }

        Ok(ProductInput {
            name,
            category,
            price,
            description: form.description.filter(|d| !d.trim().is_empty()),
            stock: stock_field.unwrap_or(0),
            sizes,
            images,
            colors,
            collections: form.collections,
        })
    }

    async fn save_image(&self, upload: &UploadedImage) -> Result<String> {
        tokio::fs::create_dir_all(self.upload_dir)
            .await
            .map_err(|e| AppError::Internal(format!("failed to create upload directory: {e}")))?;

        let file_name = unique_file_name(&upload.file_name);
        let path = self.upload_dir.join(&file_name);
        tokio::fs::write(&path, &upload.bytes)
            .await
            .map_err(|e| AppError::Internal(format!("failed to store uploaded image: {e}")))?;

        tracing::debug!(path = %path.display(), "Stored uploaded image");
        Ok(format!("/uploads/{file_name}"))
    }
}

// =============================================================================
// Field Parsers
// =============================================================================

fn required_text(value: Option<String>) -> Result<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::Validation(REQUIRED_FIELDS_MESSAGE.to_owned())),
    }
}

/// The price arrives as a whole number of minor units and must be
/// positive.
fn parse_price(raw: Option<&str>) -> Result<Price> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation(REQUIRED_FIELDS_MESSAGE.to_owned()))?;

    let price = raw.parse::<Price>().map_err(|_| {
        AppError::Validation("price must be a whole number of minor units".to_owned())
    })?;

    if !price.is_positive() {
        return Err(AppError::Validation(REQUIRED_FIELDS_MESSAGE.to_owned()));
    }
    Ok(price)
}

/// The sizes field is a JSON object of size label to quantity. When it is
/// absent, a bare stock count collapses into a single "One Size" entry.
fn parse_sizes(raw: Option<&str>, legacy_stock: Option<i64>) -> Result<BTreeMap<String, i64>> {
    if let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) {
        return serde_json::from_str(raw).map_err(|_| {
            AppError::Validation("sizes must be a JSON object of size to quantity".to_owned())
        });
    }

    Ok(match legacy_stock {
        Some(stock) => BTreeMap::from([(ONE_SIZE_LABEL.to_owned(), stock)]),
        None => BTreeMap::new(),
    })
}

fn parse_colors(raw: Option<&str>) -> Result<Vec<ColorLink>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => serde_json::from_str(raw).map_err(|_| {
            AppError::Validation("colors must be a JSON array of colour links".to_owned())
        }),
        None => Ok(Vec::new()),
    }
}

/// Splits a stock update into an aggregate bump and per-size increments.
/// A positive "One Size" entry adjusts only the aggregate; otherwise each
/// positive entry increments its size key and the aggregate grows by the
/// accumulated total. Non-positive quantities are ignored.
fn plan_stock_addition(additions: &BTreeMap<String, i64>) -> Result<(i64, Vec<(String, i64)>)> {
    let one_size = additions.get(ONE_SIZE_LABEL).copied().unwrap_or(0);
    if one_size > 0 {
        return Ok((one_size, Vec::new()));
    }

    let size_adds: Vec<(String, i64)> = additions
        .iter()
        .filter(|(label, qty)| label.as_str() != ONE_SIZE_LABEL && **qty > 0)
        .map(|(label, qty)| (label.clone(), *qty))
        .collect();
    let total: i64 = size_adds.iter().map(|(_, qty)| qty).sum();

    if total == 0 {
        return Err(AppError::Validation(
            "No valid stock quantities provided".to_owned(),
        ));
    }
    Ok((total, size_adds))
}

/// Unique storage name preserving the original extension:
/// `<unix-millis>-<random>.<ext>`.
fn unique_file_name(original: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::rng().random_range(0..1_000_000_000);
    let ext = Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    format!("{millis}-{suffix}{ext}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_minor_units() {
        assert_eq!(parse_price(Some("49900")).unwrap(), Price::new(49_900));
        assert_eq!(parse_price(Some(" 1 ")).unwrap(), Price::new(1));
    }

    #[test]
    fn test_parse_price_rejects_missing_zero_and_garbage() {
        assert!(parse_price(None).is_err());
        assert!(parse_price(Some("")).is_err());
        assert!(parse_price(Some("0")).is_err());
        assert!(parse_price(Some("-100")).is_err());
        assert!(parse_price(Some("12.99")).is_err());
        assert!(parse_price(Some("free")).is_err());
    }

    #[test]
    fn test_parse_sizes_json_object() {
        let sizes = parse_sizes(Some(r#"{"S": 5, "M": 10}"#), None).unwrap();
        assert_eq!(sizes.get("S"), Some(&5));
        assert_eq!(sizes.get("M"), Some(&10));
    }

    #[test]
    fn test_parse_sizes_collapses_legacy_stock() {
        let sizes = parse_sizes(None, Some(25)).unwrap();
        assert_eq!(sizes.len(), 1);
        assert_eq!(sizes.get(ONE_SIZE_LABEL), Some(&25));

        assert!(parse_sizes(None, None).unwrap().is_empty());
    }

    #[test]
    fn test_parse_sizes_rejects_malformed_json() {
        assert!(parse_sizes(Some("not json"), None).is_err());
        assert!(parse_sizes(Some(r#"["S", "M"]"#), None).is_err());
    }

    #[test]
    fn test_parse_colors() {
        assert!(parse_colors(None).unwrap().is_empty());

        let colors =
            parse_colors(Some(r##"[{"id": 3, "name": "Navy", "image": "", "hex": "#000080"}]"##))
                .unwrap();
        assert_eq!(colors.len(), 1);
        assert_eq!(colors.first().map(|c| c.name.as_str()), Some("Navy"));

        assert!(parse_colors(Some("{}")).is_err());
    }

    #[test]
    fn test_plan_stock_addition_one_size_is_aggregate_only() {
        let additions = BTreeMap::from([(ONE_SIZE_LABEL.to_owned(), 7)]);
        let (aggregate, sizes) = plan_stock_addition(&additions).unwrap();
        assert_eq!(aggregate, 7);
        assert!(sizes.is_empty());
    }

    #[test]
    fn test_plan_stock_addition_sums_positive_sizes() {
        let additions = BTreeMap::from([
            ("S".to_owned(), 3),
            ("M".to_owned(), 5),
            ("L".to_owned(), 0),
            ("XL".to_owned(), -2),
        ]);
        let (aggregate, sizes) = plan_stock_addition(&additions).unwrap();
        assert_eq!(aggregate, 8);
        assert_eq!(sizes.len(), 2);
        assert!(sizes.iter().any(|(label, qty)| label == "S" && *qty == 3));
        assert!(sizes.iter().any(|(label, qty)| label == "M" && *qty == 5));
    }

    #[test]
    fn test_plan_stock_addition_rejects_nothing_positive() {
        assert!(plan_stock_addition(&BTreeMap::new()).is_err());

        let additions = BTreeMap::from([("S".to_owned(), 0), ("M".to_owned(), -1)]);
        assert!(plan_stock_addition(&additions).is_err());
    }

    #[test]
    fn test_unique_file_name_keeps_extension() {
        let name = unique_file_name("photo.PNG");
        assert!(name.ends_with(".PNG"));
        assert!(name.contains('-'));

        let bare = unique_file_name("no_extension");
        assert!(!bare.contains('.'));
    }
}
