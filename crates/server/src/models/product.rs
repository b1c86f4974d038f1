//! Catalog models.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hemline_core::{Price, ProductId};
use serde::{Deserialize, Serialize};

/// Cross-link to another product presented as a colour variant of this
/// one. The hex value is a placeholder until swatch editing exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorLink {
    pub id: ProductId,
    pub name: String,
    pub image: String,
    pub hex: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Price,
    pub description: Option<String>,
    pub stock: i64,
    pub sizes: BTreeMap<String, i64>,
    pub images: Vec<String>,
    pub colors: Vec<ColorLink>,
    pub collections: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// First image, used as the thumbnail and on colour links.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Units available for a size selection. Products without per-size
    /// counts fall back to the legacy aggregate, as do selections with
    /// no size. An unknown size label counts as zero.
    #[must_use]
    pub fn available_stock(&self, size: Option<&str>) -> i64 {
        match size {
            Some(label) if !self.sizes.is_empty() => self.sizes.get(label).copied().unwrap_or(0),
            _ => self.stock,
        }
    }
}

/// Full product state for create and update. Update replaces every field
/// because the admin form always submits the complete product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub category: String,
    pub price: Price,
    pub description: Option<String>,
    pub stock: i64,
    pub sizes: BTreeMap<String, i64>,
    pub images: Vec<String>,
    pub colors: Vec<ColorLink>,
    pub collections: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i64, sizes: &[(&str, i64)]) -> Product {
        Product {
            id: ProductId::new(7),
            name: "Classic White Tee".to_owned(),
            category: "Men".to_owned(),
            price: Price::from_major(1299),
            description: None,
            stock,
            sizes: sizes
                .iter()
                .map(|(label, qty)| ((*label).to_owned(), *qty))
                .collect(),
            images: vec!["/uploads/tee.jpg".to_owned()],
            colors: Vec::new(),
            collections: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_available_stock_uses_size_count() {
        let p = product(50, &[("S", 10), ("M", 20)]);
        assert_eq!(p.available_stock(Some("M")), 20);
    }

    #[test]
    fn test_available_stock_unknown_size_is_zero() {
        let p = product(50, &[("S", 10)]);
        assert_eq!(p.available_stock(Some("XXL")), 0);
    }

    #[test]
    fn test_available_stock_without_size_uses_aggregate() {
        let p = product(50, &[("S", 10), ("M", 20)]);
        assert_eq!(p.available_stock(None), 50);
    }

    #[test]
    fn test_available_stock_without_size_counts_uses_aggregate() {
        let p = product(12, &[]);
        assert_eq!(p.available_stock(Some("M")), 12);
    }

    #[test]
    fn test_primary_image_is_first() {
        let mut p = product(1, &[]);
        p.images = vec!["/uploads/a.jpg".to_owned(), "/uploads/b.jpg".to_owned()];
        assert_eq!(p.primary_image(), Some("/uploads/a.jpg"));

        p.images.clear();
        assert_eq!(p.primary_image(), None);
    }
}
