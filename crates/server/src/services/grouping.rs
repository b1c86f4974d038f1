//! Colour-variant grouping.
//!
//! Grouping links every selected product to all the others so the
//! storefront can render them as colourways of one garment. Ungrouping
//! removes the selected products from every clique they appear in.

use sqlx::PgPool;

use hemline_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::{ColorLink, Product};

/// Swatch colour stored on generated links; the admin UI replaces it
/// once a real swatch is picked.
const PLACEHOLDER_HEX: &str = "#000000";

/// Grouping service.
pub struct GroupingService<'a> {
    products: ProductRepository<'a>,
}

impl<'a> GroupingService<'a> {
    /// Create a new grouping service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            products: ProductRepository::new(pool),
        }
    }

    /// Link the selected products as colour variants of each other.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if fewer than two products were
    /// selected.
    /// Returns `AppError::NotFound` if any selected product is missing.
    pub async fn group(&self, ids: &[ProductId]) -> Result<()> {
        if ids.len() < 2 {
            return Err(AppError::Validation(
                "Please select at least 2 products to group.".to_owned(),
            ));
        }

        let products = self.products.get_by_ids(ids).await?;
        if products.len() != ids.len() {
            return Err(AppError::NotFound(
                "One or more products not found.".to_owned(),
            ));
        }

        let links = build_clique(&products);
        self.products.replace_color_links(&links).await?;

        tracing::info!(count = ids.len(), "Grouped products as colour variants");
        Ok(())
    }

    /// Remove the selected products from every colour group.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the selection is empty.
    pub async fn ungroup(&self, ids: &[ProductId]) -> Result<()> {
        if ids.is_empty() {
            return Err(AppError::Validation(
                "Please select products to ungroup.".to_owned(),
            ));
        }

        self.products.clear_color_links(ids).await?;

        tracing::info!(count = ids.len(), "Removed products from colour groups");
        Ok(())
    }
}

/// Builds the full clique: each member ends up linking to every other
/// member, carrying its name, primary image and a placeholder swatch.
fn build_clique(products: &[Product]) -> Vec<(ProductId, Vec<ColorLink>)> {
    products
        .iter()
        .map(|product| {
            let links = products
                .iter()
                .filter(|other| other.id != product.id)
                .map(|other| ColorLink {
                    id: other.id,
                    name: other.name.clone(),
                    image: other.primary_image().unwrap_or_default().to_owned(),
                    hex: PLACEHOLDER_HEX.to_owned(),
                })
                .collect();
            (product.id, links)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;
    use hemline_core::Price;

    use super::*;

    fn product(id: i32, name: &str, images: &[&str]) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_owned(),
            category: "Men".to_owned(),
            price: Price::new(129_900),
            description: None,
            stock: 10,
            sizes: BTreeMap::new(),
            images: images.iter().map(|&i| i.to_owned()).collect(),
            colors: Vec::new(),
            collections: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_build_clique_links_every_other_member() {
        let products = vec![
            product(1, "Tee Red", &["/uploads/red.jpg"]),
            product(2, "Tee Blue", &["/uploads/blue.jpg"]),
            product(3, "Tee Green", &[]),
        ];

        let clique = build_clique(&products);
        assert_eq!(clique.len(), 3);

        for (id, links) in &clique {
            assert_eq!(links.len(), 2);
            assert!(links.iter().all(|link| link.id != *id), "no self-links");
        }
    }

    #[test]
    fn test_build_clique_carries_primary_image_and_placeholder_hex() {
        let products = vec![
            product(1, "Tee Red", &["/uploads/red.jpg", "/uploads/red-2.jpg"]),
            product(2, "Tee Green", &[]),
        ];

        let clique = build_clique(&products);
        let links_for_green: &Vec<ColorLink> = clique
            .iter()
            .find(|(id, _)| *id == ProductId::new(2))
            .map(|(_, links)| links)
            .expect("green product in clique");

        let red_link = links_for_green.first().expect("one link");
        assert_eq!(red_link.name, "Tee Red");
        assert_eq!(red_link.image, "/uploads/red.jpg");
        assert_eq!(red_link.hex, PLACEHOLDER_HEX);

        // A product without images links with an empty image path.
        let links_for_red = clique
            .iter()
            .find(|(id, _)| *id == ProductId::new(1))
            .map(|(_, links)| links)
            .expect("red product in clique");
        assert_eq!(links_for_red.first().map(|l| l.image.as_str()), Some(""));
    }
}
