//! Catalog seeding command.
//!
//! Inserts the default categories and a demo product set so a fresh
//! database has something to browse. Existing rows are left alone, which
//! makes the command safe to re-run.
//!
//! # Environment Variables
//!
//! - `HEMLINE_DATABASE_URL` - `PostgreSQL` connection string
//!   (`DATABASE_URL` is accepted as a fallback)

use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A demo catalog entry. Prices are in minor units.
struct DemoProduct {
    name: &'static str,
    category: &'static str,
    price: i64,
    description: &'static str,
    image: &'static str,
    stock: i64,
    sizes: &'static [(&'static str, i64)],
    collections: &'static [&'static str],
}

/// Categories every store starts with.
const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("T-Shirts", "Comfortable t-shirts in various colors and styles"),
    ("Shirts", "Formal and casual shirts for all occasions"),
    ("Jeans", "Denim jeans in different fits and styles"),
];

const DEMO_PRODUCTS: &[DemoProduct] = &[
    // Men's Collection
    DemoProduct {
        name: "Classic White Tee",
        category: "Men",
        price: 129_900,
        description: "Premium cotton classic fit white t-shirt. Essential for every wardrobe.",
        image: "https://images.unsplash.com/photo-1521572163474-6864f9cf17ab?q=80&w=800&auto=format&fit=crop",
        stock: 50,
        sizes: &[("S", 10), ("M", 20), ("L", 15), ("XL", 5)],
        collections: &["best-collection", "summer-essentials"],
    },
    DemoProduct {
        name: "Navy Blue Bomber Jacket",
        category: "Men",
        price: 499_900,
        description: "Stylish navy blue bomber jacket with premium finish. Perfect for layering.",
        image: "https://images.unsplash.com/photo-1591047139829-d91aecb6caea?q=80&w=800&auto=format&fit=crop",
        stock: 30,
        sizes: &[("M", 10), ("L", 15), ("XL", 5)],
        collections: &["best-collection", "winter-wear"],
    },
    DemoProduct {
        name: "Slim Fit Chinos",
        category: "Men",
        price: 249_900,
        description: "Comfortable slim fit chinos in beige. Versatile for casual and semi-formal looks.",
        image: "https://images.unsplash.com/photo-1473966968600-fa801b869a1a?q=80&w=800&auto=format&fit=crop",
        stock: 40,
        sizes: &[("30", 10), ("32", 15), ("34", 15)],
        collections: &["office-wear"],
    },
    DemoProduct {
        name: "Denim Jacket",
        category: "Men",
        price: 349_900,
        description: "Classic denim jacket with a modern cut. Rugged and stylish.",
        image: "https://images.unsplash.com/photo-1620799140408-edc6dcb6d633?q=80&w=800&auto=format&fit=crop",
        stock: 25,
        sizes: &[("S", 5), ("M", 10), ("L", 8), ("XL", 2)],
        collections: &["best-collection"],
    },
    DemoProduct {
        name: "Black Hoodie",
        category: "Men",
        price: 189_900,
        description: "Soft and warm black hoodie. Your go-to comfort wear.",
        image: "https://images.unsplash.com/photo-1556821840-3a63f95609a7?q=80&w=800&auto=format&fit=crop",
        stock: 60,
        sizes: &[("S", 10), ("M", 20), ("L", 20), ("XL", 10)],
        collections: &[],
    },
    // Women's Collection
    DemoProduct {
        name: "Floral Summer Dress",
        category: "Women",
        price: 299_900,
        description: "Breezy floral print dress, perfect for summer days.",
        image: "https://images.unsplash.com/photo-1572804013309-59a88b7e92f1?q=80&w=800&auto=format&fit=crop",
        stock: 35,
        sizes: &[("XS", 5), ("S", 10), ("M", 15), ("L", 5)],
        collections: &["best-collection", "summer-essentials"],
    },
    DemoProduct {
        name: "Elegant Black Blazer",
        category: "Women",
        price: 549_900,
        description: "Sharp and sophisticated black blazer for power dressing.",
        image: "https://images.unsplash.com/photo-1548624149-f9b1859aa2d0?q=80&w=800&auto=format&fit=crop",
        stock: 20,
        sizes: &[("S", 10), ("M", 10)],
        collections: &["best-collection", "office-wear"],
    },
    DemoProduct {
        name: "High-Waist Jeans",
        category: "Women",
        price: 229_900,
        description: "Vintage inspired high-waist denim jeans.",
        image: "https://images.unsplash.com/photo-1541099649105-f69ad21f3246?q=80&w=800&auto=format&fit=crop",
        stock: 45,
        sizes: &[("26", 10), ("28", 15), ("30", 15), ("32", 5)],
        collections: &[],
    },
    DemoProduct {
        name: "Silk Blouse",
        category: "Women",
        price: 329_900,
        description: "Luxurious silk blouse in champagne color.",
        image: "https://images.unsplash.com/photo-1564257631407-4deb1f99d992?q=80&w=800&auto=format&fit=crop",
        stock: 15,
        sizes: &[("S", 5), ("M", 5), ("L", 5)],
        collections: &["best-collection"],
    },
    DemoProduct {
        name: "Knitted Sweater",
        category: "Women",
        price: 269_900,
        description: "Cozy oversized knitted sweater in beige.",
        image: "https://images.unsplash.com/photo-1576566588028-4147f3842f27?q=80&w=800&auto=format&fit=crop",
        stock: 30,
        sizes: &[("S", 10), ("M", 15), ("L", 5)],
        collections: &["winter-wear"],
    },
    // Accessories
    DemoProduct {
        name: "Leather Messenger Bag",
        category: "Accessories",
        price: 699_900,
        description: "Premium handcrafted leather messenger bag.",
        image: "https://images.unsplash.com/photo-1553062407-98eeb64c6a62?q=80&w=800&auto=format&fit=crop",
        stock: 15,
        sizes: &[("One Size", 15)],
        collections: &["best-collection"],
    },
    DemoProduct {
        name: "Minimalist Watch",
        category: "Accessories",
        price: 349_900,
        description: "Sleek and minimalist analog watch with leather strap.",
        image: "https://images.unsplash.com/photo-1524592094714-0f0654e20314?q=80&w=800&auto=format&fit=crop",
        stock: 50,
        sizes: &[("One Size", 50)],
        collections: &["best-collection"],
    },
    DemoProduct {
        name: "Classic Sunglasses",
        category: "Accessories",
        price: 149_900,
        description: "Timeless aviator style sunglasses with UV protection.",
        image: "https://images.unsplash.com/photo-1572635196237-14b3f281e960?q=80&w=800&auto=format&fit=crop",
        stock: 100,
        sizes: &[("One Size", 100)],
        collections: &["summer-essentials"],
    },
    DemoProduct {
        name: "Baseball Cap",
        category: "Accessories",
        price: 79_900,
        description: "Cotton baseball cap in various colors.",
        image: "https://images.unsplash.com/photo-1588850561407-ed78c282e89b?q=80&w=800&auto=format&fit=crop",
        stock: 60,
        sizes: &[("One Size", 60)],
        collections: &[],
    },
    DemoProduct {
        name: "Canvas Sneakers",
        category: "Accessories",
        price: 199_900,
        description: "White canvas sneakers, everyday essential.",
        image: "https://images.unsplash.com/photo-1595950653106-6c9ebd614d3a?q=80&w=800&auto=format&fit=crop",
        stock: 40,
        sizes: &[("38", 10), ("40", 10), ("42", 10), ("44", 10)],
        collections: &["best-collection"],
    },
];

/// Seed the default categories and demo products.
///
/// # Errors
///
/// Returns an error if the database URL is missing or a query fails.
pub async fn run() -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("HEMLINE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| SeedError::MissingEnvVar("HEMLINE_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    seed_categories(&pool).await?;
    seed_products(&pool).await?;

    tracing::info!("Seeding complete!");
    Ok(())
}

/// Insert the default categories when the table is empty.
async fn seed_categories(pool: &PgPool) -> Result<(), SeedError> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM store.category")
        .fetch_one(pool)
        .await?;

    if existing > 0 {
        tracing::info!(existing, "Categories already present, skipping");
        return Ok(());
    }

    for (name, description) in DEFAULT_CATEGORIES {
        sqlx::query(
            "INSERT INTO store.category (name, description, created_by) VALUES ($1, $2, 'system')",
        )
        .bind(name)
        .bind(description)
        .execute(pool)
        .await?;
    }

    tracing::info!(
        count = DEFAULT_CATEGORIES.len(),
        "Default categories created"
    );
    Ok(())
}

/// Insert demo products that are not already present, matched by name.
async fn seed_products(pool: &PgPool) -> Result<(), SeedError> {
    let mut added = 0_usize;

    for product in DEMO_PRODUCTS {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM store.product WHERE name = $1)")
                .bind(product.name)
                .fetch_one(pool)
                .await?;

        if exists {
            tracing::info!(name = product.name, "Already present, skipping");
            continue;
        }

        let sizes: serde_json::Map<String, serde_json::Value> = product
            .sizes
            .iter()
            .map(|&(label, count)| (label.to_owned(), count.into()))
            .collect();
        let collections: Vec<String> = product
            .collections
            .iter()
            .map(|&c| c.to_owned())
            .collect();

        sqlx::query(
            r"
            INSERT INTO store.product
                (name, category, price, description, stock, sizes, images, collections)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(product.name)
        .bind(product.category)
        .bind(product.price)
        .bind(product.description)
        .bind(product.stock)
        .bind(serde_json::Value::Object(sizes))
        .bind(serde_json::json!([product.image]))
        .bind(&collections)
        .execute(pool)
        .await?;

        added += 1;
        tracing::info!(name = product.name, "Added");
    }

    tracing::info!(added, "Demo products seeded");
    Ok(())
}
