//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration, login, Google sign-in and bearer tokens
//! - `cart` - Cart rows, repeat-add folding and stock-aware updates
//! - `catalog` - Product form assembly, image uploads and stock additions
//! - `grouping` - Colour-variant cliques
//! - `orders` - Checkout validation, COD charge and order views

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod grouping;
pub mod orders;

pub use auth::{AuthService, Registration};
pub use cart::CartService;
pub use catalog::{CatalogService, ProductForm, UploadedImage};
pub use grouping::GroupingService;
pub use orders::{CheckoutRequest, OrderService};
