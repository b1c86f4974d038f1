//! Shared domain types for the Hemline storefront.
//!
//! Everything here is plain data: typed row ids, money in minor units,
//! validated emails and account roles. No I/O and no async, so the
//! server and the CLI can both depend on it without dragging either's
//! stack along.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
