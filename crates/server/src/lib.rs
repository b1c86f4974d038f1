//! Hemline storefront API library.
//!
//! The server is exposed as a library so the CLI can reuse the password
//! hashing and repository layer, and so integration tests can link
//! against the route and service types.
//!
//! # Security
//!
//! This crate handles customer credentials and sessions:
//! - Argon2 password hashes, never logged or serialized
//! - HS256 bearer tokens signed with `HEMLINE_JWT_SECRET`
//! - Optional Google OAuth sign-in
//!
//! Secrets are wrapped in `secrecy::SecretString` so accidental `Debug`
//! output stays redacted.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod google;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
