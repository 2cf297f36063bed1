//! Database operations for the Tradepost `SQLite` store.
//!
//! ## Tables
//!
//! - `customers` - Identity records (unique email and telephone)
//! - `addresses` - Postal addresses owned by customers
//! - `orders` - Purchase events owned by customers
//! - `order_shipping_addresses` - Order-to-shipping-address association
//!
//! Schema setup is idempotent and runs at startup via
//! [`schema::ensure_schema`].

pub mod analytics;
pub mod customers;
pub mod orders;
pub mod schema;

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

pub use customers::CustomerRepository;
pub use orders::OrderRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email or telephone).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Input rows contradict the data model (e.g., linking a billing
    /// address to an order as a shipping address).
    #[error("invalid input: {0}")]
    Validation(String),
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// Foreign-key enforcement is switched on for every connection; the
/// database file is created if it does not exist.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is malformed or the connection cannot
/// be established.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}
