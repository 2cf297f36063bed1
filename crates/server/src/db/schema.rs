//! Idempotent schema bootstrap.
//!
//! `AUTOINCREMENT` keeps surrogate identifiers monotonically increasing and
//! never reused, even after (hypothetical future) deletes. Timestamps are
//! RFC 3339 UTC text written by the application.

use sqlx::SqlitePool;

const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS customers (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        first_name  TEXT NOT NULL,
        last_name   TEXT NOT NULL,
        email       TEXT NOT NULL UNIQUE,
        telephone   TEXT NOT NULL UNIQUE,
        created_at  TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS addresses (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        customer_id INTEGER NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
        kind        TEXT NOT NULL CHECK (kind IN ('billing', 'shipping')),
        street      TEXT NOT NULL,
        city        TEXT NOT NULL,
        state       TEXT NOT NULL,
        zip_code    TEXT NOT NULL,
        created_at  TEXT NOT NULL
    )
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_addresses_customer ON addresses (customer_id)
    ",
    r"
    CREATE TABLE IF NOT EXISTS orders (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        customer_id  INTEGER NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
        channel      TEXT NOT NULL CHECK (channel IN ('in_store', 'online')),
        total_amount REAL NOT NULL,
        created_at   TEXT
    )
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_orders_customer ON orders (customer_id)
    ",
    r"
    CREATE TABLE IF NOT EXISTS order_shipping_addresses (
        order_id   INTEGER NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
        address_id INTEGER NOT NULL REFERENCES addresses(id) ON DELETE CASCADE,
        PRIMARY KEY (order_id, address_id)
    )
    ",
];

/// Create all tables and indexes if they do not already exist.
///
/// # Errors
///
/// Returns `sqlx::Error` if any DDL statement fails.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::debug!("Schema ensured");
    Ok(())
}
