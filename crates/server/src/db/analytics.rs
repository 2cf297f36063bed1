//! Read-only aggregate queries over the order data.
//!
//! Each report is a single GROUP BY statement with a deterministic
//! secondary sort. No side effects.

use sqlx::SqlitePool;
use tracing::instrument;

use tradepost_core::{AddressKind, CustomerId, OrderChannel};

use super::RepositoryError;
use crate::models::{HourOrderCount, TopCustomer, ZipOrderCount};

/// Count orders per ZIP code of the given address kind.
///
/// Joins orders to their customer's addresses of the given kind and groups
/// by ZIP. Ordered by count descending, then ZIP ascending.
///
/// # Errors
///
/// Returns error if the database query fails.
#[instrument(skip(pool), fields(kind = %kind))]
pub async fn orders_by_zip(
    pool: &SqlitePool,
    kind: AddressKind,
) -> Result<Vec<ZipOrderCount>, RepositoryError> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        r"
        SELECT a.zip_code, COUNT(DISTINCT o.id) AS order_count
        FROM orders o
        JOIN customers c ON c.id = o.customer_id
        JOIN addresses a ON a.customer_id = c.id
        WHERE a.kind = ?
        GROUP BY a.zip_code
        ORDER BY COUNT(DISTINCT o.id) DESC, a.zip_code ASC
        ",
    )
    .bind(kind)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(zip_code, order_count)| ZipOrderCount {
            zip_code,
            order_count,
        })
        .collect())
}

/// Count in-store orders per hour of day (0-23).
///
/// Orders with a missing timestamp are excluded. Ordered by count
/// descending, then hour ascending.
///
/// # Errors
///
/// Returns error if the database query fails.
#[instrument(skip(pool))]
pub async fn in_store_hours(pool: &SqlitePool) -> Result<Vec<HourOrderCount>, RepositoryError> {
    let rows: Vec<(i64, i64)> = sqlx::query_as(
        r"
        SELECT CAST(strftime('%H', created_at) AS INTEGER) AS hour,
               COUNT(id) AS order_count
        FROM orders
        WHERE channel = ? AND created_at IS NOT NULL
        GROUP BY hour
        ORDER BY order_count DESC, hour ASC
        ",
    )
    .bind(OrderChannel::InStore)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(hour, order_count)| HourOrderCount { hour, order_count })
        .collect())
}

/// The `limit` customers with the most in-store orders, descending by
/// count, ties broken by ascending customer ID (earliest-created first).
///
/// Customers with zero in-store orders never appear (the join filters
/// them out).
///
/// # Errors
///
/// Returns error if the database query fails.
#[instrument(skip(pool))]
pub async fn top_in_store_customers(
    pool: &SqlitePool,
    limit: u32,
) -> Result<Vec<TopCustomer>, RepositoryError> {
    let rows: Vec<(i64, String, String, i64)> = sqlx::query_as(
        r"
        SELECT c.id, c.first_name, c.last_name, COUNT(o.id) AS order_count
        FROM customers c
        JOIN orders o ON o.customer_id = c.id
        WHERE o.channel = ?
        GROUP BY c.id, c.first_name, c.last_name
        ORDER BY COUNT(o.id) DESC, c.id ASC
        LIMIT ?
        ",
    )
    .bind(OrderChannel::InStore)
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, first_name, last_name, order_count)| TopCustomer {
            customer_id: CustomerId::new(id),
            first_name,
            last_name,
            order_count,
        })
        .collect())
}
