//! Analytics route handlers. Read-only.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use tradepost_core::AddressKind;

use crate::db::analytics;
use crate::error::Result;
use crate::models::{HourOrderCount, TopCustomer, ZipOrderCount};
use crate::state::AppState;

/// Default number of customers in the top-customers report.
const DEFAULT_TOP_CUSTOMERS_LIMIT: u32 = 5;

/// Query parameters for the orders-by-ZIP report.
#[derive(Debug, Deserialize)]
pub struct OrdersByZipParams {
    /// Which address kind to count against: billing or shipping.
    pub kind: AddressKind,
}

/// Order counts per ZIP code of the given address kind.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn orders_by_zip(
    State(state): State<AppState>,
    Query(params): Query<OrdersByZipParams>,
) -> Result<Json<Vec<ZipOrderCount>>> {
    let rows = analytics::orders_by_zip(state.pool(), params.kind).await?;
    Ok(Json(rows))
}

/// In-store order counts per hour of day.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn in_store_hours(State(state): State<AppState>) -> Result<Json<Vec<HourOrderCount>>> {
    let rows = analytics::in_store_hours(state.pool()).await?;
    Ok(Json(rows))
}

/// Query parameters for the top-customers report.
#[derive(Debug, Deserialize)]
pub struct TopCustomersParams {
    /// How many customers to return (default 5).
    pub limit: Option<u32>,
}

/// The customers with the most in-store orders.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn top_in_store_customers(
    State(state): State<AppState>,
    Query(params): Query<TopCustomersParams>,
) -> Result<Json<Vec<TopCustomer>>> {
    let limit = params.limit.unwrap_or(DEFAULT_TOP_CUSTOMERS_LIMIT);
    let rows = analytics::top_in_store_customers(state.pool(), limit).await?;
    Ok(Json(rows))
}
