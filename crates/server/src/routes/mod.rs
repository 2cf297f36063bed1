//! HTTP route handlers for the CRM API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Health check
//!
//! # Customers
//! POST /customers                       - Create customer (with addresses)
//! GET  /customers/history               - History lookup (?email= xor ?telephone=)
//! POST /customers/{customer_id}/orders  - Create order for a customer
//!
//! # Analytics
//! GET  /analytics/orders/by-zip         - Order counts per ZIP (?kind=billing|shipping)
//! GET  /analytics/in-store/hours        - In-store order counts per hour of day
//! GET  /analytics/in-store/top-customers - Top in-store customers (?limit=, default 5)
//! ```

pub mod analytics;
pub mod customers;
pub mod orders;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the full application router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/customers", post(customers::create_customer))
        .route("/customers/history", get(customers::customer_history))
        .route(
            "/customers/{customer_id}/orders",
            post(orders::create_order),
        )
        .route("/analytics/orders/by-zip", get(analytics::orders_by_zip))
        .route("/analytics/in-store/hours", get(analytics::in_store_hours))
        .route(
            "/analytics/in-store/top-customers",
            get(analytics::top_in_store_customers),
        )
}

/// Health check endpoint.
async fn health() -> &'static str {
    "OK"
}
