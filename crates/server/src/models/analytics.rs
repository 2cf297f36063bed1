//! Aggregate rows returned by the analytics queries.

use serde::Serialize;

use tradepost_core::CustomerId;

/// Order count for one ZIP code.
#[derive(Debug, Clone, Serialize)]
pub struct ZipOrderCount {
    /// ZIP / postal code.
    pub zip_code: String,
    /// Number of orders counted against this ZIP.
    pub order_count: i64,
}

/// In-store order count for one hour of the day.
#[derive(Debug, Clone, Serialize)]
pub struct HourOrderCount {
    /// Hour of day, 0-23.
    pub hour: i64,
    /// Number of in-store orders placed in this hour.
    pub order_count: i64,
}

/// A customer ranked by in-store order count.
#[derive(Debug, Clone, Serialize)]
pub struct TopCustomer {
    /// The customer's ID.
    pub customer_id: CustomerId,
    /// The customer's first name.
    pub first_name: String,
    /// The customer's last name.
    pub last_name: String,
    /// Number of in-store orders the customer has placed.
    pub order_count: i64,
}
