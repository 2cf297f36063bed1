//! Order domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tradepost_core::{CustomerId, OrderChannel, OrderId};

use super::customer::Address;

/// A purchase event owned by one customer. Immutable once created.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Owning customer.
    pub customer_id: CustomerId,
    /// In-store or online.
    pub channel: OrderChannel,
    /// Total amount of the purchase.
    pub total_amount: f64,
    /// Timestamp of purchase. Orders without one are excluded from the
    /// hour-of-day analytics.
    pub created_at: Option<DateTime<Utc>>,
    /// Shipping addresses linked to this order. Always empty for in-store
    /// orders; always shipping-kind rows.
    pub shipping_addresses: Vec<Address>,
}
