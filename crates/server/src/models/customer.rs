//! Customer and address domain types.
//!
//! These types represent validated domain objects separate from database row
//! types; the repositories convert rows into them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tradepost_core::{AddressId, AddressKind, CustomerId, Email, Telephone};

use super::order::Order;

/// A customer identity record.
///
/// Email and telephone are unique across all customers.
#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    /// Unique customer ID.
    pub id: CustomerId,
    /// Customer's first name.
    pub first_name: String,
    /// Customer's last name.
    pub last_name: String,
    /// Customer's email address (unique).
    pub email: Email,
    /// Customer's telephone number (unique).
    pub telephone: Telephone,
    /// When the customer was created.
    pub created_at: DateTime<Utc>,
    /// Addresses owned by this customer.
    pub addresses: Vec<Address>,
}

/// A postal address owned by exactly one customer.
#[derive(Debug, Clone, Serialize)]
pub struct Address {
    /// Unique address ID.
    pub id: AddressId,
    /// Owning customer.
    pub customer_id: CustomerId,
    /// Billing or shipping.
    pub kind: AddressKind,
    /// Street line.
    pub street: String,
    /// City.
    pub city: String,
    /// State or region.
    pub state: String,
    /// ZIP / postal code.
    pub zip_code: String,
    /// When the address was created.
    pub created_at: DateTime<Utc>,
}

/// A customer together with their full order history.
///
/// Orders are sorted by creation time ascending, then by ID, so the result
/// is deterministic. Each order carries its shipping addresses.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerHistory {
    /// The matching customer, with their standalone addresses.
    pub customer: Customer,
    /// All of the customer's orders, in creation order.
    pub orders: Vec<Order>,
}
