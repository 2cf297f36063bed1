//! Order repository for database operations.
//!
//! An order is created in a single transaction together with any inline
//! shipping addresses and its association rows: either every row commits or
//! none do.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::instrument;

use tradepost_core::{AddressId, AddressKind, CustomerId, OrderChannel, OrderId};

use super::RepositoryError;
use super::customers::insert_address;
use crate::models::{Address, Order};

/// Parameters for creating a new order.
#[derive(Debug)]
pub struct NewOrder {
    /// In-store or online.
    pub channel: OrderChannel,
    /// Total amount of the purchase (non-negative, finite).
    pub total_amount: f64,
    /// Existing shipping-kind addresses of the customer to link.
    pub shipping_address_ids: Vec<AddressId>,
    /// New shipping addresses to persist (owned by the same customer)
    /// before linking.
    pub shipping_addresses: Vec<NewShippingAddress>,
}

/// Parameters for an inline shipping address. Always persisted with
/// shipping kind.
#[derive(Debug)]
pub struct NewShippingAddress {
    /// Street line.
    pub street: String,
    /// City.
    pub city: String,
    /// State or region.
    pub state: String,
    /// ZIP / postal code.
    pub zip_code: String,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an order for an existing customer.
    ///
    /// Inline shipping addresses are persisted as shipping-kind rows owned
    /// by the same customer before being linked. Referenced address IDs
    /// must exist, belong to that customer, and be shipping-kind.
    ///
    /// # Errors
    ///
    /// - `RepositoryError::NotFound` if the customer does not exist.
    /// - `RepositoryError::Validation` if the total is negative or not
    ///   finite, if an in-store order carries shipping addresses, or if a
    ///   referenced address is unusable.
    /// - `RepositoryError::Database` for other failures.
    #[instrument(skip(self, new), fields(customer_id = %customer_id, channel = %new.channel))]
    pub async fn create(
        &self,
        customer_id: CustomerId,
        mut new: NewOrder,
    ) -> Result<Order, RepositoryError> {
        if !new.total_amount.is_finite() || new.total_amount < 0.0 {
            return Err(RepositoryError::Validation(
                "total amount must be a non-negative number".to_owned(),
            ));
        }

        if new.channel == OrderChannel::InStore
            && !(new.shipping_address_ids.is_empty() && new.shipping_addresses.is_empty())
        {
            return Err(RepositoryError::Validation(
                "in-store orders cannot carry shipping addresses".to_owned(),
            ));
        }

        // Immediate mode takes the write lock up front, see
        // `CustomerRepository::create`.
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let customer_exists: (bool,) =
            sqlx::query_as(r"SELECT EXISTS(SELECT 1 FROM customers WHERE id = ?)")
                .bind(customer_id.as_i64())
                .fetch_one(&mut *tx)
                .await?;
        if !customer_exists.0 {
            return Err(RepositoryError::NotFound);
        }

        let created_at = Utc::now();
        let (order_id,): (i64,) = sqlx::query_as(
            r"
            INSERT INTO orders (customer_id, channel, total_amount, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            ",
        )
        .bind(customer_id.as_i64())
        .bind(new.channel)
        .bind(new.total_amount)
        .bind(created_at)
        .fetch_one(&mut *tx)
        .await?;
        let order_id = OrderId::new(order_id);

        let mut shipping_addresses = Vec::new();

        // A repeated ID links the same address once, not twice.
        new.shipping_address_ids.sort_unstable();
        new.shipping_address_ids.dedup();

        // Referenced existing addresses: verify ownership and kind.
        for address_id in &new.shipping_address_ids {
            let row: Option<super::customers::AddressRow> = sqlx::query_as(
                r"
                SELECT id, customer_id, kind, street, city, state, zip_code, created_at
                FROM addresses
                WHERE id = ?
                ",
            )
            .bind(address_id.as_i64())
            .fetch_optional(&mut *tx)
            .await?;

            let address: Address = row
                .ok_or_else(|| {
                    RepositoryError::Validation(format!("unknown shipping address {address_id}"))
                })?
                .into();

            if address.customer_id != customer_id {
                return Err(RepositoryError::Validation(format!(
                    "address {address_id} belongs to a different customer"
                )));
            }
            if address.kind != AddressKind::Shipping {
                return Err(RepositoryError::Validation(format!(
                    "address {address_id} is not a shipping address"
                )));
            }

            shipping_addresses.push(address);
        }

        // Inline new addresses: persisted as shipping-kind rows owned by
        // the order's customer.
        for address in &new.shipping_addresses {
            let created = insert_address(
                &mut tx,
                customer_id,
                AddressKind::Shipping,
                &address.street,
                &address.city,
                &address.state,
                &address.zip_code,
                created_at,
            )
            .await?;
            shipping_addresses.push(created);
        }

        for address in &shipping_addresses {
            sqlx::query(
                r"
                INSERT INTO order_shipping_addresses (order_id, address_id)
                VALUES (?, ?)
                ",
            )
            .bind(order_id.as_i64())
            .bind(address.id.as_i64())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        shipping_addresses.sort_by_key(|a| a.id);

        tracing::debug!(order_id = %order_id, "Created order");
        Ok(Order {
            id: order_id,
            customer_id,
            channel: new.channel,
            total_amount: new.total_amount,
            created_at: Some(created_at),
            shipping_addresses,
        })
    }
}
