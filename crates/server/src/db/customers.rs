//! Customer repository for database operations.
//!
//! Creates customers (with their initial addresses) atomically and answers
//! the history lookup with explicit joins - no lazy relationship loading.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::instrument;

use tradepost_core::{AddressId, AddressKind, CustomerId, Email, OrderId, Telephone};

use super::RepositoryError;
use crate::models::{Address, Customer, CustomerHistory, Order};

/// Parameters for creating a new customer.
#[derive(Debug)]
pub struct NewCustomer {
    /// First name (validated non-empty by the caller).
    pub first_name: String,
    /// Last name (validated non-empty by the caller).
    pub last_name: String,
    /// Email address, unique across all customers.
    pub email: Email,
    /// Telephone number, unique across all customers.
    pub telephone: Telephone,
    /// Initial addresses to create alongside the customer.
    pub addresses: Vec<NewAddress>,
}

/// Parameters for creating a new address.
#[derive(Debug)]
pub struct NewAddress {
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
}

/// Lookup key for the history query: exactly one of email or telephone.
///
/// The route layer enforces the exactly-one rule before constructing this.
#[derive(Debug)]
pub enum CustomerLookup {
    /// Look up by email.
    Email(Email),
    /// Look up by telephone.
    Telephone(Telephone),
}

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    telephone: String,
    created_at: DateTime<Utc>,
}

impl CustomerRow {
    /// Convert a raw row into the domain type, without addresses.
    fn into_customer(self) -> Result<Customer, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let telephone = Telephone::parse(&self.telephone).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid telephone in database: {e}"))
        })?;

        Ok(Customer {
            id: CustomerId::new(self.id),
            first_name: self.first_name,
            last_name: self.last_name,
            email,
            telephone,
            created_at: self.created_at,
            addresses: Vec::new(),
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct AddressRow {
    pub(crate) id: i64,
    pub(crate) customer_id: i64,
    pub(crate) kind: AddressKind,
    pub(crate) street: String,
    pub(crate) city: String,
    pub(crate) state: String,
    pub(crate) zip_code: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: AddressId::new(row.id),
            customer_id: CustomerId::new(row.customer_id),
            kind: row.kind,
            street: row.street,
            city: row.city,
            state: row.state,
            zip_code: row.zip_code,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    customer_id: i64,
    channel: tradepost_core::OrderChannel,
    total_amount: f64,
    created_at: Option<DateTime<Utc>>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            customer_id: CustomerId::new(row.customer_id),
            channel: row.channel,
            total_amount: row.total_amount,
            created_at: row.created_at,
            shipping_addresses: Vec::new(),
        }
    }
}

/// Insert one address row inside an open transaction, returning its ID.
///
/// Shared with the order repository, which persists inline shipping
/// addresses as part of the order transaction.
pub(crate) async fn insert_address(
    tx: &mut Transaction<'_, Sqlite>,
    customer_id: CustomerId,
    kind: AddressKind,
    street: &str,
    city: &str,
    state: &str,
    zip_code: &str,
    created_at: DateTime<Utc>,
) -> Result<Address, RepositoryError> {
    let row: AddressRow = sqlx::query_as(
        r"
        INSERT INTO addresses (customer_id, kind, street, city, state, zip_code, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id, customer_id, kind, street, city, state, zip_code, created_at
        ",
    )
    .bind(customer_id.as_i64())
    .bind(kind)
    .bind(street)
    .bind(city)
    .bind(state)
    .bind(zip_code)
    .bind(created_at)
    .fetch_one(&mut **tx)
    .await?;

    Ok(row.into())
}

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a customer together with their initial addresses.
    ///
    /// The uniqueness pre-checks, the customer insert, and every address
    /// insert run in one transaction: either all rows commit or none do.
    /// The UNIQUE constraints backstop the pre-check against concurrent
    /// writers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or telephone is
    /// already registered, `RepositoryError::Database` for other failures.
    #[instrument(skip(self, new), fields(email = %new.email))]
    pub async fn create(&self, new: NewCustomer) -> Result<Customer, RepositoryError> {
        // Immediate mode takes the write lock up front so concurrent
        // creates queue on the busy timeout rather than failing the
        // deferred-to-write upgrade.
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let email_taken: (bool,) =
            sqlx::query_as(r"SELECT EXISTS(SELECT 1 FROM customers WHERE email = ?)")
                .bind(new.email.as_str())
                .fetch_one(&mut *tx)
                .await?;
        if email_taken.0 {
            return Err(RepositoryError::Conflict(
                "email already registered".to_owned(),
            ));
        }

        let telephone_taken: (bool,) =
            sqlx::query_as(r"SELECT EXISTS(SELECT 1 FROM customers WHERE telephone = ?)")
                .bind(new.telephone.as_str())
                .fetch_one(&mut *tx)
                .await?;
        if telephone_taken.0 {
            return Err(RepositoryError::Conflict(
                "telephone already registered".to_owned(),
            ));
        }

        let created_at = Utc::now();
        let row: CustomerRow = sqlx::query_as(
            r"
            INSERT INTO customers (first_name, last_name, email, telephone, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, first_name, last_name, email, telephone, created_at
            ",
        )
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(new.email.as_str())
        .bind(new.telephone.as_str())
        .bind(created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email or telephone already registered".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        let mut customer = row.into_customer()?;

        for address in &new.addresses {
            let created = insert_address(
                &mut tx,
                customer.id,
                address.kind,
                &address.street,
                &address.city,
                &address.state,
                &address.zip_code,
                created_at,
            )
            .await?;
            customer.addresses.push(created);
        }

        tx.commit().await?;

        tracing::debug!(customer_id = %customer.id, "Created customer");
        Ok(customer)
    }

    /// Get a customer (with their addresses) by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Customer>, RepositoryError> {
        let row: Option<CustomerRow> = sqlx::query_as(
            r"
            SELECT id, first_name, last_name, email, telephone, created_at
            FROM customers
            WHERE email = ?
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        self.attach_addresses(row).await
    }

    /// Get a customer (with their addresses) by telephone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_telephone(
        &self,
        telephone: &Telephone,
    ) -> Result<Option<Customer>, RepositoryError> {
        let row: Option<CustomerRow> = sqlx::query_as(
            r"
            SELECT id, first_name, last_name, email, telephone, created_at
            FROM customers
            WHERE telephone = ?
            ",
        )
        .bind(telephone.as_str())
        .fetch_optional(self.pool)
        .await?;

        self.attach_addresses(row).await
    }

    /// The matching customer plus all of their orders (each with its
    /// shipping addresses) and all of their standalone addresses.
    ///
    /// Orders come back sorted by timestamp ascending, then by ID, so the
    /// result is deterministic. All joins are explicit queries.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no customer matches the
    /// lookup key.
    #[instrument(skip(self, lookup))]
    pub async fn history(&self, lookup: &CustomerLookup) -> Result<CustomerHistory, RepositoryError> {
        let customer = match lookup {
            CustomerLookup::Email(email) => self.get_by_email(email).await?,
            CustomerLookup::Telephone(telephone) => self.get_by_telephone(telephone).await?,
        }
        .ok_or(RepositoryError::NotFound)?;

        let order_rows: Vec<OrderRow> = sqlx::query_as(
            r"
            SELECT id, customer_id, channel, total_amount, created_at
            FROM orders
            WHERE customer_id = ?
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(customer.id.as_i64())
        .fetch_all(self.pool)
        .await?;

        let mut orders: Vec<Order> = order_rows.into_iter().map(Order::from).collect();

        // One query for all of the customer's order-address links, grouped
        // into the orders in Rust.
        #[derive(sqlx::FromRow)]
        struct LinkedAddressRow {
            order_id: i64,
            #[sqlx(flatten)]
            address: AddressRow,
        }

        let linked: Vec<LinkedAddressRow> = sqlx::query_as(
            r"
            SELECT osa.order_id AS order_id,
                   a.id, a.customer_id, a.kind, a.street, a.city, a.state,
                   a.zip_code, a.created_at
            FROM order_shipping_addresses osa
            JOIN addresses a ON a.id = osa.address_id
            JOIN orders o ON o.id = osa.order_id
            WHERE o.customer_id = ?
            ORDER BY osa.order_id ASC, a.id ASC
            ",
        )
        .bind(customer.id.as_i64())
        .fetch_all(self.pool)
        .await?;

        for link in linked {
            let order_id = OrderId::new(link.order_id);
            if let Some(order) = orders.iter_mut().find(|o| o.id == order_id) {
                order.shipping_addresses.push(link.address.into());
            }
        }

        Ok(CustomerHistory { customer, orders })
    }

    /// Load the addresses for an optional customer row.
    async fn attach_addresses(
        &self,
        row: Option<CustomerRow>,
    ) -> Result<Option<Customer>, RepositoryError> {
        let Some(row) = row else {
            return Ok(None);
        };

        let mut customer = row.into_customer()?;

        let address_rows: Vec<AddressRow> = sqlx::query_as(
            r"
            SELECT id, customer_id, kind, street, city, state, zip_code, created_at
            FROM addresses
            WHERE customer_id = ?
            ORDER BY id ASC
            ",
        )
        .bind(customer.id.as_i64())
        .fetch_all(self.pool)
        .await?;

        customer.addresses = address_rows.into_iter().map(Address::from).collect();
        Ok(Some(customer))
    }
}
