//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use tradepost_core::{AddressId, CustomerId, OrderChannel};

use crate::db::orders::{NewOrder, NewShippingAddress};
use crate::db::{OrderRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::models::Order;
use crate::state::AppState;

/// Request body for creating an order.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub channel: OrderChannel,
    pub total_amount: f64,
    /// Existing shipping-kind addresses of the customer to link.
    #[serde(default)]
    pub shipping_address_ids: Vec<AddressId>,
    /// New shipping addresses, persisted as part of the order.
    #[serde(default)]
    pub shipping_addresses: Vec<ShippingAddressPayload>,
}

/// An inline shipping address as submitted by a client.
#[derive(Debug, Deserialize)]
pub struct ShippingAddressPayload {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl ShippingAddressPayload {
    fn into_new_address(self) -> Result<NewShippingAddress> {
        for (field, value) in [
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("zip_code", &self.zip_code),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!(
                    "shipping address {field} must not be empty"
                )));
            }
        }

        Ok(NewShippingAddress {
            street: self.street,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
        })
    }
}

/// Create an order for an existing customer.
///
/// Returns 201 with the created order, 404 for an unknown customer, 400 on
/// validation failure (negative total, in-store order carrying shipping
/// addresses, or an unusable address reference).
///
/// # Errors
///
/// Returns an error if the payload is invalid or the write fails.
pub async fn create_order(
    State(state): State<AppState>,
    Path(customer_id): Path<i64>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let shipping_addresses = body
        .shipping_addresses
        .into_iter()
        .map(ShippingAddressPayload::into_new_address)
        .collect::<Result<Vec<_>>>()?;

    let order = OrderRepository::new(state.pool())
        .create(
            CustomerId::new(customer_id),
            NewOrder {
                channel: body.channel,
                total_amount: body.total_amount,
                shipping_address_ids: body.shipping_address_ids,
                shipping_addresses,
            },
        )
        .await
        .map_err(|err| match err {
            RepositoryError::NotFound => {
                AppError::NotFound(format!("customer {customer_id}"))
            }
            other => AppError::Repository(other),
        })?;

    Ok((StatusCode::CREATED, Json(order)))
}
