//! Customer route handlers.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use tradepost_core::{AddressKind, Email, Telephone};

use crate::db::customers::{CustomerLookup, NewAddress, NewCustomer};
use crate::db::{CustomerRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::models::{Customer, CustomerHistory};
use crate::state::AppState;

/// Request body for creating a customer.
#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub telephone: String,
    /// Initial addresses, created atomically with the customer.
    #[serde(default)]
    pub addresses: Vec<AddressPayload>,
}

/// An address as submitted by a client.
#[derive(Debug, Deserialize)]
pub struct AddressPayload {
    pub kind: AddressKind,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl AddressPayload {
    /// Validate the postal fields and convert into repository parameters.
    fn into_new_address(self) -> Result<NewAddress> {
        for (field, value) in [
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("zip_code", &self.zip_code),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!(
                    "address {field} must not be empty"
                )));
            }
        }

        Ok(NewAddress {
            kind: self.kind,
            street: self.street,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
        })
    }
}

/// Create a customer.
///
/// Returns 201 with the created customer, 409 if the email or telephone is
/// already registered, 400 on validation failure.
///
/// # Errors
///
/// Returns an error if the payload is invalid or the write fails.
pub async fn create_customer(
    State(state): State<AppState>,
    Json(body): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<Customer>)> {
    let first_name = body.first_name.trim().to_owned();
    let last_name = body.last_name.trim().to_owned();
    if first_name.is_empty() {
        return Err(AppError::Validation("first_name must not be empty".to_owned()));
    }
    if last_name.is_empty() {
        return Err(AppError::Validation("last_name must not be empty".to_owned()));
    }

    let email = Email::parse(body.email.trim())
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let telephone = Telephone::parse(body.telephone.trim())
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let addresses = body
        .addresses
        .into_iter()
        .map(AddressPayload::into_new_address)
        .collect::<Result<Vec<_>>>()?;

    let customer = CustomerRepository::new(state.pool())
        .create(NewCustomer {
            first_name,
            last_name,
            email,
            telephone,
            addresses,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

/// Query parameters for the history lookup.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub email: Option<String>,
    pub telephone: Option<String>,
}

/// Look up a customer's full history by email or telephone.
///
/// Exactly one of `email` / `telephone` must be supplied.
///
/// # Errors
///
/// Returns 400 if both or neither parameter is given, 404 if no customer
/// matches.
pub async fn customer_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<CustomerHistory>> {
    let lookup = match (params.email, params.telephone) {
        (Some(email), None) => CustomerLookup::Email(
            Email::parse(email.trim()).map_err(|e| AppError::Validation(e.to_string()))?,
        ),
        (None, Some(telephone)) => CustomerLookup::Telephone(
            Telephone::parse(telephone.trim())
                .map_err(|e| AppError::Validation(e.to_string()))?,
        ),
        (Some(_), Some(_)) | (None, None) => {
            return Err(AppError::Validation(
                "supply exactly one of email or telephone".to_owned(),
            ));
        }
    };

    let history = CustomerRepository::new(state.pool())
        .history(&lookup)
        .await
        .map_err(|err| match err {
            RepositoryError::NotFound => {
                AppError::NotFound("no customer matches the given key".to_owned())
            }
            other => AppError::Repository(other),
        })?;
    Ok(Json(history))
}
