//! Customer directory endpoints.

use super::{CompanyQuery, MessageResponse};
use crate::error::AppError;
use crate::extractors::{ApiJson, ApiQuery};
use crate::middleware::record_company;
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use banquet_core::customer::{
    Customer, CustomerRequest, CustomerSearch, CustomerSearchQuery, CustomerUpdate,
    EventDetailsCheck, EventDetailsRequest, EventValidation, NewCustomer,
};
use banquet_core::de::parse_id;
use banquet_core::ids::CustomerId;
use banquet_core::providers::BanquetStore;
use serde::{Deserialize, Serialize};

/// `?customer_id=` query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerIdQuery {
    /// Raw customer id.
    pub customer_id: Option<String>,
}

/// Body of a passing validation.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ValidResponse {
    /// Always `true`.
    pub valid: bool,
}

/// All customers of a company ordered by name.
pub async fn list_customers<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiQuery(query): ApiQuery<CompanyQuery>,
) -> Result<Json<Vec<Customer>>, AppError> {
    let company_id = query.company_id()?;
    Ok(Json(state.store.list_customers(company_id).await?))
}

/// Register a customer.
///
/// # Errors
///
/// 400 when a field is missing, the name exists in the company or the phone
/// exists anywhere.
pub async fn add_customer<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiJson(request): ApiJson<CustomerRequest>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    let customer = NewCustomer::try_from(request)?;
    record_company(customer.company_id);
    let customer = state.store.add_customer(customer).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// Overwrite a customer's name and phone.
pub async fn update_customer<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiJson(request): ApiJson<CustomerRequest>,
) -> Result<Json<Customer>, AppError> {
    let update = CustomerUpdate::try_from(request)?;
    Ok(Json(state.store.update_customer(update).await?))
}

/// Remove a customer.
pub async fn delete_customer<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiQuery(query): ApiQuery<CustomerIdQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    let customer_id = parse_id("customer_id", query.customer_id.as_deref())?;
    state
        .store
        .delete_customer(CustomerId::new(customer_id))
        .await?;
    Ok(Json(MessageResponse::new("Customer deleted successfully")))
}

/// Advisory duplicate check before an event is entered.
///
/// # Errors
///
/// 409 `{error, existingPhone}` when the name is taken, 409
/// `{error, existingName}` when the phone is taken within the company.
pub async fn validate_event<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiJson(request): ApiJson<EventDetailsRequest>,
) -> Result<Json<ValidResponse>, AppError> {
    let check = EventDetailsCheck::try_from(request)?;
    match state.store.validate_event_details(check).await? {
        EventValidation::Valid => Ok(Json(ValidResponse { valid: true })),
        EventValidation::NameExists { existing_phone } => {
            Err(AppError::conflict("Name already exists").with_field("existingPhone", existing_phone))
        }
        EventValidation::PhoneExists { existing_name } => Err(AppError::conflict(
            "Phone number already exists",
        )
        .with_field("existingName", existing_name)),
    }
}

/// Prefix search by name or phone, at most five rows.
///
/// # Endpoint
///
/// ```text
/// GET /api/customer-search?company_id=1&term=Sm&searchType=name
/// ```
pub async fn search_customers<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiQuery(query): ApiQuery<CustomerSearchQuery>,
) -> Result<Json<Vec<Customer>>, AppError> {
    let search = CustomerSearch::try_from(query)?;
    Ok(Json(state.store.search_customers(search).await?))
}
