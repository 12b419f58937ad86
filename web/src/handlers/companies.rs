//! Company registration, login and hall lookups.

use super::CompanyQuery;
use crate::error::AppError;
use crate::extractors::{ApiJson, ApiQuery};
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use banquet_core::providers::BanquetStore;
use banquet_core::tenant::{
    self, BanquetDetails, Company, CompanyRequest, CompanyUserRequest, LoginRequest,
};
use banquet_core::{CompanyId, DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// Successful login: the company row plus the id that logged in.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Always `"Login successful"`.
    pub message: &'static str,
    /// Company fields with `company_id` and the logged-in `user_id`.
    pub company: Map<String, Value>,
}

/// A newly attached sub-user.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyUserResponse {
    /// Row id.
    pub id: i64,
    /// Login id.
    pub user_id: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Declared hall names.
#[derive(Debug, Clone, Serialize)]
pub struct HallNamesResponse {
    /// Non-empty names in declaration order.
    pub banquet_halls: Vec<String>,
}

/// Register a company. Served at the router root.
///
/// # Errors
///
/// - 400 for missing fields or an unknown plan
/// - 409 when the login id is taken
pub async fn create_company<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiJson(request): ApiJson<CompanyRequest>,
) -> Result<(StatusCode, Json<Company>), AppError> {
    let company = tenant::register_company(&state.store, &state.env, request).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// Check a primary or sub-user credential.
///
/// # Errors
///
/// - 401 for an unknown id or wrong password
/// - 403 when the company's plan has expired
pub async fn login<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let session = tenant::login(&state.store, &state.env, request).await?;
    let company_id = session.company.id;

    let Value::Object(mut company) = serde_json::to_value(&session.company)
        .map_err(|e| AppError::internal("Failed to encode company").with_details(e.to_string()))?
    else {
        return Err(AppError::internal("Failed to encode company"));
    };
    company.insert("company_id".to_string(), Value::from(company_id.get()));
    company.insert("user_id".to_string(), Value::from(session.user_id.clone()));

    tracing::info!(company_id = %company_id, user_id = %session.user_id, "Login succeeded");
    Ok(Json(LoginResponse {
        message: "Login successful",
        company,
    }))
}

/// Attach a sub-user login to a company.
///
/// # Errors
///
/// - 404 for an unknown company
/// - 409 when the login id is taken
pub async fn add_company_user<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiJson(request): ApiJson<CompanyUserRequest>,
) -> Result<(StatusCode, Json<CompanyUserResponse>), AppError> {
    let user = tenant::add_company_user(&state.store, &state.env, request).await?;
    tracing::info!(company_id = %user.company_id, user_id = %user.user_id, "Company user added");
    Ok((
        StatusCode::CREATED,
        Json(CompanyUserResponse {
            id: user.id,
            user_id: user.user_id,
            created_at: user.created_at,
        }),
    ))
}

/// Names of the halls a company declared.
pub async fn banquet_halls<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiQuery(query): ApiQuery<CompanyQuery>,
) -> Result<Json<HallNamesResponse>, AppError> {
    let company_id: CompanyId = query.company_id()?;
    let banquet_halls = tenant::banquet_halls(&state.store, company_id).await?;
    Ok(Json(HallNamesResponse { banquet_halls }))
}

/// Hall descriptors together with the slot catalog.
pub async fn banquet_details<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiQuery(query): ApiQuery<CompanyQuery>,
) -> Result<Json<BanquetDetails>, AppError> {
    let company_id = query.company_id()?;
    Ok(Json(tenant::banquet_details(&state.store, company_id).await?))
}
