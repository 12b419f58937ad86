//! Function type and meal type pick lists.

use super::MessageResponse;
use crate::error::AppError;
use crate::extractors::{ApiJson, ApiPath};
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use banquet_core::catalog::{CatalogRename, CatalogRequest, FunctionType, MealType, NewCatalogEntry};
use banquet_core::de::{Required, parse_id};
use banquet_core::ids::{FunctionId, MealTypeId};
use banquet_core::providers::BanquetStore;
use serde::Serialize;

/// `{"function": ...}`
#[derive(Debug, Clone, Serialize)]
pub struct FunctionResponse {
    /// The stored entry.
    pub function: FunctionType,
}

/// `{"functions": [...]}`
#[derive(Debug, Clone, Serialize)]
pub struct FunctionsResponse {
    /// A user's entries by id.
    pub functions: Vec<FunctionType>,
}

/// `{"mealType": ...}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealTypeResponse {
    /// The stored entry.
    pub meal_type: MealType,
}

/// `{"mealTypes": [...]}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealTypesResponse {
    /// A user's entries by id.
    pub meal_types: Vec<MealType>,
}

/// Add a function type.
///
/// # Errors
///
/// 400 when a field is missing or the user already has the name.
pub async fn add_function<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiJson(request): ApiJson<CatalogRequest>,
) -> Result<Json<FunctionResponse>, AppError> {
    let entry = NewCatalogEntry::try_from(request)?;
    let function = state.store.add_function(entry).await?;
    Ok(Json(FunctionResponse { function }))
}

/// Rename a function type.
pub async fn edit_function<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiPath(raw_id): ApiPath<String>,
    ApiJson(request): ApiJson<CatalogRequest>,
) -> Result<Json<FunctionResponse>, AppError> {
    let id = FunctionId::new(parse_id("functionId", Some(&raw_id))?);
    let rename = CatalogRename::new(request, false)?;
    let function = state.store.rename_function(id, rename).await?;
    Ok(Json(FunctionResponse { function }))
}

/// Remove a function type; 204 on success.
pub async fn delete_function<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiPath(raw_id): ApiPath<String>,
) -> Result<StatusCode, AppError> {
    let id = FunctionId::new(parse_id("functionId", Some(&raw_id))?);
    state.store.delete_function(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// A user's function types.
pub async fn user_functions<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiPath(user_id): ApiPath<String>,
) -> Result<Json<FunctionsResponse>, AppError> {
    let functions = state.store.functions_for_user(&user_id).await?;
    Ok(Json(FunctionsResponse { functions }))
}

/// Add a meal type.
///
/// # Errors
///
/// 400 when a field is missing or the user has the name in any case.
pub async fn add_meal_type<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiJson(request): ApiJson<CatalogRequest>,
) -> Result<Json<MealTypeResponse>, AppError> {
    let entry = NewCatalogEntry::try_from(request)?;
    let meal_type = state.store.add_meal_type(entry).await?;
    Ok(Json(MealTypeResponse { meal_type }))
}

/// Rename a meal type owned by the `user_id` in the body.
pub async fn update_meal_type<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiPath(raw_id): ApiPath<String>,
    ApiJson(request): ApiJson<CatalogRequest>,
) -> Result<Json<MealTypeResponse>, AppError> {
    let id = MealTypeId::new(parse_id("id", Some(&raw_id))?);
    let rename = CatalogRename::new(request, true)?;
    let meal_type = state.store.rename_meal_type(id, rename).await?;
    Ok(Json(MealTypeResponse { meal_type }))
}

/// Remove a meal type owned by the `user_id` in the body.
pub async fn delete_meal_type<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiPath(raw_id): ApiPath<String>,
    ApiJson(request): ApiJson<CatalogRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = MealTypeId::new(parse_id("id", Some(&raw_id))?);
    let mut required = Required::default();
    let Some(user_id) = required.text("user_id", request.user_id) else {
        return Err(required.into_error().into());
    };

    state.store.delete_meal_type(id, &user_id).await?;
    Ok(Json(MessageResponse::new("Meal type deleted successfully")))
}

/// A user's meal types.
///
/// Shares the `/{id}` path segment with update and delete, so the segment is
/// read as a user id here.
pub async fn user_meal_types<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiPath(user_id): ApiPath<String>,
) -> Result<Json<MealTypesResponse>, AppError> {
    let meal_types = state.store.meal_types_for_user(&user_id).await?;
    Ok(Json(MealTypesResponse { meal_types }))
}
