//! Slot catalog endpoints.

use super::{CompanyQuery, MessageResponse};
use crate::error::AppError;
use crate::extractors::{ApiJson, ApiQuery};
use crate::middleware::record_company;
use crate::state::AppState;
use axum::{Json, extract::State};
use banquet_core::providers::BanquetStore;
use banquet_core::slots::{ReplaceSlotsRequest, SlotMap, SlotReplacement};

/// Replace the caller's slot catalog.
///
/// # Endpoint
///
/// ```text
/// POST /api/time-slots
/// {"company_id": 1, "user_id": "owner", "banquet_slots": {"Hall A": ["10:00", "14:00"]}}
/// ```
///
/// # Errors
///
/// - 400 for missing fields or a hall with more than four slots
/// - 404 for an unknown company
pub async fn replace_slots<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiJson(request): ApiJson<ReplaceSlotsRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    replace(&state, request).await?;
    Ok(Json(MessageResponse::new("Time slots updated successfully")))
}

/// Older client path for [`replace_slots`]; same semantics, older message.
///
/// ```text
/// POST /api/banquet-slots
/// ```
///
/// # Errors
///
/// As [`replace_slots`].
pub async fn replace_banquet_slots<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiJson(request): ApiJson<ReplaceSlotsRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    replace(&state, request).await?;
    Ok(Json(MessageResponse::new(
        "Banquet time slots updated successfully",
    )))
}

async fn replace<S: BanquetStore>(
    state: &AppState<S>,
    request: ReplaceSlotsRequest,
) -> Result<(), AppError> {
    let replacement = SlotReplacement::try_from(request)?;
    record_company(replacement.company_id());
    state.store.replace_slots(replacement).await?;
    Ok(())
}

/// Every slot of a company grouped by hall.
///
/// # Errors
///
/// 400 when `company_id` is missing or not a number.
pub async fn get_slots<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiQuery(query): ApiQuery<CompanyQuery>,
) -> Result<Json<SlotMap>, AppError> {
    let company_id = query.company_id()?;
    Ok(Json(state.store.get_slots(company_id).await?))
}
