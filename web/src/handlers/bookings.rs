//! Booking ledger endpoints.

use crate::error::AppError;
use crate::extractors::{ApiJson, ApiQuery, CorrelationId};
use crate::middleware::record_company;
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use banquet_core::booking::{Booking, BookingCount, BookingRequest, NewBooking, parse_date};
use banquet_core::error::BanquetError;
use banquet_core::event::parse_client_id;
use banquet_core::ids::CompanyId;
use banquet_core::providers::BanquetStore;
use serde::Deserialize;

/// `?company_id=&date=` query for the per-day count.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventCountQuery {
    /// Raw company id.
    pub company_id: Option<String>,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp.
    pub date: Option<String>,
}

/// Reserve a (hall, date, slot).
///
/// # Endpoint
///
/// ```text
/// POST /api/banquet-bookings
/// ```
///
/// # Errors
///
/// - 400 `{error, missingFields}` when required fields are absent
/// - 409 when the slot is already booked
pub async fn create_booking<S: BanquetStore>(
    State(state): State<AppState<S>>,
    correlation_id: CorrelationId,
    ApiJson(request): ApiJson<BookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let booking = NewBooking::try_from(request)?;
    record_company(booking.company_id);
    tracing::debug!(
        correlation_id = %correlation_id.0,
        hall = %booking.banquet_hall,
        date = %booking.booking_date,
        slot = %booking.time_slot,
        "Booking requested"
    );

    let booking = state.store.create_booking(booking).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Number of bookings on a day and the (hall, slot) pairs taken.
///
/// # Endpoint
///
/// ```text
/// GET /api/event-count?company_id=1&date=2025-06-15
/// ```
pub async fn event_count<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiQuery(query): ApiQuery<EventCountQuery>,
) -> Result<Json<BookingCount>, AppError> {
    let company_id = parse_client_id("company_id", query.company_id.as_deref())?;
    let date = query
        .date
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or(BanquetError::MissingFields(vec!["date"]))?;
    let date = parse_date("date", date)?;

    Ok(Json(
        state
            .store
            .count_bookings(CompanyId::new(company_id), date)
            .await?,
    ))
}
