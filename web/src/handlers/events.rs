//! Event record endpoints.

use super::CompanyQuery;
use crate::error::AppError;
use crate::extractors::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::record_company;
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use banquet_core::de::Required;
use banquet_core::event::{CreatedEvent, Event, EventRequest, EventUpdate, NewEvent, parse_client_id};
use banquet_core::ids::{CompanyId, EventId};
use banquet_core::providers::BanquetStore;
use serde::Deserialize;

/// `?user_id=&company_id=` query for a member's events.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserEventsQuery {
    /// Login id of the member.
    pub user_id: Option<String>,
    /// Raw company id.
    pub company_id: Option<String>,
}

fn event_id(raw: &str) -> Result<EventId, AppError> {
    Ok(EventId::new(parse_client_id("eventId", Some(raw))?))
}

/// Record an event and upsert its customer.
///
/// # Errors
///
/// - 400 for missing fields or a malformed date
/// - 403 when the user is not a member of the company
pub async fn create_event<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiJson(request): ApiJson<EventRequest>,
) -> Result<(StatusCode, Json<CreatedEvent>), AppError> {
    let event = NewEvent::try_from(request)?;
    record_company(event.company_id);
    let created = state.store.create_event(event).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Events a member created, earliest first.
pub async fn user_events<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiQuery(query): ApiQuery<UserEventsQuery>,
) -> Result<Json<Vec<Event>>, AppError> {
    let mut required = Required::default();
    let user_id = required.text("user_id", query.user_id);
    let company_id = required.text("company_id", query.company_id);
    let (Some(user_id), Some(company_id)) = (user_id, company_id) else {
        return Err(required.into_error().into());
    };
    let company_id = CompanyId::new(parse_client_id("company_id", Some(&company_id))?);

    Ok(Json(state.store.user_events(company_id, &user_id).await?))
}

/// Overwrite an event.
///
/// # Endpoint
///
/// ```text
/// PUT /api/events/{eventId}
/// ```
pub async fn update_event<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiPath(raw_id): ApiPath<String>,
    ApiJson(request): ApiJson<EventRequest>,
) -> Result<Json<Event>, AppError> {
    let update = EventUpdate::new(event_id(&raw_id)?, request)?;
    Ok(Json(state.store.update_event(update).await?))
}

/// Load one event of a company.
///
/// # Endpoint
///
/// ```text
/// GET /api/events/{eventId}?company_id=1
/// ```
pub async fn get_event<S: BanquetStore>(
    State(state): State<AppState<S>>,
    ApiPath(raw_id): ApiPath<String>,
    ApiQuery(query): ApiQuery<CompanyQuery>,
) -> Result<Json<Event>, AppError> {
    let event_id = event_id(&raw_id)?;
    let company_id = query.company_id()?;
    Ok(Json(state.store.get_event(event_id, company_id).await?))
}
