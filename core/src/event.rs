//! Event records: the full details of a customer's occasion.
//!
//! Hall and slot are denormalized copies taken from the client and are not
//! checked against the slot catalog or the booking ledger.

use crate::booking::parse_date;
use crate::customer::Customer;
use crate::de::{self, Required};
use crate::error::{BanquetError, Result};
use crate::ids::{CompanyId, EventId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reported when a user outside the company tries to create an event.
pub const CREATE_FORBIDDEN: &str = "User does not have permission to create events for this company";

/// Reported when a user outside the company tries to list events.
pub const VIEW_FORBIDDEN: &str = "User does not have permission to view events for this company";

/// A stored event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Row id.
    pub id: EventId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Creating user.
    pub user_id: String,
    /// Customer or occasion name.
    pub event_name: String,
    /// Day of the event.
    pub event_date: NaiveDate,
    /// Remaining mutable fields.
    #[serde(flatten)]
    pub fields: EventExtras,
}

/// Mutable event fields besides name and date, shared by create, update and the stored row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct EventExtras {
    pub event_time: Option<String>,
    pub time_slot: Option<String>,
    pub banquet_hall: Option<Value>,
    pub function_type: Option<String>,
    pub meal_type: Option<String>,
    pub person_count: Option<i32>,
    pub phone_number: String,
    pub address: Option<String>,
}

/// Create/update payload as sent by clients.
#[derive(Clone, Debug, Default, Deserialize)]
#[allow(missing_docs)]
pub struct EventRequest {
    #[serde(default, deserialize_with = "de::lenient_id")]
    pub company_id: Option<i64>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub event_name: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub event_date: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub event_time: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub time_slot: Option<String>,
    #[serde(default)]
    pub banquet_hall: Option<Value>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub function_type: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub meal_type: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_count")]
    pub person_count: Option<i32>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub address: Option<String>,
}

/// Normalize the client's hall value.
///
/// Strings that hold JSON are parsed; other strings are kept as JSON strings.
/// Blank strings and `null` become `None`.
#[must_use]
pub fn normalize_hall(value: Option<Value>) -> Option<Value> {
    match value? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => match serde_json::from_str::<Value>(&s) {
            Ok(parsed) => Some(parsed),
            Err(_) => Some(Value::String(s)),
        },
        other => Some(other),
    }
}

/// A validated new event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewEvent {
    /// Owning company.
    pub company_id: CompanyId,
    /// Creating user; must belong to the company.
    pub user_id: String,
    /// Customer name, also upserted into the directory.
    pub event_name: String,
    /// Day of the event.
    pub event_date: NaiveDate,
    /// Everything else.
    pub fields: EventExtras,
}

impl NewEvent {
    /// The directory entry written alongside the event.
    #[must_use]
    pub fn customer_key(&self) -> (CompanyId, &str, &str) {
        (self.company_id, &self.event_name, &self.fields.phone_number)
    }
}

impl TryFrom<EventRequest> for NewEvent {
    type Error = BanquetError;

    fn try_from(req: EventRequest) -> Result<Self> {
        let mut required = Required::default();
        let company_id = required.take("company_id", req.company_id);
        let user_id = required.text("user_id", req.user_id);
        let event_name = required.text("event_name", req.event_name);
        let event_date = required.text("event_date", req.event_date);
        let phone_number = required.text("phone_number", req.phone_number);
        let (Some(company_id), Some(user_id), Some(event_name), Some(event_date), Some(phone_number)) =
            (company_id, user_id, event_name, event_date, phone_number)
        else {
            return Err(required.into_error());
        };

        Ok(Self {
            company_id: CompanyId::new(company_id),
            user_id,
            event_name,
            event_date: parse_date("event_date", &event_date)?,
            fields: EventExtras {
                event_time: req.event_time,
                time_slot: req.time_slot,
                banquet_hall: normalize_hall(req.banquet_hall),
                function_type: req.function_type,
                meal_type: req.meal_type,
                person_count: req.person_count,
                phone_number,
                address: req.address,
            },
        })
    }
}

/// A validated full overwrite of an event's mutable fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventUpdate {
    /// Event to overwrite.
    pub event_id: EventId,
    /// Company the event must belong to.
    pub company_id: CompanyId,
    /// New name.
    pub event_name: String,
    /// New date.
    pub event_date: NaiveDate,
    /// Everything else.
    pub fields: EventExtras,
}

impl EventUpdate {
    /// Validate an update for the event addressed by `event_id`.
    ///
    /// # Errors
    ///
    /// - [`BanquetError::MissingFields`] when company, name, date or phone is absent
    /// - [`BanquetError::InvalidInput`] for an unparseable date
    pub fn new(event_id: EventId, req: EventRequest) -> Result<Self> {
        let mut required = Required::default();
        let company_id = required.take("company_id", req.company_id);
        let event_name = required.text("event_name", req.event_name);
        let event_date = required.text("event_date", req.event_date);
        let phone_number = required.text("phone_number", req.phone_number);
        let (Some(company_id), Some(event_name), Some(event_date), Some(phone_number)) =
            (company_id, event_name, event_date, phone_number)
        else {
            return Err(required.into_error());
        };

        Ok(Self {
            event_id,
            company_id: CompanyId::new(company_id),
            event_name,
            event_date: parse_date("event_date", &event_date)?,
            fields: EventExtras {
                event_time: req.event_time,
                time_slot: req.time_slot,
                banquet_hall: normalize_hall(req.banquet_hall),
                function_type: req.function_type,
                meal_type: req.meal_type,
                person_count: req.person_count,
                phone_number,
                address: req.address,
            },
        })
    }
}

/// Result of creating an event: the row and the directory entry it wrote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedEvent {
    /// Inserted event.
    pub event: Event,
    /// Upserted customer.
    pub customer: Customer,
}

/// Normalize an id taken from a path or query string.
///
/// The literal strings `"undefined"` and `"null"` are treated as missing.
///
/// # Errors
///
/// See [`de::parse_id`].
pub fn parse_client_id(field: &'static str, raw: Option<&str>) -> Result<i64> {
    let raw = raw.filter(|s| !matches!(s.trim(), "undefined" | "null"));
    de::parse_id(field, raw)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> EventRequest {
        serde_json::from_value(json!({
            "company_id": 1,
            "user_id": "owner",
            "event_name": "Smith Wedding",
            "event_date": "2025-06-15",
            "banquet_hall": "{\"name\":\"Hall A\"}",
            "person_count": "200",
            "phone_number": "5551234",
            "address": ""
        }))
        .unwrap()
    }

    #[test]
    fn hall_strings_holding_json_are_parsed() {
        let event = NewEvent::try_from(request()).unwrap();
        assert_eq!(event.fields.banquet_hall, Some(json!({"name": "Hall A"})));
        assert_eq!(event.fields.person_count, Some(200));
        assert_eq!(event.fields.address, None);
    }

    #[test]
    fn plain_hall_strings_are_kept() {
        assert_eq!(
            normalize_hall(Some(json!("Hall A"))),
            Some(json!("Hall A"))
        );
        assert_eq!(normalize_hall(Some(json!(""))), None);
        assert_eq!(normalize_hall(Some(Value::Null)), None);
        assert_eq!(
            normalize_hall(Some(json!({"name": "Lawn"}))),
            Some(json!({"name": "Lawn"}))
        );
    }

    #[test]
    fn create_requires_five_fields() {
        let err = NewEvent::try_from(EventRequest::default()).unwrap_err();
        assert_eq!(
            err,
            BanquetError::MissingFields(vec![
                "company_id",
                "user_id",
                "event_name",
                "event_date",
                "phone_number"
            ])
        );
    }

    #[test]
    fn update_does_not_need_user() {
        let mut req = request();
        req.user_id = None;
        let update = EventUpdate::new(EventId::new(9), req).unwrap();
        assert_eq!(update.event_id, EventId::new(9));
        assert_eq!(update.event_date, NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
    }

    #[test]
    fn undefined_ids_count_as_missing() {
        assert_eq!(
            parse_client_id("eventId", Some("undefined")).unwrap_err(),
            BanquetError::MissingFields(vec!["eventId"])
        );
        assert_eq!(
            parse_client_id("company_id", Some("null")).unwrap_err(),
            BanquetError::MissingFields(vec!["company_id"])
        );
        assert_eq!(parse_client_id("eventId", Some("42")).unwrap(), 42);
    }

    #[test]
    fn stored_event_serializes_flat() {
        let event = Event {
            id: EventId::new(1),
            company_id: CompanyId::new(1),
            user_id: "owner".into(),
            event_name: "Smith Wedding".into(),
            event_date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            fields: EventExtras {
                phone_number: "5551234".into(),
                ..EventExtras::default()
            },
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["phone_number"], "5551234");
        assert_eq!(value["event_date"], "2025-06-15");
        assert!(value["time_slot"].is_null());
    }
}
