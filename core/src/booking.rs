//! Hall reservations and the per-day booking count.

use crate::de::{self, Required};
use crate::error::{BanquetError, Result};
use crate::ids::{BookingId, CompanyId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Optional event details captured with a booking.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct BookingDetails {
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub function_type: Option<String>,
    pub meal_type: Option<String>,
    pub person_count: Option<i32>,
}

/// Booking payload as sent by clients.
#[derive(Clone, Debug, Default, Deserialize)]
#[allow(missing_docs)]
pub struct BookingRequest {
    #[serde(default, deserialize_with = "de::lenient_id")]
    pub company_id: Option<i64>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub banquet_hall: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub event_name: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub booking_date: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub time_slot: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub function_type: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub meal_type: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_count")]
    pub person_count: Option<i32>,
}

/// A validated reservation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewBooking {
    /// Owning company.
    pub company_id: CompanyId,
    /// Booking user.
    pub user_id: String,
    /// Hall being reserved.
    pub banquet_hall: String,
    /// Customer or occasion name.
    pub event_name: String,
    /// Day of the event.
    pub booking_date: NaiveDate,
    /// Slot label within the day.
    pub time_slot: String,
    /// Optional details.
    pub details: BookingDetails,
}

impl TryFrom<BookingRequest> for NewBooking {
    type Error = BanquetError;

    fn try_from(req: BookingRequest) -> Result<Self> {
        let mut required = Required::default();
        let company_id = required.take("company_id", req.company_id);
        let user_id = required.text("user_id", req.user_id);
        let banquet_hall = required.text("banquet_hall", req.banquet_hall);
        let event_name = required.text("event_name", req.event_name);
        let booking_date = required.text("booking_date", req.booking_date);
        let time_slot = required.text("time_slot", req.time_slot);

        let (
            Some(company_id),
            Some(user_id),
            Some(banquet_hall),
            Some(event_name),
            Some(booking_date),
            Some(time_slot),
        ) = (
            company_id,
            user_id,
            banquet_hall,
            event_name,
            booking_date,
            time_slot,
        )
        else {
            return Err(required.into_error());
        };

        Ok(Self {
            company_id: CompanyId::new(company_id),
            user_id,
            banquet_hall,
            event_name,
            booking_date: parse_date("booking_date", &booking_date)?,
            time_slot,
            details: BookingDetails {
                phone_number: req.phone_number,
                address: req.address,
                function_type: req.function_type,
                meal_type: req.meal_type,
                person_count: req.person_count,
            },
        })
    }
}

/// A stored reservation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Row id.
    pub id: BookingId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Booking user.
    pub user_id: String,
    /// Reserved hall.
    pub banquet_hall: String,
    /// Day of the event.
    pub booking_date: NaiveDate,
    /// Slot label.
    pub time_slot: String,
    /// Customer or occasion name.
    pub event_name: String,
    /// Optional details, flattened into the row.
    #[serde(flatten)]
    pub details: BookingDetails,
    /// Insert time.
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// The uniqueness key of a reservation.
    #[must_use]
    pub fn slot_key(&self) -> (CompanyId, &str, NaiveDate, &str) {
        (
            self.company_id,
            &self.banquet_hall,
            self.booking_date,
            &self.time_slot,
        )
    }
}

/// A taken (hall, slot) pair on some day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedSlot {
    /// Hall name.
    pub banquet_hall: String,
    /// Slot label.
    pub time_slot: String,
}

/// Bookings on one day for one company.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingCount {
    /// Number of reservations.
    pub count: i64,
    /// What is taken.
    pub booked_slots: Vec<BookedSlot>,
}

impl FromIterator<BookedSlot> for BookingCount {
    fn from_iter<T: IntoIterator<Item = BookedSlot>>(iter: T) -> Self {
        let booked_slots: Vec<BookedSlot> = iter.into_iter().collect();
        Self {
            count: i64::try_from(booked_slots.len()).unwrap_or(i64::MAX),
            booked_slots,
        }
    }
}

/// Parse a calendar date given as `YYYY-MM-DD` or as an RFC 3339 timestamp.
///
/// # Errors
///
/// Returns [`BanquetError::InvalidInput`] naming `field` when neither form parses.
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| BanquetError::InvalidInput(format!("Invalid {field}: {raw}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request() -> BookingRequest {
        serde_json::from_value(serde_json::json!({
            "company_id": "1",
            "user_id": "owner",
            "banquet_hall": "Hall A",
            "event_name": "Smith Wedding",
            "booking_date": "2025-06-15",
            "time_slot": "10:00",
            "person_count": "150",
            "meal_type": ""
        }))
        .unwrap()
    }

    #[test]
    fn complete_request_validates() {
        let booking = NewBooking::try_from(request()).unwrap();
        assert_eq!(booking.company_id, CompanyId::new(1));
        assert_eq!(
            booking.booking_date,
            NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
        );
        assert_eq!(booking.details.person_count, Some(150));
        assert_eq!(booking.details.meal_type, None);
    }

    #[test]
    fn missing_fields_are_named_in_declaration_order() {
        let mut req = request();
        req.time_slot = None;
        req.banquet_hall = Some("   ".into());

        assert_eq!(
            NewBooking::try_from(req).unwrap_err(),
            BanquetError::MissingFields(vec!["banquet_hall", "time_slot"])
        );
    }

    #[test]
    fn timestamps_are_reduced_to_dates() {
        assert_eq!(
            parse_date("booking_date", "2025-06-15T00:00:00.000Z").unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
        );
        assert!(matches!(
            parse_date("booking_date", "15/06/2025"),
            Err(BanquetError::InvalidInput(_))
        ));
    }

    #[test]
    fn count_is_derived_from_slots() {
        let count: BookingCount = vec![
            BookedSlot {
                banquet_hall: "Hall A".into(),
                time_slot: "10:00".into(),
            },
            BookedSlot {
                banquet_hall: "Hall B".into(),
                time_slot: "10:00".into(),
            },
        ]
        .into_iter()
        .collect();

        assert_eq!(count.count, 2);
        assert_eq!(
            serde_json::to_value(&count).unwrap()["booked_slots"][1]["banquet_hall"],
            "Hall B"
        );
    }
}
