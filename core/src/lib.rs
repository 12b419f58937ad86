//! # Banquet Core
//!
//! Domain types, validation rules and storage traits for a banquet hall
//! booking backend.
//!
//! ## Components
//!
//! - **Tenant store** ([`tenant`]): companies, plans, declared halls and logins
//! - **Slot catalog** ([`slots`]): bounded per-hall time slot lists
//! - **Booking ledger** ([`booking`]): (hall, date, slot) reservations, never
//!   double-booked
//! - **Customer directory** ([`customer`]): per-company names and phones
//! - **Event records** ([`event`]): full event details, written together with
//!   the customer directory
//! - **Pick lists** ([`catalog`]): function and meal types per user
//!
//! Request payloads are decoded leniently ([`de`]) and turned into validated
//! values with `TryFrom` before any storage call, so a store only ever sees
//! well-formed input. Storage is abstracted by the traits in [`providers`].
//!
//! ## Example
//!
//! ```
//! use banquet_core::booking::{BookingRequest, NewBooking};
//! use banquet_core::error::BanquetError;
//!
//! let request = BookingRequest {
//!     company_id: Some(1),
//!     user_id: Some("owner".into()),
//!     ..BookingRequest::default()
//! };
//!
//! let err = NewBooking::try_from(request).unwrap_err();
//! assert_eq!(
//!     err,
//!     BanquetError::MissingFields(vec!["banquet_hall", "event_name", "booking_date", "time_slot"])
//! );
//! ```

pub mod booking;
pub mod catalog;
pub mod customer;
pub mod de;
pub mod environment;
pub mod error;
pub mod event;
pub mod ids;
pub mod providers;
pub mod slots;
pub mod tenant;

// Re-export commonly used types
pub use chrono::{DateTime, NaiveDate, Utc};
pub use error::{BanquetError, ErrorKind, Result};
pub use ids::{BookingId, CompanyId, CustomerId, EventId, FunctionId, MealTypeId};
pub use providers::BanquetStore;
