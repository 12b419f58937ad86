//! Booking ledger storage.

use crate::PostgresBanquetStore;
use crate::error::{BOOKING_SLOT_KEY, database, on_conflict};
use crate::transaction::with_transaction;
use banquet_core::booking::{BookedSlot, Booking, BookingCount, BookingDetails, NewBooking};
use banquet_core::error::{BanquetError, Result};
use banquet_core::ids::{BookingId, CompanyId};
use banquet_core::providers::BookingLedger;
use chrono::{DateTime, NaiveDate, Utc};

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: i64,
    company_id: i64,
    user_id: String,
    banquet_hall: String,
    booking_date: NaiveDate,
    time_slot: String,
    event_name: String,
    phone_number: Option<String>,
    address: Option<String>,
    function_type: Option<String>,
    meal_type: Option<String>,
    person_count: Option<i32>,
    created_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Self {
            id: BookingId::new(row.id),
            company_id: CompanyId::new(row.company_id),
            user_id: row.user_id,
            banquet_hall: row.banquet_hall,
            booking_date: row.booking_date,
            time_slot: row.time_slot,
            event_name: row.event_name,
            details: BookingDetails {
                phone_number: row.phone_number,
                address: row.address,
                function_type: row.function_type,
                meal_type: row.meal_type,
                person_count: row.person_count,
            },
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BookedSlotRow {
    banquet_hall: String,
    time_slot: String,
}

impl BookingLedger for PostgresBanquetStore {
    async fn create_booking(&self, booking: NewBooking) -> Result<Booking> {
        let company_id = booking.company_id;
        let result = with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let existing: Option<i64> = sqlx::query_scalar(
                    r"
                    SELECT id
                    FROM banquet_bookings
                    WHERE company_id = $1 AND banquet_hall = $2
                      AND booking_date = $3 AND time_slot = $4
                    FOR UPDATE
                    ",
                )
                .bind(booking.company_id.get())
                .bind(&booking.banquet_hall)
                .bind(booking.booking_date)
                .bind(&booking.time_slot)
                .fetch_optional(&mut **tx)
                .await
                .map_err(|e| database("Failed to check booking", &e))?;

                if existing.is_some() {
                    return Err(BanquetError::SlotAlreadyBooked);
                }

                let details = &booking.details;
                let row: Option<BookingRow> = sqlx::query_as(
                    r"
                    INSERT INTO banquet_bookings (
                        company_id, user_id, banquet_hall, booking_date, time_slot, event_name,
                        phone_number, address, function_type, meal_type, person_count
                    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                    ON CONFLICT ON CONSTRAINT banquet_bookings_slot_key DO NOTHING
                    RETURNING id, company_id, user_id, banquet_hall, booking_date, time_slot,
                              event_name, phone_number, address, function_type, meal_type,
                              person_count, created_at
                    ",
                )
                .bind(booking.company_id.get())
                .bind(&booking.user_id)
                .bind(&booking.banquet_hall)
                .bind(booking.booking_date)
                .bind(&booking.time_slot)
                .bind(&booking.event_name)
                .bind(&details.phone_number)
                .bind(&details.address)
                .bind(&details.function_type)
                .bind(&details.meal_type)
                .bind(details.person_count)
                .fetch_optional(&mut **tx)
                .await
                .map_err(|e| {
                    on_conflict(
                        "Failed to insert booking",
                        &e,
                        &[(BOOKING_SLOT_KEY, BanquetError::SlotAlreadyBooked)],
                    )
                })?;

                row.map(Booking::from).ok_or(BanquetError::SlotAlreadyBooked)
            })
        })
        .await;

        match &result {
            Ok(created) => {
                metrics::counter!("banquet_bookings_total", "outcome" => "created").increment(1);
                tracing::info!(
                    booking_id = %created.id,
                    company_id = %company_id,
                    hall = %created.banquet_hall,
                    date = %created.booking_date,
                    slot = %created.time_slot,
                    "Booking created"
                );
            }
            Err(BanquetError::SlotAlreadyBooked) => {
                metrics::counter!("banquet_bookings_total", "outcome" => "conflict").increment(1);
                tracing::warn!(company_id = %company_id, "Booking rejected: slot already booked");
            }
            Err(_) => {}
        }

        result
    }

    async fn count_bookings(&self, company_id: CompanyId, date: NaiveDate) -> Result<BookingCount> {
        let rows: Vec<BookedSlotRow> = sqlx::query_as(
            r"
            SELECT banquet_hall, time_slot
            FROM banquet_bookings
            WHERE company_id = $1 AND booking_date = $2
            ORDER BY banquet_hall, time_slot
            ",
        )
        .bind(company_id.get())
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database("Failed to count bookings", &e))?;

        Ok(rows
            .into_iter()
            .map(|row| BookedSlot {
                banquet_hall: row.banquet_hall,
                time_slot: row.time_slot,
            })
            .collect())
    }
}
