//! Event record storage.

use crate::PostgresBanquetStore;
use crate::customers::CustomerRow;
use crate::error::database;
use crate::tenant::is_member;
use crate::transaction::with_transaction;
use banquet_core::customer::Customer;
use banquet_core::error::{BanquetError, Result};
use banquet_core::event::{
    CREATE_FORBIDDEN, CreatedEvent, Event, EventExtras, EventUpdate, NewEvent, VIEW_FORBIDDEN,
};
use banquet_core::ids::{CompanyId, EventId};
use banquet_core::providers::EventRecords;
use chrono::NaiveDate;
use serde_json::Value;

const EVENT_COLUMNS: &str = "id, company_id, user_id, event_name, event_date, event_time, \
     time_slot, banquet_hall, function_type, meal_type, person_count, phone_number, address";

#[derive(sqlx::FromRow)]
struct EventRow {
    id: i64,
    company_id: i64,
    user_id: String,
    event_name: String,
    event_date: NaiveDate,
    event_time: Option<String>,
    time_slot: Option<String>,
    banquet_hall: Option<Value>,
    function_type: Option<String>,
    meal_type: Option<String>,
    person_count: Option<i32>,
    phone_number: String,
    address: Option<String>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: EventId::new(row.id),
            company_id: CompanyId::new(row.company_id),
            user_id: row.user_id,
            event_name: row.event_name,
            event_date: row.event_date,
            fields: EventExtras {
                event_time: row.event_time,
                time_slot: row.time_slot,
                banquet_hall: row.banquet_hall,
                function_type: row.function_type,
                meal_type: row.meal_type,
                person_count: row.person_count,
                phone_number: row.phone_number,
                address: row.address,
            },
        }
    }
}

impl EventRecords for PostgresBanquetStore {
    async fn create_event(&self, event: NewEvent) -> Result<CreatedEvent> {
        let created = with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                if !is_member(&mut **tx, event.company_id, &event.user_id).await? {
                    return Err(BanquetError::Forbidden(CREATE_FORBIDDEN.to_string()));
                }

                let fields = &event.fields;
                let sql = format!(
                    r"
                    INSERT INTO user_events (
                        company_id, user_id, event_name, event_date, event_time, time_slot,
                        banquet_hall, function_type, meal_type, person_count, phone_number, address
                    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                    RETURNING {EVENT_COLUMNS}
                    "
                );
                let row: EventRow = sqlx::query_as(&sql)
                    .bind(event.company_id.get())
                    .bind(&event.user_id)
                    .bind(&event.event_name)
                    .bind(event.event_date)
                    .bind(&fields.event_time)
                    .bind(&fields.time_slot)
                    .bind(&fields.banquet_hall)
                    .bind(&fields.function_type)
                    .bind(&fields.meal_type)
                    .bind(fields.person_count)
                    .bind(&fields.phone_number)
                    .bind(&fields.address)
                    .fetch_one(&mut **tx)
                    .await
                    .map_err(|e| database("Failed to insert event", &e))?;

                let customer: CustomerRow = sqlx::query_as(
                    r"
                    INSERT INTO customer_master (company_id, event_name, phone_number)
                    VALUES ($1, $2, $3)
                    ON CONFLICT ON CONSTRAINT customer_master_company_id_phone_number_key
                    DO UPDATE SET event_name = EXCLUDED.event_name
                    RETURNING customer_id, company_id, event_name, phone_number
                    ",
                )
                .bind(event.company_id.get())
                .bind(&event.event_name)
                .bind(&fields.phone_number)
                .fetch_one(&mut **tx)
                .await
                .map_err(|e| database("Failed to upsert customer", &e))?;

                Ok(CreatedEvent {
                    event: Event::from(row),
                    customer: Customer::from(customer),
                })
            })
        })
        .await?;

        metrics::counter!("banquet_events_created_total").increment(1);
        tracing::info!(
            event_id = %created.event.id,
            company_id = %created.event.company_id,
            customer_id = %created.customer.customer_id,
            "Event created"
        );
        Ok(created)
    }

    async fn update_event(&self, update: EventUpdate) -> Result<Event> {
        let fields = &update.fields;
        let sql = format!(
            r"
            UPDATE user_events
            SET event_name = $1, event_date = $2, event_time = $3, time_slot = $4,
                banquet_hall = $5, function_type = $6, meal_type = $7, person_count = $8,
                phone_number = $9, address = $10
            WHERE id = $11 AND company_id = $12
            RETURNING {EVENT_COLUMNS}
            "
        );
        let row: Option<EventRow> = sqlx::query_as(&sql)
            .bind(&update.event_name)
            .bind(update.event_date)
            .bind(&fields.event_time)
            .bind(&fields.time_slot)
            .bind(&fields.banquet_hall)
            .bind(&fields.function_type)
            .bind(&fields.meal_type)
            .bind(fields.person_count)
            .bind(&fields.phone_number)
            .bind(&fields.address)
            .bind(update.event_id.get())
            .bind(update.company_id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database("Failed to update event", &e))?;

        let event = row.map(Event::from).ok_or(BanquetError::NotFound("Event"))?;
        tracing::info!(event_id = %event.id, company_id = %event.company_id, "Event updated");
        Ok(event)
    }

    async fn get_event(&self, event_id: EventId, company_id: CompanyId) -> Result<Event> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM user_events WHERE id = $1 AND company_id = $2");
        sqlx::query_as::<_, EventRow>(&sql)
            .bind(event_id.get())
            .bind(company_id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database("Failed to load event", &e))?
            .map(Event::from)
            .ok_or(BanquetError::NotFound("Event"))
    }

    async fn user_events(&self, company_id: CompanyId, user_id: &str) -> Result<Vec<Event>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| database("Failed to acquire connection", &e))?;

        if !is_member(&mut conn, company_id, user_id).await? {
            return Err(BanquetError::Forbidden(VIEW_FORBIDDEN.to_string()));
        }

        let sql = format!(
            r"
            SELECT {EVENT_COLUMNS}
            FROM user_events
            WHERE company_id = $1 AND user_id = $2
            ORDER BY event_date, id
            "
        );
        let rows: Vec<EventRow> = sqlx::query_as(&sql)
            .bind(company_id.get())
            .bind(user_id)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| database("Failed to list events", &e))?;

        Ok(rows.into_iter().map(Event::from).collect())
    }
}
