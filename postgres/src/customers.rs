//! Customer directory storage.

use crate::PostgresBanquetStore;
use crate::error::{database, on_conflict};
use crate::transaction::with_transaction;
use banquet_core::customer::{
    Customer, CustomerSearch, CustomerUpdate, EventDetailsCheck, EventValidation, NewCustomer,
    SEARCH_LIMIT, SearchType,
};
use banquet_core::error::{BanquetError, Result};
use banquet_core::ids::{CompanyId, CustomerId};
use banquet_core::providers::CustomerDirectory;
use sqlx::PgConnection;

const PHONE_KEY: &str = "customer_master_company_id_phone_number_key";
const NAME_KEY: &str = "customer_master_company_id_event_name_key";

#[derive(sqlx::FromRow)]
pub(crate) struct CustomerRow {
    customer_id: i64,
    company_id: i64,
    event_name: String,
    phone_number: String,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Self {
            customer_id: CustomerId::new(row.customer_id),
            company_id: CompanyId::new(row.company_id),
            event_name: row.event_name,
            phone_number: row.phone_number,
        }
    }
}

fn duplicate_conflicts() -> [(&'static str, BanquetError); 2] {
    [
        (NAME_KEY, BanquetError::DuplicateName),
        (PHONE_KEY, BanquetError::DuplicatePhone),
    ]
}

/// Name clashes within the company, then phone clashes in any company.
///
/// Takes a transaction-scoped lock on the phone number first. The unique
/// constraint only covers `(company_id, phone_number)`, so writers in
/// different companies would otherwise both pass the check.
async fn check_duplicates(
    conn: &mut PgConnection,
    company_id: CompanyId,
    event_name: &str,
    phone_number: &str,
    except: Option<CustomerId>,
) -> Result<()> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext('phone:' || $1))")
        .bind(phone_number)
        .execute(&mut *conn)
        .await
        .map_err(|e| database("Failed to lock phone number", &e))?;

    let except = except.map(CustomerId::get);

    let name_taken: bool = sqlx::query_scalar(
        r"
        SELECT EXISTS (
            SELECT 1 FROM customer_master
            WHERE company_id = $1 AND event_name = $2
              AND ($3::bigint IS NULL OR customer_id <> $3)
        )
        ",
    )
    .bind(company_id.get())
    .bind(event_name)
    .bind(except)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| database("Failed to check customer name", &e))?;
    if name_taken {
        return Err(BanquetError::DuplicateName);
    }

    let phone_taken: bool = sqlx::query_scalar(
        r"
        SELECT EXISTS (
            SELECT 1 FROM customer_master
            WHERE phone_number = $1
              AND ($2::bigint IS NULL OR customer_id <> $2)
        )
        ",
    )
    .bind(phone_number)
    .bind(except)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| database("Failed to check customer phone", &e))?;
    if phone_taken {
        return Err(BanquetError::DuplicatePhone);
    }

    Ok(())
}

impl CustomerDirectory for PostgresBanquetStore {
    async fn add_customer(&self, customer: NewCustomer) -> Result<Customer> {
        let created = with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                check_duplicates(
                    &mut **tx,
                    customer.company_id,
                    &customer.event_name,
                    &customer.phone_number,
                    None,
                )
                .await?;

                sqlx::query_as::<_, CustomerRow>(
                    r"
                    INSERT INTO customer_master (company_id, event_name, phone_number)
                    VALUES ($1, $2, $3)
                    RETURNING customer_id, company_id, event_name, phone_number
                    ",
                )
                .bind(customer.company_id.get())
                .bind(&customer.event_name)
                .bind(&customer.phone_number)
                .fetch_one(&mut **tx)
                .await
                .map(Customer::from)
                .map_err(|e| on_conflict("Failed to add customer", &e, &duplicate_conflicts()))
            })
        })
        .await?;

        metrics::counter!("banquet_customers_added_total").increment(1);
        tracing::info!(
            customer_id = %created.customer_id,
            company_id = %created.company_id,
            "Customer added"
        );
        Ok(created)
    }

    async fn update_customer(&self, update: CustomerUpdate) -> Result<Customer> {
        with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                check_duplicates(
                    &mut **tx,
                    update.company_id,
                    &update.event_name,
                    &update.phone_number,
                    Some(update.customer_id),
                )
                .await?;

                sqlx::query_as::<_, CustomerRow>(
                    r"
                    UPDATE customer_master
                    SET event_name = $1, phone_number = $2
                    WHERE customer_id = $3 AND company_id = $4
                    RETURNING customer_id, company_id, event_name, phone_number
                    ",
                )
                .bind(&update.event_name)
                .bind(&update.phone_number)
                .bind(update.customer_id.get())
                .bind(update.company_id.get())
                .fetch_optional(&mut **tx)
                .await
                .map_err(|e| on_conflict("Failed to update customer", &e, &duplicate_conflicts()))?
                .map(Customer::from)
                .ok_or(BanquetError::NotFound("Customer"))
            })
        })
        .await
    }

    async fn delete_customer(&self, customer_id: CustomerId) -> Result<()> {
        let result = sqlx::query("DELETE FROM customer_master WHERE customer_id = $1")
            .bind(customer_id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| database("Failed to delete customer", &e))?;

        if result.rows_affected() == 0 {
            return Err(BanquetError::NotFound("Customer"));
        }
        tracing::info!(customer_id = %customer_id, "Customer deleted");
        Ok(())
    }

    async fn validate_event_details(&self, check: EventDetailsCheck) -> Result<EventValidation> {
        let existing_phone: Option<String> = sqlx::query_scalar(
            r"
            SELECT phone_number FROM customer_master
            WHERE company_id = $1 AND event_name = $2
            LIMIT 1
            ",
        )
        .bind(check.company_id.get())
        .bind(&check.event_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database("Failed to check event name", &e))?;

        if let Some(existing_phone) = existing_phone {
            return Ok(EventValidation::NameExists { existing_phone });
        }

        let Some(phone_number) = &check.phone_number else {
            return Ok(EventValidation::Valid);
        };

        let existing_name: Option<String> = sqlx::query_scalar(
            r"
            SELECT event_name FROM customer_master
            WHERE company_id = $1 AND phone_number = $2
            LIMIT 1
            ",
        )
        .bind(check.company_id.get())
        .bind(phone_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database("Failed to check phone number", &e))?;

        Ok(existing_name.map_or(EventValidation::Valid, |existing_name| {
            EventValidation::PhoneExists { existing_name }
        }))
    }

    async fn search_customers(&self, search: CustomerSearch) -> Result<Vec<Customer>> {
        let column = match search.search_type {
            SearchType::Name => "event_name",
            SearchType::Phone => "phone_number",
        };
        let sql = format!(
            r"
            SELECT customer_id, company_id, event_name, phone_number
            FROM customer_master
            WHERE company_id = $1 AND {column} ILIKE $2
            ORDER BY customer_id
            LIMIT $3
            "
        );

        let rows: Vec<CustomerRow> = sqlx::query_as(&sql)
            .bind(search.company_id.get())
            .bind(search.like_pattern())
            .bind(i64::try_from(SEARCH_LIMIT).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database("Failed to search customers", &e))?;

        Ok(rows.into_iter().map(Customer::from).collect())
    }

    async fn list_customers(&self, company_id: CompanyId) -> Result<Vec<Customer>> {
        let rows: Vec<CustomerRow> = sqlx::query_as(
            r"
            SELECT customer_id, company_id, event_name, phone_number
            FROM customer_master
            WHERE company_id = $1
            ORDER BY event_name
            ",
        )
        .bind(company_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database("Failed to list customers", &e))?;

        Ok(rows.into_iter().map(Customer::from).collect())
    }
}
