//! Companies, sub-users and login lookup.

use crate::PostgresBanquetStore;
use crate::error::{database, on_conflict};
use crate::transaction::with_transaction;
use banquet_core::error::{BanquetError, Result};
use banquet_core::ids::CompanyId;
use banquet_core::providers::TenantStore;
use banquet_core::tenant::{BanquetHall, Company, CompanyRecord, CompanyUser, LoginRecord};
use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use sqlx::types::Json;

pub(crate) const COMPANY_COLUMNS: &str = "id, company_code, company_name, phone_number, \
     owner_name, email, gst_no, alternate_phone, address, city, area, user_id, plan, \
     expiration_date, banquet_halls, created_at";

#[derive(sqlx::FromRow)]
pub(crate) struct CompanyRow {
    id: i64,
    company_code: String,
    company_name: String,
    phone_number: String,
    owner_name: String,
    email: String,
    gst_no: Option<String>,
    alternate_phone: Option<String>,
    address: String,
    city: String,
    area: String,
    user_id: String,
    plan: String,
    expiration_date: DateTime<Utc>,
    banquet_halls: Json<Vec<BanquetHall>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CompanyRow> for Company {
    type Error = BanquetError;

    fn try_from(row: CompanyRow) -> Result<Self> {
        Ok(Self {
            id: CompanyId::new(row.id),
            company_code: row.company_code,
            company_name: row.company_name,
            phone_number: row.phone_number,
            owner_name: row.owner_name,
            email: row.email,
            gst_no: row.gst_no,
            alternate_phone: row.alternate_phone,
            address: row.address,
            city: row.city,
            area: row.area,
            user_id: row.user_id,
            plan: row
                .plan
                .parse()
                .map_err(|_| BanquetError::Database(format!("Unknown stored plan: {}", row.plan)))?,
            expiration_date: row.expiration_date,
            banquet_halls: row.banquet_halls.0,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LoginRow {
    #[sqlx(flatten)]
    company: CompanyRow,
    password: String,
}

#[derive(sqlx::FromRow)]
struct CompanyUserRow {
    id: i64,
    company_id: i64,
    user_id: String,
    created_at: DateTime<Utc>,
}

impl From<CompanyUserRow> for CompanyUser {
    fn from(row: CompanyUserRow) -> Self {
        Self {
            id: row.id,
            company_id: CompanyId::new(row.company_id),
            user_id: row.user_id,
            created_at: row.created_at,
        }
    }
}

/// Load a company, failing with `CompanyNotFound`.
pub(crate) async fn load_company(conn: &mut PgConnection, company_id: CompanyId) -> Result<Company> {
    let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE id = $1");
    sqlx::query_as::<_, CompanyRow>(&sql)
        .bind(company_id.get())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| database("Failed to load company", &e))?
        .ok_or(BanquetError::CompanyNotFound)?
        .try_into()
}

/// Load a company and hold its row lock until the transaction ends.
///
/// Writers that must see each other's rows for the same company (catalog
/// replaces) serialize on this lock.
pub(crate) async fn lock_company(conn: &mut PgConnection, company_id: CompanyId) -> Result<Company> {
    let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE id = $1 FOR UPDATE");
    sqlx::query_as::<_, CompanyRow>(&sql)
        .bind(company_id.get())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| database("Failed to lock company", &e))?
        .ok_or(BanquetError::CompanyNotFound)?
        .try_into()
}

/// Whether `user_id` is the primary user or a sub-user of the company.
pub(crate) async fn is_member(
    conn: &mut PgConnection,
    company_id: CompanyId,
    user_id: &str,
) -> Result<bool> {
    sqlx::query_scalar::<_, bool>(
        r"
        SELECT EXISTS (SELECT 1 FROM companies WHERE id = $1 AND user_id = $2)
            OR EXISTS (SELECT 1 FROM company_users WHERE company_id = $1 AND user_id = $2)
        ",
    )
    .bind(company_id.get())
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| database("Failed to check membership", &e))
}

/// Serialize registrations of the same login id and report whether it is taken.
///
/// Login ids live in two tables, so the per-table unique constraints alone
/// cannot keep them distinct.
async fn claim_login(conn: &mut PgConnection, user_id: &str) -> Result<()> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(user_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| database("Failed to lock login id", &e))?;

    let taken = sqlx::query_scalar::<_, bool>(
        r"
        SELECT EXISTS (SELECT 1 FROM companies WHERE user_id = $1)
            OR EXISTS (SELECT 1 FROM company_users WHERE user_id = $1)
        ",
    )
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| database("Failed to check login id", &e))?;

    if taken {
        return Err(BanquetError::UserIdTaken);
    }
    Ok(())
}

const LOGIN_ID_KEYS: [&str; 2] = ["companies_user_id_key", "company_users_user_id_key"];

fn login_conflicts() -> [(&'static str, BanquetError); 2] {
    LOGIN_ID_KEYS.map(|key| (key, BanquetError::UserIdTaken))
}

impl TenantStore for PostgresBanquetStore {
    async fn insert_company(&self, record: CompanyRecord) -> Result<Company> {
        let company = with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                claim_login(&mut **tx, &record.user_id).await?;

                let profile = &record.profile;
                let sql = format!(
                    r"
                    INSERT INTO companies (
                        company_code, company_name, phone_number, owner_name, email,
                        gst_no, alternate_phone, address, city, area,
                        user_id, password, plan, expiration_date, banquet_halls
                    ) VALUES (
                        'OR/' || nextval('company_code_seq'), $1, $2, $3, $4,
                        $5, $6, $7, $8, $9,
                        $10, $11, $12, $13, $14
                    )
                    RETURNING {COMPANY_COLUMNS}
                    "
                );
                let row = sqlx::query_as::<_, CompanyRow>(&sql)
                    .bind(&profile.company_name)
                    .bind(&profile.phone_number)
                    .bind(&profile.owner_name)
                    .bind(&profile.email)
                    .bind(&profile.gst_no)
                    .bind(&profile.alternate_phone)
                    .bind(&profile.address)
                    .bind(&profile.city)
                    .bind(&profile.area)
                    .bind(&record.user_id)
                    .bind(&record.password_hash)
                    .bind(record.plan.as_str())
                    .bind(record.expiration_date)
                    .bind(Json(&profile.banquet_halls))
                    .fetch_one(&mut **tx)
                    .await
                    .map_err(|e| on_conflict("Failed to create company", &e, &login_conflicts()))?;

                Company::try_from(row)
            })
        })
        .await?;

        tracing::info!(
            company_id = %company.id,
            company_code = %company.company_code,
            "Company row inserted"
        );
        Ok(company)
    }

    async fn find_company(&self, company_id: CompanyId) -> Result<Company> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| database("Failed to acquire connection", &e))?;
        load_company(&mut conn, company_id).await
    }

    async fn find_login(&self, user_id: &str) -> Result<Option<LoginRecord>> {
        let sql = format!(
            r"
            SELECT {COMPANY_COLUMNS}, login.password
            FROM companies
            JOIN (
                SELECT id AS login_company, password, 0 AS priority
                FROM companies WHERE user_id = $1
                UNION ALL
                SELECT company_id, password, 1
                FROM company_users WHERE user_id = $1
            ) login ON login.login_company = companies.id
            ORDER BY login.priority
            LIMIT 1
            "
        );
        let row = sqlx::query_as::<_, LoginRow>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database("Failed to look up login", &e))?;

        row.map(|row| {
            Ok(LoginRecord {
                company: Company::try_from(row.company)?,
                password_hash: row.password,
            })
        })
        .transpose()
    }

    async fn insert_company_user(
        &self,
        company_id: CompanyId,
        user_id: &str,
        password_hash: &str,
    ) -> Result<CompanyUser> {
        let user_id = user_id.to_string();
        let password_hash = password_hash.to_string();

        let user = with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                load_company(&mut **tx, company_id).await?;
                claim_login(&mut **tx, &user_id).await?;

                sqlx::query_as::<_, CompanyUserRow>(
                    r"
                    INSERT INTO company_users (company_id, user_id, password)
                    VALUES ($1, $2, $3)
                    RETURNING id, company_id, user_id, created_at
                    ",
                )
                .bind(company_id.get())
                .bind(&user_id)
                .bind(&password_hash)
                .fetch_one(&mut **tx)
                .await
                .map(CompanyUser::from)
                .map_err(|e| on_conflict("Failed to create company user", &e, &login_conflicts()))
            })
        })
        .await?;

        tracing::info!(company_id = %company_id, user_id = %user.user_id, "Company user added");
        Ok(user)
    }

    async fn is_member(&self, company_id: CompanyId, user_id: &str) -> Result<bool> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| database("Failed to acquire connection", &e))?;
        is_member(&mut conn, company_id, user_id).await
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| database("Database unreachable", &e))?;
        Ok(())
    }
}
