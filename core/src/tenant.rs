//! Tenant companies, their halls and their login credentials.

use crate::de::{self, Required};
use crate::environment::Environment;
use crate::error::{BanquetError, Result};
use crate::ids::CompanyId;
use crate::providers::{SlotCatalog, TenantStore};
use crate::slots::SlotMap;
use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Plans
// ============================================================================

/// Subscription plan chosen at registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Plan {
    /// Three day evaluation.
    #[serde(rename = "trial")]
    Trial,
    /// Six calendar months.
    #[serde(rename = "6months")]
    SixMonths,
    /// Twelve calendar months.
    #[serde(rename = "1year")]
    OneYear,
}

impl Plan {
    /// Wire name of the plan.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::SixMonths => "6months",
            Self::OneYear => "1year",
        }
    }

    /// When an account created at `now` on this plan expires.
    ///
    /// Month arithmetic clamps to the last day of the target month.
    ///
    /// # Errors
    ///
    /// Returns [`BanquetError::Internal`] if the date overflows.
    pub fn expires_at(self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let expiry = match self {
            Self::Trial => now.checked_add_signed(Duration::days(3)),
            Self::SixMonths => now.checked_add_months(Months::new(6)),
            Self::OneYear => now.checked_add_months(Months::new(12)),
        };
        expiry.ok_or_else(|| BanquetError::Internal("expiration date out of range".to_string()))
    }
}

impl FromStr for Plan {
    type Err = BanquetError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "trial" => Ok(Self::Trial),
            "6months" => Ok(Self::SixMonths),
            "1year" => Ok(Self::OneYear),
            other => Err(BanquetError::InvalidPlan(other.to_string())),
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Halls
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawHall {
    Named(String),
    Described {
        #[serde(default)]
        name: String,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
}

impl From<RawHall> for BanquetHall {
    fn from(raw: RawHall) -> Self {
        match raw {
            RawHall::Named(name) => Self {
                name,
                extra: Map::new(),
            },
            RawHall::Described { name, extra } => Self { name, extra },
        }
    }
}

/// A hall the company declared at registration.
///
/// Older records store bare strings; both shapes decode to this type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawHall")]
pub struct BanquetHall {
    /// Hall name, the key for slot catalogs and bookings.
    pub name: String,
    /// Any additional descriptor fields, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BanquetHall {
    /// A hall with only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: Map::new(),
        }
    }
}

/// Non-empty hall names in declaration order.
#[must_use]
pub fn hall_names(halls: &[BanquetHall]) -> Vec<String> {
    halls
        .iter()
        .filter(|hall| !hall.name.is_empty())
        .map(|hall| hall.name.clone())
        .collect()
}

// ============================================================================
// Companies
// ============================================================================

/// A tenant as stored, without its password hash.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// Database id.
    pub id: CompanyId,
    /// Human-facing code, `OR/<sequence>`.
    pub company_code: String,
    /// Registered name.
    pub company_name: String,
    /// Primary contact number.
    pub phone_number: String,
    /// Owner's name.
    pub owner_name: String,
    /// Contact email.
    pub email: String,
    /// Tax registration, if given.
    pub gst_no: Option<String>,
    /// Secondary contact number.
    pub alternate_phone: Option<String>,
    /// Postal address.
    pub address: String,
    /// City.
    pub city: String,
    /// Locality within the city.
    pub area: String,
    /// Primary login id.
    pub user_id: String,
    /// Subscription plan.
    pub plan: Plan,
    /// Logins are refused after this instant.
    pub expiration_date: DateTime<Utc>,
    /// Declared halls.
    pub banquet_halls: Vec<BanquetHall>,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl Company {
    /// Whether the subscription has lapsed at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expiration_date
    }
}

/// Registration payload as sent by clients.
#[derive(Clone, Debug, Default, Deserialize)]
#[allow(missing_docs)]
pub struct CompanyRequest {
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub owner_name: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub gst_no: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub alternate_phone: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub plan: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub area: Option<String>,
    #[serde(default)]
    pub banquet_halls: Option<Vec<BanquetHall>>,
}

/// Validated registration, password still in plaintext.
#[derive(Clone, Debug, PartialEq)]
pub struct NewCompany {
    /// Profile fields copied onto the stored record.
    pub profile: CompanyProfile,
    /// Chosen plan.
    pub plan: Plan,
    /// Primary login id.
    pub user_id: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
}

/// Descriptive company fields.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct CompanyProfile {
    pub company_name: String,
    pub phone_number: String,
    pub owner_name: String,
    pub email: String,
    pub gst_no: Option<String>,
    pub alternate_phone: Option<String>,
    pub address: String,
    pub city: String,
    pub area: String,
    pub banquet_halls: Vec<BanquetHall>,
}

impl TryFrom<CompanyRequest> for NewCompany {
    type Error = BanquetError;

    fn try_from(req: CompanyRequest) -> Result<Self> {
        let mut required = Required::default();
        let company_name = required.text("company_name", req.company_name);
        let phone_number = required.text("phone_number", req.phone_number);
        let owner_name = required.text("owner_name", req.owner_name);
        let email = required.text("email", req.email);
        let address = required.text("address", req.address);
        let plan = required.text("plan", req.plan);
        let user_id = required.text("user_id", req.user_id);
        let password = required.text("password", req.password);
        let city = required.text("city", req.city);
        let area = required.text("area", req.area);

        let (
            Some(company_name),
            Some(phone_number),
            Some(owner_name),
            Some(email),
            Some(address),
            Some(plan),
            Some(user_id),
            Some(password),
            Some(city),
            Some(area),
        ) = (
            company_name,
            phone_number,
            owner_name,
            email,
            address,
            plan,
            user_id,
            password,
            city,
            area,
        )
        else {
            return Err(required.into_error());
        };

        Ok(Self {
            profile: CompanyProfile {
                company_name,
                phone_number,
                owner_name,
                email,
                gst_no: req.gst_no,
                alternate_phone: req.alternate_phone,
                address,
                city,
                area,
                banquet_halls: req.banquet_halls.unwrap_or_default(),
            },
            plan: plan.parse()?,
            user_id,
            password,
        })
    }
}

/// What the store persists for a new company.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompanyRecord {
    /// Descriptive fields.
    pub profile: CompanyProfile,
    /// Chosen plan.
    pub plan: Plan,
    /// Precomputed expiry.
    pub expiration_date: DateTime<Utc>,
    /// Primary login id.
    pub user_id: String,
    /// Hashed password.
    pub password_hash: String,
}

// ============================================================================
// Credentials
// ============================================================================

/// A secondary login attached to a company.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyUser {
    /// Row id.
    pub id: i64,
    /// Owning company.
    pub company_id: CompanyId,
    /// Login id.
    pub user_id: String,
    /// When the login was added.
    pub created_at: DateTime<Utc>,
}

/// Sub-user payload as sent by clients.
#[derive(Clone, Debug, Default, Deserialize)]
#[allow(missing_docs)]
pub struct CompanyUserRequest {
    #[serde(default, deserialize_with = "de::lenient_id")]
    pub company_id: Option<i64>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub password: Option<String>,
}

/// Login payload.
#[derive(Clone, Debug, Default, Deserialize)]
#[allow(missing_docs)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub password: Option<String>,
}

/// A company matched by login id, with the hash of the matching credential.
#[derive(Clone, Debug, PartialEq)]
pub struct LoginRecord {
    /// Company the login belongs to.
    pub company: Company,
    /// Hash for the primary user or the matching sub-user.
    pub password_hash: String,
}

/// Result of a successful login.
#[derive(Clone, Debug, PartialEq)]
pub struct LoginSession {
    /// The company logged into.
    pub company: Company,
    /// Login id that authenticated, primary or sub-user.
    pub user_id: String,
}

// ============================================================================
// Operations
// ============================================================================

/// Register a company: validate, compute expiry, hash the password, store.
///
/// # Errors
///
/// - [`BanquetError::MissingFields`] / [`BanquetError::InvalidPlan`] on bad input
/// - [`BanquetError::UserIdTaken`] if the login id is in use
/// - Storage errors from [`TenantStore::insert_company`]
pub async fn register_company<S: TenantStore>(
    store: &S,
    env: &Environment,
    request: CompanyRequest,
) -> Result<Company> {
    let new_company = NewCompany::try_from(request)?;
    let expiration_date = new_company.plan.expires_at(env.clock.now())?;
    let password_hash = env.hasher.hash(&new_company.password)?;

    let company = store
        .insert_company(CompanyRecord {
            profile: new_company.profile,
            plan: new_company.plan,
            expiration_date,
            user_id: new_company.user_id,
            password_hash,
        })
        .await?;

    tracing::info!(
        company_id = %company.id,
        company_code = %company.company_code,
        plan = %company.plan,
        "Company registered"
    );
    Ok(company)
}

/// Authenticate a primary or sub-user login.
///
/// Expiry is checked before the password, so an expired account reports
/// [`BanquetError::AccountExpired`] even with a wrong password.
///
/// # Errors
///
/// - [`BanquetError::InvalidCredentials`] for unknown ids or wrong passwords
/// - [`BanquetError::AccountExpired`] once the plan has lapsed
pub async fn login<S: TenantStore>(
    store: &S,
    env: &Environment,
    request: LoginRequest,
) -> Result<LoginSession> {
    let (Some(user_id), Some(password)) = (request.user_id, request.password) else {
        return Err(BanquetError::InvalidCredentials);
    };

    let Some(record) = store.find_login(&user_id).await? else {
        return Err(BanquetError::InvalidCredentials);
    };

    if record.company.is_expired(env.clock.now()) {
        return Err(BanquetError::AccountExpired);
    }

    if !env.hasher.verify(&password, &record.password_hash)? {
        return Err(BanquetError::InvalidCredentials);
    }

    Ok(LoginSession {
        company: record.company,
        user_id,
    })
}

/// Attach a secondary login to an existing company.
///
/// # Errors
///
/// - [`BanquetError::MissingFields`] on incomplete input
/// - [`BanquetError::CompanyNotFound`] / [`BanquetError::UserIdTaken`] from the store
pub async fn add_company_user<S: TenantStore>(
    store: &S,
    env: &Environment,
    request: CompanyUserRequest,
) -> Result<CompanyUser> {
    let mut required = Required::default();
    let company_id = required.take("company_id", request.company_id);
    let user_id = required.text("user_id", request.user_id);
    let password = required.text("password", request.password);
    let (Some(company_id), Some(user_id), Some(password)) = (company_id, user_id, password) else {
        return Err(required.into_error());
    };

    let password_hash = env.hasher.hash(&password)?;
    store
        .insert_company_user(CompanyId::new(company_id), &user_id, &password_hash)
        .await
}

/// Names of the company's declared halls.
///
/// # Errors
///
/// Returns [`BanquetError::CompanyNotFound`] for unknown ids.
pub async fn banquet_halls<S: TenantStore>(store: &S, company_id: CompanyId) -> Result<Vec<String>> {
    let company = store.find_company(company_id).await?;
    Ok(hall_names(&company.banquet_halls))
}

/// Hall descriptors together with the slot catalog.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BanquetDetails {
    /// Declared halls as stored.
    pub banquet_halls: Vec<BanquetHall>,
    /// Slots keyed by hall name.
    pub time_slots: SlotMap,
}

/// Hall descriptors plus every catalogued slot for a company.
///
/// # Errors
///
/// Returns [`BanquetError::CompanyNotFound`] for unknown ids.
pub async fn banquet_details<S>(store: &S, company_id: CompanyId) -> Result<BanquetDetails>
where
    S: TenantStore + SlotCatalog,
{
    let company = store.find_company(company_id).await?;
    let time_slots = store.get_slots(company_id).await?;
    Ok(BanquetDetails {
        banquet_halls: company.banquet_halls,
        time_slots,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn full_request() -> CompanyRequest {
        serde_json::from_value(serde_json::json!({
            "company_name": "Grand Palace",
            "phone_number": "5550001",
            "owner_name": "R. Mehta",
            "email": "owner@grand.example",
            "gst_no": "",
            "address": "1 Ring Road",
            "plan": "trial",
            "user_id": "grand",
            "password": "pw",
            "city": "Pune",
            "area": "Kothrud",
            "banquet_halls": [{"name": "Hall A", "capacity": 300}, "Hall B"]
        }))
        .unwrap()
    }

    #[test]
    fn trial_expires_three_days_later() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        assert_eq!(
            Plan::Trial.expires_at(now).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 4, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn month_plans_use_calendar_months() {
        let now = Utc.with_ymd_and_hms(2025, 8, 31, 0, 0, 0).unwrap();
        assert_eq!(
            Plan::SixMonths.expires_at(now).unwrap(),
            Utc.with_ymd_and_hms(2026, 2, 28, 0, 0, 0).unwrap()
        );
        assert_eq!(
            Plan::OneYear.expires_at(now).unwrap(),
            Utc.with_ymd_and_hms(2026, 8, 31, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn plan_parsing() {
        assert_eq!("6months".parse::<Plan>().unwrap(), Plan::SixMonths);
        assert_eq!(
            "weekly".parse::<Plan>().unwrap_err(),
            BanquetError::InvalidPlan("weekly".to_string())
        );
        assert_eq!(serde_json::to_string(&Plan::OneYear).unwrap(), "\"1year\"");
    }

    #[test]
    fn halls_accept_strings_and_objects() {
        let new_company = NewCompany::try_from(full_request()).unwrap();
        let halls = &new_company.profile.banquet_halls;

        assert_eq!(hall_names(halls), vec!["Hall A", "Hall B"]);
        assert_eq!(halls[0].extra.get("capacity"), Some(&serde_json::json!(300)));
        assert_eq!(new_company.profile.gst_no, None);
    }

    #[test]
    fn hall_names_skip_blank_entries() {
        let halls: Vec<BanquetHall> =
            serde_json::from_value(serde_json::json!([{"capacity": 10}, {"name": "Lawn"}])).unwrap();
        assert_eq!(hall_names(&halls), vec!["Lawn"]);
    }

    #[test]
    fn registration_reports_every_missing_field() {
        let err = NewCompany::try_from(CompanyRequest {
            company_name: Some("X".into()),
            ..CompanyRequest::default()
        })
        .unwrap_err();

        assert_eq!(
            err,
            BanquetError::MissingFields(vec![
                "phone_number",
                "owner_name",
                "email",
                "address",
                "plan",
                "user_id",
                "password",
                "city",
                "area",
            ])
        );
    }

    #[test]
    fn unknown_plan_is_rejected_after_presence_checks() {
        let mut req = full_request();
        req.plan = Some("lifetime".into());
        assert_eq!(
            NewCompany::try_from(req).unwrap_err(),
            BanquetError::InvalidPlan("lifetime".into())
        );
    }
}
