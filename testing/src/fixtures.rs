//! Seed data shared by tests across crates.

use banquet_core::booking::{BookingDetails, NewBooking};
use banquet_core::environment::Environment;
use banquet_core::ids::CompanyId;
use banquet_core::providers::TenantStore;
use banquet_core::tenant::{self, Company, CompanyRequest, CompanyUserRequest};
use chrono::NaiveDate;
use serde_json::json;

/// Login id of the seeded company's primary user.
pub const OWNER: &str = "owner";

/// Password of every seeded login.
pub const PASSWORD: &str = "s3cret";

/// Login id of the seeded sub-user.
pub const STAFF: &str = "staff";

/// A registration for "Grand Palace" with halls `Hall A` and `Hall B`.
///
/// # Panics
///
/// Never in practice; the JSON literal always decodes.
#[must_use]
#[allow(clippy::expect_used)]
pub fn company_request(user_id: &str, plan: &str) -> CompanyRequest {
    serde_json::from_value(json!({
        "company_name": "Grand Palace",
        "phone_number": "5550001",
        "owner_name": "R. Mehta",
        "email": "owner@grand.example",
        "address": "1 Ring Road",
        "plan": plan,
        "user_id": user_id,
        "password": PASSWORD,
        "city": "Pune",
        "area": "Kothrud",
        "banquet_halls": [{"name": "Hall A"}, {"name": "Hall B"}]
    }))
    .expect("fixture request should decode")
}

/// Register the standard trial company with [`OWNER`] as primary user and
/// [`STAFF`] as sub-user.
///
/// # Panics
///
/// Panics if the store rejects the fixture.
#[allow(clippy::expect_used)]
pub async fn seed_company<S: TenantStore>(store: &S, env: &Environment) -> Company {
    let company = tenant::register_company(store, env, company_request(OWNER, "trial"))
        .await
        .expect("fixture company should register");

    tenant::add_company_user(
        store,
        env,
        CompanyUserRequest {
            company_id: Some(company.id.get()),
            user_id: Some(STAFF.to_string()),
            password: Some(PASSWORD.to_string()),
        },
    )
    .await
    .expect("fixture sub-user should register");

    company
}

/// A booking for `hall` at `slot` on 2025-06-15.
///
/// # Panics
///
/// Never in practice; the date literal is valid.
#[must_use]
#[allow(clippy::expect_used)]
pub fn booking(company_id: CompanyId, hall: &str, slot: &str) -> NewBooking {
    NewBooking {
        company_id,
        user_id: OWNER.to_string(),
        banquet_hall: hall.to_string(),
        event_name: "Smith Wedding".to_string(),
        booking_date: NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date"),
        time_slot: slot.to_string(),
        details: BookingDetails::default(),
    }
}
