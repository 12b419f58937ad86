//! Behaviour of the in-memory store, which the HTTP tests rely on.

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use banquet_core::customer::{
    CustomerSearch, CustomerUpdate, EventDetailsCheck, EventValidation, NewCustomer, SearchType,
};
use banquet_core::environment::Clock;
use banquet_core::error::BanquetError;
use banquet_core::event::{EventRequest, NewEvent};
use banquet_core::ids::{CompanyId, CustomerId};
use banquet_core::providers::{
    BookingLedger, CustomerDirectory, EventRecords, SlotCatalog, TenantStore,
};
use banquet_core::slots::SlotReplacement;
use banquet_core::tenant::{self, LoginRequest};
use banquet_testing::fixtures::{self, OWNER, PASSWORD, STAFF};
use banquet_testing::{InMemoryBanquetStore, environment_at, test_clock, test_environment};
use chrono::{Duration, NaiveDate};

fn replacement(company_id: CompanyId, halls: &[(&str, &[&str])]) -> SlotReplacement {
    replacement_by(company_id, OWNER, halls)
}

fn replacement_by(
    company_id: CompanyId,
    user_id: &str,
    halls: &[(&str, &[&str])],
) -> SlotReplacement {
    SlotReplacement::new(
        company_id,
        user_id,
        halls.iter().map(|(hall, slots)| {
            (
                (*hall).to_string(),
                slots.iter().map(|s| (*s).to_string()).collect::<Vec<_>>(),
            )
        }),
    )
    .unwrap()
}

fn customer(company_id: CompanyId, name: &str, phone: &str) -> NewCustomer {
    NewCustomer {
        company_id,
        event_name: name.to_string(),
        phone_number: phone.to_string(),
    }
}

#[tokio::test]
async fn replace_keeps_trimmed_slots_for_declared_halls_only() {
    let store = InMemoryBanquetStore::new();
    let company = fixtures::seed_company(&store, &test_environment()).await;

    let outcome = store
        .replace_slots(replacement(
            company.id,
            &[
                ("Hall A", &["10:00", "11:00", "10:00", "", "12:00"]),
                ("Ghost Hall", &["09:00"]),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(outcome.inserted, 4);
    assert_eq!(outcome.dropped_halls, vec!["Ghost Hall"]);
    assert_eq!(
        store.user_slots(company.id, OWNER).unwrap(),
        vec![
            ("Hall A".to_string(), "10:00".to_string()),
            ("Hall A".to_string(), "11:00".to_string()),
            ("Hall A".to_string(), "10:00".to_string()),
            ("Hall A".to_string(), "12:00".to_string()),
        ]
    );

    let slots = store.get_slots(company.id).await.unwrap();
    assert_eq!(slots["Hall A"], vec!["10:00", "10:00", "11:00", "12:00"]);
    assert!(!slots.contains_key("Ghost Hall"));
    assert_eq!(store.get_slots(company.id).await.unwrap(), slots);
}

#[tokio::test]
async fn replace_overwrites_previous_catalog() {
    let store = InMemoryBanquetStore::new();
    let company = fixtures::seed_company(&store, &test_environment()).await;

    store
        .replace_slots(replacement(company.id, &[("Hall A", &["a", "b"])]))
        .await
        .unwrap();
    store
        .replace_slots(replacement(company.id, &[("Hall B", &["c"])]))
        .await
        .unwrap();

    let slots = store.get_slots(company.id).await.unwrap();
    assert!(!slots.contains_key("Hall A"));
    assert_eq!(slots["Hall B"], vec!["c"]);
}

#[tokio::test]
async fn hall_cap_spans_every_user_of_the_company() {
    let store = InMemoryBanquetStore::new();
    let company = fixtures::seed_company(&store, &test_environment()).await;

    store
        .replace_slots(replacement_by(company.id, OWNER, &[("Hall A", &["1", "2", "3", "4"])]))
        .await
        .unwrap();

    let err = store
        .replace_slots(replacement_by(company.id, STAFF, &[("Hall A", &["1", "2", "3", "4"])]))
        .await
        .unwrap_err();
    assert!(matches!(err, BanquetError::CapacityExceeded { ref hall, .. } if hall == "Hall A"));
    assert!(store.user_slots(company.id, STAFF).unwrap().is_empty());

    store
        .replace_slots(replacement_by(company.id, OWNER, &[("Hall A", &["1", "2"])]))
        .await
        .unwrap();
    store
        .replace_slots(replacement_by(company.id, STAFF, &[("Hall A", &["3", "4"])]))
        .await
        .unwrap();
    // Replacing your own rows does not count them twice.
    store
        .replace_slots(replacement_by(company.id, STAFF, &[("Hall A", &["5", "6"])]))
        .await
        .unwrap();

    let slots = store.get_slots(company.id).await.unwrap();
    assert_eq!(slots["Hall A"], vec!["1", "2", "5", "6"]);
}

#[tokio::test]
async fn replace_for_unknown_company_fails() {
    let store = InMemoryBanquetStore::new();
    let err = store
        .replace_slots(replacement(CompanyId::new(99), &[("Hall A", &["a"])]))
        .await
        .unwrap_err();
    assert_eq!(err, BanquetError::CompanyNotFound);
}

#[tokio::test]
async fn concurrent_bookings_for_one_slot_yield_one_winner() {
    let store = InMemoryBanquetStore::new();
    let company = fixtures::seed_company(&store, &test_environment()).await;

    let first = {
        let store = store.clone();
        let booking = fixtures::booking(company.id, "Hall A", "10:00");
        tokio::spawn(async move { store.create_booking(booking).await })
    };
    let second = {
        let store = store.clone();
        let booking = fixtures::booking(company.id, "Hall A", "10:00");
        tokio::spawn(async move { store.create_booking(booking).await })
    };

    let results = [first.await.unwrap(), second.await.unwrap()];
    let winners = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(BanquetError::SlotAlreadyBooked)))
        .count();

    assert_eq!((winners, conflicts), (1, 1));
    assert_eq!(store.booking_total().unwrap(), 1);
}

#[tokio::test]
async fn booking_count_lists_taken_slots_for_the_day() {
    let store = InMemoryBanquetStore::new();
    let company = fixtures::seed_company(&store, &test_environment()).await;

    store
        .create_booking(fixtures::booking(company.id, "Hall A", "10:00"))
        .await
        .unwrap();
    store
        .create_booking(fixtures::booking(company.id, "Hall B", "10:00"))
        .await
        .unwrap();

    let day = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
    let count = store.count_bookings(company.id, day).await.unwrap();
    assert_eq!(count.count, 2);

    let other_day = store
        .count_bookings(company.id, day.succ_opt().unwrap())
        .await
        .unwrap();
    assert_eq!(other_day.count, 0);
    assert!(other_day.booked_slots.is_empty());
}

#[tokio::test]
async fn phone_numbers_are_unique_across_companies() {
    let store = InMemoryBanquetStore::new();
    let env = test_environment();
    let first = fixtures::seed_company(&store, &env).await;
    let second = tenant::register_company(&store, &env, fixtures::company_request("other", "1year"))
        .await
        .unwrap();

    store
        .add_customer(customer(first.id, "Smith Wedding", "5551234"))
        .await
        .unwrap();

    let err = store
        .add_customer(customer(second.id, "Jones Party", "5551234"))
        .await
        .unwrap_err();
    assert_eq!(err, BanquetError::DuplicatePhone);

    let err = store
        .add_customer(customer(first.id, "Smith Wedding", "5559999"))
        .await
        .unwrap_err();
    assert_eq!(err, BanquetError::DuplicateName);

    // the same name in another company is fine
    store
        .add_customer(customer(second.id, "Smith Wedding", "5550000"))
        .await
        .unwrap();
}

#[tokio::test]
async fn update_ignores_the_row_itself() {
    let store = InMemoryBanquetStore::new();
    let company = fixtures::seed_company(&store, &test_environment()).await;
    let row = store
        .add_customer(customer(company.id, "Smith Wedding", "5551234"))
        .await
        .unwrap();
    store
        .add_customer(customer(company.id, "Jones Party", "5550000"))
        .await
        .unwrap();

    let updated = store
        .update_customer(CustomerUpdate {
            customer_id: row.customer_id,
            company_id: company.id,
            event_name: "Smith Wedding".into(),
            phone_number: "5551234".into(),
        })
        .await
        .unwrap();
    assert_eq!(updated, row);

    let err = store
        .update_customer(CustomerUpdate {
            customer_id: row.customer_id,
            company_id: company.id,
            event_name: "Smith Wedding".into(),
            phone_number: "5550000".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err, BanquetError::DuplicatePhone);

    let err = store
        .update_customer(CustomerUpdate {
            customer_id: CustomerId::new(9_999),
            company_id: company.id,
            event_name: "Nobody".into(),
            phone_number: "1".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err, BanquetError::NotFound("Customer"));
}

#[tokio::test]
async fn validation_checks_name_before_phone() {
    let store = InMemoryBanquetStore::new();
    let company = fixtures::seed_company(&store, &test_environment()).await;
    store
        .add_customer(customer(company.id, "Smith Wedding", "5551234"))
        .await
        .unwrap();

    let check = |name: &str, phone: Option<&str>| EventDetailsCheck {
        company_id: company.id,
        event_name: name.to_string(),
        phone_number: phone.map(str::to_string),
    };

    assert_eq!(
        store
            .validate_event_details(check("Smith Wedding", Some("5550000")))
            .await
            .unwrap(),
        EventValidation::NameExists {
            existing_phone: "5551234".into()
        }
    );
    assert_eq!(
        store
            .validate_event_details(check("Jones Party", Some("5551234")))
            .await
            .unwrap(),
        EventValidation::PhoneExists {
            existing_name: "Smith Wedding".into()
        }
    );
    assert_eq!(
        store
            .validate_event_details(check("Jones Party", None))
            .await
            .unwrap(),
        EventValidation::Valid
    );
}

#[tokio::test]
async fn search_is_prefix_limited_to_five() {
    let store = InMemoryBanquetStore::new();
    let company = fixtures::seed_company(&store, &test_environment()).await;
    for i in 0..7 {
        store
            .add_customer(customer(company.id, &format!("Guest {i}"), &format!("555{i}")))
            .await
            .unwrap();
    }

    let found = store
        .search_customers(CustomerSearch {
            company_id: company.id,
            term: "guest".into(),
            search_type: SearchType::Name,
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 5);
    assert!(found.windows(2).all(|w| w[0].customer_id < w[1].customer_id));

    let found = store
        .search_customers(CustomerSearch {
            company_id: company.id,
            term: "5553".into(),
            search_type: SearchType::Phone,
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].event_name, "Guest 3");
}

fn event_request(company_id: CompanyId, user_id: &str, name: &str, phone: &str, date: &str) -> NewEvent {
    NewEvent::try_from(EventRequest {
        company_id: Some(company_id.get()),
        user_id: Some(user_id.to_string()),
        event_name: Some(name.to_string()),
        event_date: Some(date.to_string()),
        phone_number: Some(phone.to_string()),
        ..EventRequest::default()
    })
    .unwrap()
}

#[tokio::test]
async fn event_creation_upserts_customer_by_phone() {
    let store = InMemoryBanquetStore::new();
    let company = fixtures::seed_company(&store, &test_environment()).await;

    let created = store
        .create_event(event_request(company.id, STAFF, "Smith Wedding", "5551234", "2025-06-15"))
        .await
        .unwrap();
    assert_eq!(created.customer.event_name, "Smith Wedding");

    let renamed = store
        .create_event(event_request(company.id, OWNER, "Smith Reception", "5551234", "2025-06-16"))
        .await
        .unwrap();
    assert_eq!(renamed.customer.customer_id, created.customer.customer_id);
    assert_eq!(renamed.customer.event_name, "Smith Reception");
    assert_eq!(store.list_customers(company.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn event_creation_rejects_outsiders_without_writing() {
    let store = InMemoryBanquetStore::new();
    let company = fixtures::seed_company(&store, &test_environment()).await;

    let err = store
        .create_event(event_request(company.id, "intruder", "X", "1", "2025-06-15"))
        .await
        .unwrap_err();
    assert!(matches!(err, BanquetError::Forbidden(_)));
    assert!(store.list_customers(company.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn event_creation_rolls_back_on_customer_name_clash() {
    let store = InMemoryBanquetStore::new();
    let company = fixtures::seed_company(&store, &test_environment()).await;
    store
        .add_customer(customer(company.id, "Smith Wedding", "5551234"))
        .await
        .unwrap();

    let err = store
        .create_event(event_request(company.id, OWNER, "Smith Wedding", "5559999", "2025-06-15"))
        .await
        .unwrap_err();
    assert!(matches!(err, BanquetError::Database(_)));
    assert!(store.user_events(company.id, OWNER).await.unwrap().is_empty());
}

#[tokio::test]
async fn user_events_are_ordered_by_date() {
    let store = InMemoryBanquetStore::new();
    let company = fixtures::seed_company(&store, &test_environment()).await;
    store
        .create_event(event_request(company.id, OWNER, "Late", "1", "2025-09-01"))
        .await
        .unwrap();
    store
        .create_event(event_request(company.id, OWNER, "Early", "2", "2025-03-01"))
        .await
        .unwrap();

    let events = store.user_events(company.id, OWNER).await.unwrap();
    let names: Vec<&str> = events.iter().map(|e| e.event_name.as_str()).collect();
    assert_eq!(names, vec!["Early", "Late"]);

    let event = store.get_event(events[0].id, company.id).await.unwrap();
    assert_eq!(event, events[0]);
    assert_eq!(store.get_event(events[0].id, company.id).await.unwrap(), event);

    let err = store
        .get_event(events[0].id, CompanyId::new(company.id.get() + 100))
        .await
        .unwrap_err();
    assert_eq!(err, BanquetError::NotFound("Event"));
}

#[tokio::test]
async fn login_accepts_owner_and_staff_until_expiry() {
    let store = InMemoryBanquetStore::new();
    let env = test_environment();
    let company = fixtures::seed_company(&store, &env).await;
    assert_eq!(company.expiration_date, test_clock().now() + Duration::days(3));

    for user in [OWNER, STAFF] {
        let session = tenant::login(
            &store,
            &env,
            LoginRequest {
                user_id: Some(user.into()),
                password: Some(PASSWORD.into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(session.company.id, company.id);
        assert_eq!(session.user_id, user);
    }

    let err = tenant::login(
        &store,
        &env,
        LoginRequest {
            user_id: Some(STAFF.into()),
            password: Some("wrong".into()),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err, BanquetError::InvalidCredentials);

    let later = environment_at(test_clock().now() + Duration::days(4));
    let err = tenant::login(
        &store,
        &later,
        LoginRequest {
            user_id: Some(OWNER.into()),
            password: Some(PASSWORD.into()),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err, BanquetError::AccountExpired);
}

#[tokio::test]
async fn login_ids_are_unique() {
    let store = InMemoryBanquetStore::new();
    let env = test_environment();
    fixtures::seed_company(&store, &env).await;

    let err = tenant::register_company(&store, &env, fixtures::company_request(STAFF, "trial"))
        .await
        .unwrap_err();
    assert_eq!(err, BanquetError::UserIdTaken);

    let second = tenant::register_company(&store, &env, fixtures::company_request("other", "6months"))
        .await
        .unwrap();
    assert_eq!(second.company_code, "OR/2");
    assert!(store.is_member(second.id, "other").await.unwrap());
    assert!(!store.is_member(second.id, OWNER).await.unwrap());
}
