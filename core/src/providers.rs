//! Storage traits.
//!
//! Each trait covers one component of the booking system. The production
//! implementation lives in `banquet-postgres`; `banquet-testing` carries an
//! in-memory implementation with the same semantics.
//!
//! Methods return `impl Future + Send` so generic HTTP handlers stay `Send`.

use crate::booking::{Booking, BookingCount, NewBooking};
use crate::catalog::{CatalogRename, FunctionType, MealType, NewCatalogEntry};
use crate::customer::{
    Customer, CustomerSearch, CustomerUpdate, EventDetailsCheck, EventValidation, NewCustomer,
};
use crate::error::Result;
use crate::event::{CreatedEvent, Event, EventUpdate, NewEvent};
use crate::ids::{CompanyId, CustomerId, EventId, FunctionId, MealTypeId};
use crate::slots::{ReplaceOutcome, SlotMap, SlotReplacement};
use crate::tenant::{Company, CompanyRecord, CompanyUser, LoginRecord};
use chrono::NaiveDate;
use std::future::Future;

/// Company records and their credentials.
pub trait TenantStore: Send + Sync {
    /// Insert a company, assigning id and `OR/<sequence>` code.
    ///
    /// # Errors
    ///
    /// - `BanquetError::UserIdTaken` if the login id is in use
    /// - `BanquetError::Database` on storage failure
    fn insert_company(&self, record: CompanyRecord) -> impl Future<Output = Result<Company>> + Send;

    /// Load a company by id.
    ///
    /// # Errors
    ///
    /// Returns `BanquetError::CompanyNotFound` for unknown ids.
    fn find_company(&self, company_id: CompanyId) -> impl Future<Output = Result<Company>> + Send;

    /// Find the company a login id belongs to, with the matching password hash.
    ///
    /// The primary user is matched before sub-users.
    ///
    /// # Errors
    ///
    /// Returns `BanquetError::Database` on storage failure.
    fn find_login(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<LoginRecord>>> + Send;

    /// Attach a sub-user login to a company.
    ///
    /// # Errors
    ///
    /// - `BanquetError::CompanyNotFound` for unknown companies
    /// - `BanquetError::UserIdTaken` if the login id is in use
    fn insert_company_user(
        &self,
        company_id: CompanyId,
        user_id: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<CompanyUser>> + Send;

    /// Whether `user_id` is the company's primary user or one of its sub-users.
    ///
    /// # Errors
    ///
    /// Returns `BanquetError::Database` on storage failure.
    fn is_member(
        &self,
        company_id: CompanyId,
        user_id: &str,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Cheap connectivity probe for readiness checks.
    ///
    /// # Errors
    ///
    /// Returns `BanquetError::Database` when the store is unreachable.
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;
}

/// Per-hall slot catalogs.
pub trait SlotCatalog: Send + Sync {
    /// Atomically replace every catalog row of `(company, user)`.
    ///
    /// Halls the company never declared are skipped and reported in the
    /// outcome.
    ///
    /// # Errors
    ///
    /// - `BanquetError::CompanyNotFound` for unknown companies
    /// - `BanquetError::Database` on storage failure; nothing is changed
    fn replace_slots(
        &self,
        replacement: SlotReplacement,
    ) -> impl Future<Output = Result<ReplaceOutcome>> + Send;

    /// Every catalogued slot of a company, across users, ordered by hall then slot.
    ///
    /// # Errors
    ///
    /// Returns `BanquetError::Database` on storage failure.
    fn get_slots(&self, company_id: CompanyId) -> impl Future<Output = Result<SlotMap>> + Send;
}

/// Confirmed reservations.
pub trait BookingLedger: Send + Sync {
    /// Reserve a (hall, date, slot) for a company.
    ///
    /// # Errors
    ///
    /// - `BanquetError::SlotAlreadyBooked` when the tuple is taken, including
    ///   when a concurrent request wins the race
    /// - `BanquetError::Database` on storage failure
    fn create_booking(&self, booking: NewBooking) -> impl Future<Output = Result<Booking>> + Send;

    /// Bookings of a company on one day.
    ///
    /// # Errors
    ///
    /// Returns `BanquetError::Database` on storage failure.
    fn count_bookings(
        &self,
        company_id: CompanyId,
        date: NaiveDate,
    ) -> impl Future<Output = Result<BookingCount>> + Send;
}

/// Customer registry.
pub trait CustomerDirectory: Send + Sync {
    /// Register a customer.
    ///
    /// # Errors
    ///
    /// - `BanquetError::DuplicateName` if the name exists in the company
    /// - `BanquetError::DuplicatePhone` if the phone exists in any company
    fn add_customer(&self, customer: NewCustomer) -> impl Future<Output = Result<Customer>> + Send;

    /// Overwrite a customer's name and phone.
    ///
    /// # Errors
    ///
    /// - `BanquetError::DuplicateName` / `BanquetError::DuplicatePhone`,
    ///   ignoring the row itself
    /// - `BanquetError::NotFound` if no row matched
    fn update_customer(
        &self,
        update: CustomerUpdate,
    ) -> impl Future<Output = Result<Customer>> + Send;

    /// Remove a customer.
    ///
    /// # Errors
    ///
    /// Returns `BanquetError::NotFound` if no row was deleted.
    fn delete_customer(&self, customer_id: CustomerId) -> impl Future<Output = Result<()>> + Send;

    /// Advisory duplicate check: name first, then phone within the company.
    ///
    /// # Errors
    ///
    /// Returns `BanquetError::Database` on storage failure.
    fn validate_event_details(
        &self,
        check: EventDetailsCheck,
    ) -> impl Future<Output = Result<EventValidation>> + Send;

    /// Case-insensitive prefix search, at most five rows ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `BanquetError::Database` on storage failure.
    fn search_customers(
        &self,
        search: CustomerSearch,
    ) -> impl Future<Output = Result<Vec<Customer>>> + Send;

    /// All customers of a company ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `BanquetError::Database` on storage failure.
    fn list_customers(
        &self,
        company_id: CompanyId,
    ) -> impl Future<Output = Result<Vec<Customer>>> + Send;
}

/// Event records.
pub trait EventRecords: Send + Sync {
    /// Insert an event and upsert its customer in one transaction.
    ///
    /// # Errors
    ///
    /// - `BanquetError::Forbidden` if the user is not a member of the company
    /// - `BanquetError::Database` for any write failure; nothing is kept
    fn create_event(&self, event: NewEvent) -> impl Future<Output = Result<CreatedEvent>> + Send;

    /// Overwrite an event's mutable fields.
    ///
    /// # Errors
    ///
    /// Returns `BanquetError::NotFound` when `(event_id, company_id)` matches nothing.
    fn update_event(&self, update: EventUpdate) -> impl Future<Output = Result<Event>> + Send;

    /// Load one event of a company.
    ///
    /// # Errors
    ///
    /// Returns `BanquetError::NotFound` when absent.
    fn get_event(
        &self,
        event_id: EventId,
        company_id: CompanyId,
    ) -> impl Future<Output = Result<Event>> + Send;

    /// Events a member created in a company, earliest first.
    ///
    /// # Errors
    ///
    /// Returns `BanquetError::Forbidden` if the user is not a member.
    fn user_events(
        &self,
        company_id: CompanyId,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<Event>>> + Send;
}

/// Function type pick list.
pub trait FunctionCatalog: Send + Sync {
    /// Add a function type.
    ///
    /// # Errors
    ///
    /// Returns `BanquetError::DuplicateEntry` if the user already has the name.
    fn add_function(
        &self,
        entry: NewCatalogEntry,
    ) -> impl Future<Output = Result<FunctionType>> + Send;

    /// Rename a function type.
    ///
    /// # Errors
    ///
    /// Returns `BanquetError::NotFound` for unknown ids.
    fn rename_function(
        &self,
        id: FunctionId,
        rename: CatalogRename,
    ) -> impl Future<Output = Result<FunctionType>> + Send;

    /// Remove a function type.
    ///
    /// # Errors
    ///
    /// Returns `BanquetError::NotFound` for unknown ids.
    fn delete_function(&self, id: FunctionId) -> impl Future<Output = Result<()>> + Send;

    /// A user's function types.
    ///
    /// # Errors
    ///
    /// Returns `BanquetError::Database` on storage failure.
    fn functions_for_user(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<FunctionType>>> + Send;
}

/// Meal type pick list; every mutation is scoped to the owning user.
pub trait MealTypeCatalog: Send + Sync {
    /// Add a meal type.
    ///
    /// # Errors
    ///
    /// Returns `BanquetError::DuplicateEntry` if the user has the name in any case.
    fn add_meal_type(
        &self,
        entry: NewCatalogEntry,
    ) -> impl Future<Output = Result<MealType>> + Send;

    /// Rename a meal type owned by `rename.user_id`.
    ///
    /// # Errors
    ///
    /// - `BanquetError::DuplicateEntry` if another entry has the name
    /// - `BanquetError::NotFound` for unknown ids or other owners
    fn rename_meal_type(
        &self,
        id: MealTypeId,
        rename: CatalogRename,
    ) -> impl Future<Output = Result<MealType>> + Send;

    /// Remove a meal type owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `BanquetError::NotFound` for unknown ids or other owners.
    fn delete_meal_type(
        &self,
        id: MealTypeId,
        user_id: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// A user's meal types.
    ///
    /// # Errors
    ///
    /// Returns `BanquetError::Database` on storage failure.
    fn meal_types_for_user(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<MealType>>> + Send;
}

/// Everything the HTTP layer needs from a store.
pub trait BanquetStore:
    TenantStore
    + SlotCatalog
    + BookingLedger
    + CustomerDirectory
    + EventRecords
    + FunctionCatalog
    + MealTypeCatalog
    + Clone
    + 'static
{
}

impl<T> BanquetStore for T where
    T: TenantStore
        + SlotCatalog
        + BookingLedger
        + CustomerDirectory
        + EventRecords
        + FunctionCatalog
        + MealTypeCatalog
        + Clone
        + 'static
{
}
