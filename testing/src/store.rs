//! In-memory implementation of every storage trait.
//!
//! All tables sit behind one mutex. Each operation takes the lock once, checks
//! everything it needs, and only then mutates, so a failed call leaves the
//! tables untouched the way a rolled-back transaction would.

use banquet_core::booking::{BookedSlot, Booking, BookingCount, NewBooking};
use banquet_core::catalog::{CatalogRename, FunctionType, MealType, NewCatalogEntry, fold_name};
use banquet_core::customer::{
    Customer, CustomerSearch, CustomerUpdate, EventDetailsCheck, EventValidation, NewCustomer,
    SEARCH_LIMIT,
};
use banquet_core::error::{BanquetError, Result};
use banquet_core::event::{
    CREATE_FORBIDDEN, CreatedEvent, Event, EventUpdate, NewEvent, VIEW_FORBIDDEN,
};
use banquet_core::ids::{
    BookingId, CompanyId, CustomerId, EventId, FunctionId, MealTypeId,
};
use banquet_core::providers::{
    BookingLedger, CustomerDirectory, EventRecords, FunctionCatalog, MealTypeCatalog,
    SlotCatalog, TenantStore,
};
use banquet_core::slots::{
    ReplaceOutcome, SlotMap, SlotReplacement, check_hall_capacity, group_slots,
};
use banquet_core::tenant::{
    Company, CompanyRecord, CompanyUser, LoginRecord, hall_names,
};
use chrono::{NaiveDate, Utc};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct SlotRow {
    company_id: CompanyId,
    user_id: String,
    banquet_name: String,
    time_slot: String,
}

#[derive(Debug, Clone)]
struct SubUser {
    user: CompanyUser,
    password_hash: String,
}

#[derive(Debug, Default)]
struct Tables {
    companies: BTreeMap<CompanyId, (Company, String)>,
    company_users: Vec<SubUser>,
    slots: Vec<SlotRow>,
    bookings: Vec<Booking>,
    customers: BTreeMap<CustomerId, Customer>,
    events: BTreeMap<EventId, Event>,
    functions: BTreeMap<FunctionId, FunctionType>,
    meal_types: BTreeMap<MealTypeId, MealType>,
    company_sequence: i64,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn login_taken(&self, user_id: &str) -> bool {
        self.companies.values().any(|(c, _)| c.user_id == user_id)
            || self.company_users.iter().any(|u| u.user.user_id == user_id)
    }

    fn is_member(&self, company_id: CompanyId, user_id: &str) -> bool {
        self.companies
            .get(&company_id)
            .is_some_and(|(c, _)| c.user_id == user_id)
            || self
                .company_users
                .iter()
                .any(|u| u.user.company_id == company_id && u.user.user_id == user_id)
    }

    fn company(&self, company_id: CompanyId) -> Result<&Company> {
        self.companies
            .get(&company_id)
            .map(|(c, _)| c)
            .ok_or(BanquetError::CompanyNotFound)
    }
}

/// In-memory store for tests.
///
/// Cloning shares the underlying tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBanquetStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryBanquetStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bookings currently held.
    ///
    /// # Errors
    ///
    /// Returns [`BanquetError::Internal`] if the lock is poisoned.
    pub fn booking_total(&self) -> Result<usize> {
        Ok(self.lock()?.bookings.len())
    }

    /// Catalog rows of one user, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`BanquetError::Internal`] if the lock is poisoned.
    pub fn user_slots(&self, company_id: CompanyId, user_id: &str) -> Result<Vec<(String, String)>> {
        Ok(self
            .lock()?
            .slots
            .iter()
            .filter(|row| row.company_id == company_id && row.user_id == user_id)
            .map(|row| (row.banquet_name.clone(), row.time_slot.clone()))
            .collect())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| BanquetError::Internal("in-memory store lock poisoned".to_string()))
    }

    fn run<T, F>(&self, op: F) -> impl Future<Output = Result<T>> + Send + use<T, F>
    where
        F: FnOnce(&mut Tables) -> Result<T> + Send,
        T: Send,
    {
        let tables = Arc::clone(&self.tables);
        async move {
            let mut guard = tables
                .lock()
                .map_err(|_| BanquetError::Internal("in-memory store lock poisoned".to_string()))?;
            op(&mut guard)
        }
    }
}

// ============================================================================
// Tenant store
// ============================================================================

impl TenantStore for InMemoryBanquetStore {
    fn insert_company(&self, record: CompanyRecord) -> impl Future<Output = Result<Company>> + Send {
        self.run(move |t| {
            if t.login_taken(&record.user_id) {
                return Err(BanquetError::UserIdTaken);
            }
            t.company_sequence += 1;
            let id = CompanyId::new(t.next_id());
            let profile = record.profile;
            let company = Company {
                id,
                company_code: format!("OR/{}", t.company_sequence),
                company_name: profile.company_name,
                phone_number: profile.phone_number,
                owner_name: profile.owner_name,
                email: profile.email,
                gst_no: profile.gst_no,
                alternate_phone: profile.alternate_phone,
                address: profile.address,
                city: profile.city,
                area: profile.area,
                user_id: record.user_id,
                plan: record.plan,
                expiration_date: record.expiration_date,
                banquet_halls: profile.banquet_halls,
                created_at: Utc::now(),
            };
            t.companies
                .insert(id, (company.clone(), record.password_hash));
            Ok(company)
        })
    }

    fn find_company(&self, company_id: CompanyId) -> impl Future<Output = Result<Company>> + Send {
        self.run(move |t| t.company(company_id).cloned())
    }

    fn find_login(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<LoginRecord>>> + Send {
        let user_id = user_id.to_string();
        self.run(move |t| {
            if let Some((company, hash)) = t.companies.values().find(|(c, _)| c.user_id == user_id) {
                return Ok(Some(LoginRecord {
                    company: company.clone(),
                    password_hash: hash.clone(),
                }));
            }
            let Some(sub) = t.company_users.iter().find(|u| u.user.user_id == user_id) else {
                return Ok(None);
            };
            Ok(Some(LoginRecord {
                company: t.company(sub.user.company_id)?.clone(),
                password_hash: sub.password_hash.clone(),
            }))
        })
    }

    fn insert_company_user(
        &self,
        company_id: CompanyId,
        user_id: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<CompanyUser>> + Send {
        let user_id = user_id.to_string();
        let password_hash = password_hash.to_string();
        self.run(move |t| {
            t.company(company_id)?;
            if t.login_taken(&user_id) {
                return Err(BanquetError::UserIdTaken);
            }
            let user = CompanyUser {
                id: t.next_id(),
                company_id,
                user_id,
                created_at: Utc::now(),
            };
            t.company_users.push(SubUser {
                user: user.clone(),
                password_hash,
            });
            Ok(user)
        })
    }

    fn is_member(
        &self,
        company_id: CompanyId,
        user_id: &str,
    ) -> impl Future<Output = Result<bool>> + Send {
        let user_id = user_id.to_string();
        self.run(move |t| Ok(t.is_member(company_id, &user_id)))
    }

    fn ping(&self) -> impl Future<Output = Result<()>> + Send {
        self.run(|_| Ok(()))
    }
}

// ============================================================================
// Slot catalog
// ============================================================================

impl SlotCatalog for InMemoryBanquetStore {
    fn replace_slots(
        &self,
        replacement: SlotReplacement,
    ) -> impl Future<Output = Result<ReplaceOutcome>> + Send {
        self.run(move |t| {
            let company_id = replacement.company_id();
            let authorized = hall_names(&t.company(company_id)?.banquet_halls);
            let (entries, dropped_halls) = replacement.entries_for(&authorized);
            let user_id = replacement.user_id();

            let mut held_by_others: BTreeMap<String, usize> = BTreeMap::new();
            for row in t
                .slots
                .iter()
                .filter(|row| row.company_id == company_id && row.user_id != user_id)
            {
                *held_by_others.entry(row.banquet_name.clone()).or_default() += 1;
            }
            check_hall_capacity(&entries, &held_by_others)?;

            t.slots
                .retain(|row| !(row.company_id == company_id && row.user_id == user_id));
            let inserted = entries.len();
            t.slots.extend(entries.into_iter().map(|entry| SlotRow {
                company_id,
                user_id: user_id.to_string(),
                banquet_name: entry.banquet_name,
                time_slot: entry.time_slot,
            }));

            Ok(ReplaceOutcome {
                inserted,
                dropped_halls,
            })
        })
    }

    fn get_slots(&self, company_id: CompanyId) -> impl Future<Output = Result<SlotMap>> + Send {
        self.run(move |t| {
            let mut rows: Vec<(String, String)> = t
                .slots
                .iter()
                .filter(|row| row.company_id == company_id)
                .map(|row| (row.banquet_name.clone(), row.time_slot.clone()))
                .collect();
            rows.sort();
            Ok(group_slots(rows))
        })
    }
}

// ============================================================================
// Booking ledger
// ============================================================================

impl BookingLedger for InMemoryBanquetStore {
    fn create_booking(&self, booking: NewBooking) -> impl Future<Output = Result<Booking>> + Send {
        self.run(move |t| {
            let key = (
                booking.company_id,
                booking.banquet_hall.as_str(),
                booking.booking_date,
                booking.time_slot.as_str(),
            );
            if t.bookings.iter().any(|existing| existing.slot_key() == key) {
                return Err(BanquetError::SlotAlreadyBooked);
            }

            let row = Booking {
                id: BookingId::new(t.next_id()),
                company_id: booking.company_id,
                user_id: booking.user_id,
                banquet_hall: booking.banquet_hall,
                booking_date: booking.booking_date,
                time_slot: booking.time_slot,
                event_name: booking.event_name,
                details: booking.details,
                created_at: Utc::now(),
            };
            t.bookings.push(row.clone());
            Ok(row)
        })
    }

    fn count_bookings(
        &self,
        company_id: CompanyId,
        date: NaiveDate,
    ) -> impl Future<Output = Result<BookingCount>> + Send {
        self.run(move |t| {
            Ok(t.bookings
                .iter()
                .filter(|b| b.company_id == company_id && b.booking_date == date)
                .map(|b| BookedSlot {
                    banquet_hall: b.banquet_hall.clone(),
                    time_slot: b.time_slot.clone(),
                })
                .collect::<BookingCount>())
        })
    }
}

// ============================================================================
// Customer directory
// ============================================================================

fn check_customer_duplicates(
    t: &Tables,
    company_id: CompanyId,
    event_name: &str,
    phone_number: &str,
    except: Option<CustomerId>,
) -> Result<()> {
    let others: Vec<&Customer> = t
        .customers
        .values()
        .filter(|c| Some(c.customer_id) != except)
        .collect();
    if others
        .iter()
        .any(|c| c.company_id == company_id && c.event_name == event_name)
    {
        return Err(BanquetError::DuplicateName);
    }
    if others.iter().any(|c| c.phone_number == phone_number) {
        return Err(BanquetError::DuplicatePhone);
    }
    Ok(())
}

fn company_customers(t: &Tables, company_id: CompanyId) -> impl Iterator<Item = &Customer> {
    t.customers
        .values()
        .filter(move |c| c.company_id == company_id)
}

impl CustomerDirectory for InMemoryBanquetStore {
    fn add_customer(&self, customer: NewCustomer) -> impl Future<Output = Result<Customer>> + Send {
        self.run(move |t| {
            check_customer_duplicates(
                t,
                customer.company_id,
                &customer.event_name,
                &customer.phone_number,
                None,
            )?;
            let row = Customer {
                customer_id: CustomerId::new(t.next_id()),
                company_id: customer.company_id,
                event_name: customer.event_name,
                phone_number: customer.phone_number,
            };
            t.customers.insert(row.customer_id, row.clone());
            Ok(row)
        })
    }

    fn update_customer(
        &self,
        update: CustomerUpdate,
    ) -> impl Future<Output = Result<Customer>> + Send {
        self.run(move |t| {
            check_customer_duplicates(
                t,
                update.company_id,
                &update.event_name,
                &update.phone_number,
                Some(update.customer_id),
            )?;
            let row = t
                .customers
                .get_mut(&update.customer_id)
                .filter(|c| c.company_id == update.company_id)
                .ok_or(BanquetError::NotFound("Customer"))?;
            row.event_name = update.event_name;
            row.phone_number = update.phone_number;
            Ok(row.clone())
        })
    }

    fn delete_customer(&self, customer_id: CustomerId) -> impl Future<Output = Result<()>> + Send {
        self.run(move |t| {
            t.customers
                .remove(&customer_id)
                .map(|_| ())
                .ok_or(BanquetError::NotFound("Customer"))
        })
    }

    fn validate_event_details(
        &self,
        check: EventDetailsCheck,
    ) -> impl Future<Output = Result<EventValidation>> + Send {
        self.run(move |t| {
            if let Some(existing) =
                company_customers(t, check.company_id).find(|c| c.event_name == check.event_name)
            {
                return Ok(EventValidation::NameExists {
                    existing_phone: existing.phone_number.clone(),
                });
            }
            if let Some(phone) = &check.phone_number {
                if let Some(existing) =
                    company_customers(t, check.company_id).find(|c| &c.phone_number == phone)
                {
                    return Ok(EventValidation::PhoneExists {
                        existing_name: existing.event_name.clone(),
                    });
                }
            }
            Ok(EventValidation::Valid)
        })
    }

    fn search_customers(
        &self,
        search: CustomerSearch,
    ) -> impl Future<Output = Result<Vec<Customer>>> + Send {
        self.run(move |t| {
            Ok(t.customers
                .values()
                .filter(|c| search.matches(c))
                .take(SEARCH_LIMIT)
                .cloned()
                .collect::<Vec<_>>())
        })
    }

    fn list_customers(
        &self,
        company_id: CompanyId,
    ) -> impl Future<Output = Result<Vec<Customer>>> + Send {
        self.run(move |t| {
            let mut rows: Vec<Customer> = t
                .customers
                .values()
                .filter(|c| c.company_id == company_id)
                .cloned()
                .collect();
            rows.sort_by(|a, b| a.event_name.cmp(&b.event_name));
            Ok(rows)
        })
    }
}

// ============================================================================
// Event records
// ============================================================================

impl EventRecords for InMemoryBanquetStore {
    fn create_event(&self, event: NewEvent) -> impl Future<Output = Result<CreatedEvent>> + Send {
        self.run(move |t| {
            if !t.is_member(event.company_id, &event.user_id) {
                return Err(BanquetError::Forbidden(CREATE_FORBIDDEN.to_string()));
            }

            let (company_id, event_name, phone_number) = event.customer_key();
            let by_phone = t
                .customers
                .values()
                .find(|c| c.company_id == company_id && c.phone_number == phone_number)
                .map(|c| c.customer_id);
            let name_clash = t.customers.values().any(|c| {
                c.company_id == company_id
                    && c.event_name == event_name
                    && Some(c.customer_id) != by_phone
            });
            if name_clash {
                return Err(BanquetError::Database(
                    "duplicate key value violates unique constraint \"customer_master_company_id_event_name_key\""
                        .to_string(),
                ));
            }

            let customer_id = match by_phone {
                Some(id) => id,
                None => CustomerId::new(t.next_id()),
            };
            let customer = Customer {
                customer_id,
                company_id,
                event_name: event_name.to_string(),
                phone_number: phone_number.to_string(),
            };

            let row = Event {
                id: EventId::new(t.next_id()),
                company_id: event.company_id,
                user_id: event.user_id,
                event_name: event.event_name,
                event_date: event.event_date,
                fields: event.fields,
            };
            t.customers.insert(customer_id, customer.clone());
            t.events.insert(row.id, row.clone());

            Ok(CreatedEvent {
                event: row,
                customer,
            })
        })
    }

    fn update_event(&self, update: EventUpdate) -> impl Future<Output = Result<Event>> + Send {
        self.run(move |t| {
            let row = t
                .events
                .get_mut(&update.event_id)
                .filter(|e| e.company_id == update.company_id)
                .ok_or(BanquetError::NotFound("Event"))?;
            row.event_name = update.event_name;
            row.event_date = update.event_date;
            row.fields = update.fields;
            Ok(row.clone())
        })
    }

    fn get_event(
        &self,
        event_id: EventId,
        company_id: CompanyId,
    ) -> impl Future<Output = Result<Event>> + Send {
        self.run(move |t| {
            t.events
                .get(&event_id)
                .filter(|e| e.company_id == company_id)
                .cloned()
                .ok_or(BanquetError::NotFound("Event"))
        })
    }

    fn user_events(
        &self,
        company_id: CompanyId,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<Event>>> + Send {
        let user_id = user_id.to_string();
        self.run(move |t| {
            if !t.is_member(company_id, &user_id) {
                return Err(BanquetError::Forbidden(VIEW_FORBIDDEN.to_string()));
            }
            let mut rows: Vec<Event> = t
                .events
                .values()
                .filter(|e| e.company_id == company_id && e.user_id == user_id)
                .cloned()
                .collect();
            rows.sort_by_key(|e| e.event_date);
            Ok(rows)
        })
    }
}

// ============================================================================
// Pick lists
// ============================================================================

impl FunctionCatalog for InMemoryBanquetStore {
    fn add_function(
        &self,
        entry: NewCatalogEntry,
    ) -> impl Future<Output = Result<FunctionType>> + Send {
        self.run(move |t| {
            if t
                .functions
                .values()
                .any(|f| f.function_name == entry.name && f.user_id == entry.user_id)
            {
                return Err(BanquetError::DuplicateEntry(
                    "Function name already exists".to_string(),
                ));
            }
            let row = FunctionType {
                id: FunctionId::new(t.next_id()),
                function_name: entry.name,
                user_id: entry.user_id,
                company_id: entry.company_id,
            };
            t.functions.insert(row.id, row.clone());
            Ok(row)
        })
    }

    fn rename_function(
        &self,
        id: FunctionId,
        rename: CatalogRename,
    ) -> impl Future<Output = Result<FunctionType>> + Send {
        self.run(move |t| {
            let owner = t
                .functions
                .get(&id)
                .map(|f| f.user_id.clone())
                .ok_or(BanquetError::NotFound("Function"))?;
            if t
                .functions
                .values()
                .any(|f| f.id != id && f.user_id == owner && f.function_name == rename.name)
            {
                return Err(BanquetError::DuplicateEntry(
                    "Function name already exists".to_string(),
                ));
            }
            let row = t
                .functions
                .get_mut(&id)
                .ok_or(BanquetError::NotFound("Function"))?;
            row.function_name = rename.name;
            Ok(row.clone())
        })
    }

    fn delete_function(&self, id: FunctionId) -> impl Future<Output = Result<()>> + Send {
        self.run(move |t| {
            t.functions
                .remove(&id)
                .map(|_| ())
                .ok_or(BanquetError::NotFound("Function"))
        })
    }

    fn functions_for_user(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<FunctionType>>> + Send {
        let user_id = user_id.to_string();
        self.run(move |t| {
            Ok(t.functions
                .values()
                .filter(|f| f.user_id == user_id)
                .cloned()
                .collect::<Vec<_>>())
        })
    }
}

impl MealTypeCatalog for InMemoryBanquetStore {
    fn add_meal_type(
        &self,
        entry: NewCatalogEntry,
    ) -> impl Future<Output = Result<MealType>> + Send {
        self.run(move |t| {
            let folded = fold_name(&entry.name);
            if t
                .meal_types
                .values()
                .any(|m| m.user_id == entry.user_id && fold_name(&m.meal_type_name) == folded)
            {
                return Err(BanquetError::DuplicateEntry(
                    "Meal type already exists for this user".to_string(),
                ));
            }
            let row = MealType {
                id: MealTypeId::new(t.next_id()),
                meal_type_name: entry.name,
                user_id: entry.user_id,
                company_id: entry.company_id,
            };
            t.meal_types.insert(row.id, row.clone());
            Ok(row)
        })
    }

    fn rename_meal_type(
        &self,
        id: MealTypeId,
        rename: CatalogRename,
    ) -> impl Future<Output = Result<MealType>> + Send {
        self.run(move |t| {
            let owner = rename.user_id.unwrap_or_default();
            let folded = fold_name(&rename.name);
            if t.meal_types.values().any(|m| {
                m.id != id && m.user_id == owner && fold_name(&m.meal_type_name) == folded
            }) {
                return Err(BanquetError::DuplicateEntry(
                    "Meal type name already exists".to_string(),
                ));
            }
            let row = t
                .meal_types
                .get_mut(&id)
                .filter(|m| m.user_id == owner)
                .ok_or(BanquetError::NotFound("Meal type"))?;
            row.meal_type_name = rename.name;
            Ok(row.clone())
        })
    }

    fn delete_meal_type(
        &self,
        id: MealTypeId,
        user_id: &str,
    ) -> impl Future<Output = Result<()>> + Send {
        let user_id = user_id.to_string();
        self.run(move |t| {
            if !t.meal_types.get(&id).is_some_and(|m| m.user_id == user_id) {
                return Err(BanquetError::NotFound("Meal type"));
            }
            t.meal_types.remove(&id);
            Ok(())
        })
    }

    fn meal_types_for_user(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<MealType>>> + Send {
        let user_id = user_id.to_string();
        self.run(move |t| {
            Ok(t.meal_types
                .values()
                .filter(|m| m.user_id == user_id)
                .cloned()
                .collect::<Vec<_>>())
        })
    }
}
