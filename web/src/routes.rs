//! Router assembly.
//!
//! The company router is mounted at both `/api` and `/api/companies`; the
//! pick lists live under `/api/function` and `/api/mealtypes`. Older clients
//! still post slot catalogs to `/api/banquet-slots`.

use crate::handlers::{bookings, catalog, companies, customers, events, health, slots};
use crate::middleware::{correlation_id_layer, request_span};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use banquet_core::providers::BanquetStore;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the complete HTTP router over `state`.
///
/// # Example
///
/// ```ignore
/// let store = PostgresBanquetStore::new(pool);
/// let app = build_router(AppState::new(store, Environment::production()));
/// axum::serve(listener, app).await?;
/// ```
pub fn build_router<S: BanquetStore>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check::<S>))
        .route("/api/banquet-slots", post(slots::replace_banquet_slots::<S>))
        .nest("/api", company_routes::<S>())
        .nest("/api/companies", company_routes::<S>())
        .nest("/api/function", function_routes::<S>())
        .nest("/api/mealtypes", meal_type_routes::<S>())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(correlation_id_layer())
        .with_state(state)
}

fn company_routes<S: BanquetStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/", post(companies::create_company::<S>))
        .route("/login", post(companies::login::<S>))
        .route("/company-users", post(companies::add_company_user::<S>))
        .route("/banquet-halls", get(companies::banquet_halls::<S>))
        .route("/banquet-details", get(companies::banquet_details::<S>))
        .route(
            "/time-slots",
            get(slots::get_slots::<S>).post(slots::replace_slots::<S>),
        )
        .route("/banquet-bookings", post(bookings::create_booking::<S>))
        .route("/event-count", get(bookings::event_count::<S>))
        .route(
            "/customers",
            get(customers::list_customers::<S>)
                .post(customers::add_customer::<S>)
                .put(customers::update_customer::<S>)
                .delete(customers::delete_customer::<S>),
        )
        .route("/validate-event", post(customers::validate_event::<S>))
        .route("/customer-search", get(customers::search_customers::<S>))
        .route(
            "/events",
            get(events::user_events::<S>).post(events::create_event::<S>),
        )
        .route(
            "/events/:event_id",
            get(events::get_event::<S>).put(events::update_event::<S>),
        )
}

fn function_routes<S: BanquetStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/functions/add", post(catalog::add_function::<S>))
        .route("/functions/edit/:function_id", put(catalog::edit_function::<S>))
        .route(
            "/functions/delete/:function_id",
            delete(catalog::delete_function::<S>),
        )
        .route("/:user_id", get(catalog::user_functions::<S>))
}

fn meal_type_routes<S: BanquetStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/add", post(catalog::add_meal_type::<S>))
        .route(
            "/:id",
            get(catalog::user_meal_types::<S>)
                .put(catalog::update_meal_type::<S>)
                .delete(catalog::delete_meal_type::<S>),
        )
}
