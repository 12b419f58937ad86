//! HTTP API for the banquet booking backend.
//!
//! Thin Axum shell over `banquet-core`: handlers decode requests, validate
//! them into core types, call the injected [`BanquetStore`] and map
//! [`BanquetError`] to status codes through [`AppError`].
//!
//! # Request Flow
//!
//! 1. **Correlation id** attached by [`correlation_id_layer`]
//! 2. **Extract** JSON body, query or path ([`extractors`])
//! 3. **Validate** into a core type (`NewBooking`, `NewEvent`, ...)
//! 4. **Store call** on the shared [`AppState`]
//! 5. **Map result** to a status and JSON body
//!
//! # Example
//!
//! ```ignore
//! use banquet_web::{AppState, build_router};
//!
//! let app = build_router(AppState::new(store, Environment::production()));
//! axum::serve(listener, app).await?;
//! ```
//!
//! [`BanquetStore`]: banquet_core::BanquetStore
//! [`BanquetError`]: banquet_core::BanquetError

#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{ApiJson, ApiPath, ApiQuery, CorrelationId};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer, record_company, request_span};
pub use routes::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
