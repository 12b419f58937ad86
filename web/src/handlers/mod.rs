//! HTTP request handlers, one module per component.
//!
//! Handlers are generic over the store so the same code serves Postgres in
//! production and the in-memory store in tests. Each one decodes the request
//! leniently, validates it into a core type, calls the store and maps the
//! outcome to a status code.

pub mod bookings;
pub mod catalog;
pub mod companies;
pub mod customers;
pub mod events;
pub mod health;
pub mod slots;

use crate::middleware::record_company;
use banquet_core::error::Result;
use banquet_core::event::parse_client_id;
use banquet_core::ids::CompanyId;
use serde::{Deserialize, Serialize};

pub use health::{health_check, readiness_check};

/// `{"message": ...}` acknowledgement body.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: &'static str,
}

impl MessageResponse {
    pub(crate) const fn new(message: &'static str) -> Self {
        Self { message }
    }
}

/// `?company_id=` query, taken as text so blanks and `undefined` report as missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyQuery {
    /// Raw company id.
    pub company_id: Option<String>,
}

impl CompanyQuery {
    pub(crate) fn company_id(&self) -> Result<CompanyId> {
        let company_id = CompanyId::new(parse_client_id("company_id", self.company_id.as_deref())?);
        record_company(company_id);
        Ok(company_id)
    }
}
