//! Business metrics for the banquet booking backend.
//!
//! The counters are incremented by `banquet-postgres` at the point each write
//! commits; this module only describes them and installs the exporter.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `banquet_bookings_total{outcome}` - Booking attempts by outcome (created, conflict)
//! - `banquet_slot_replacements_total` - Slot catalog replacements
//! - `banquet_events_created_total` - Event records created
//! - `banquet_customers_added_total` - Customers registered directly

use anyhow::Context;
use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Register all business metric descriptions.
///
/// Call once at startup, after the recorder is installed.
pub fn register_business_metrics() {
    describe_counter!(
        "banquet_bookings_total",
        "Booking attempts by outcome (created, conflict)"
    );
    describe_counter!(
        "banquet_slot_replacements_total",
        "Number of slot catalog replacements"
    );
    describe_counter!(
        "banquet_events_created_total",
        "Number of event records created"
    );
    describe_counter!(
        "banquet_customers_added_total",
        "Number of customers added through the customer endpoint"
    );

    tracing::info!("Business metrics registered");
}

/// Install the Prometheus recorder with an HTTP scrape listener on `address`.
///
/// Must run inside a Tokio runtime.
///
/// # Errors
///
/// Fails when `address` does not parse or the recorder cannot be installed.
pub fn install_exporter(address: &str) -> anyhow::Result<()> {
    let addr: SocketAddr = address
        .parse()
        .with_context(|| format!("Invalid metrics address: {address}"))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Failed to install Prometheus exporter")?;

    register_business_metrics();
    tracing::info!(address = %addr, "Prometheus exporter listening");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_address() {
        assert!(install_exporter("not an address").is_err());
    }

    #[test]
    fn describing_without_recorder_is_a_no_op() {
        register_business_metrics();
    }
}
