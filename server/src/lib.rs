//! Process wiring for the banquet booking server: configuration, metrics and
//! the connection pool. `main.rs` glues these to `banquet_web::build_router`.

pub mod config;
pub mod metrics;

pub use config::Config;
