#![forbid(unsafe_code)]

//! Core domain model and business logic for the Bacchus BAC estimator.
//!
//! This crate provides:
//! - Domain types (drinks, profile, status, trend points)
//! - Catalog management
//! - Widmark estimation and trend sampling
//! - Persistence (WAL, CSV, profile state)
//! - Display units and safety constants

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod units;
pub mod wal;
pub mod csv_rollup;
pub mod state;
pub mod history;
pub mod estimator;
pub mod trend;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::Config;
pub use units::BacUnit;
pub use wal::{DrinkSink, JsonlSink};
pub use history::load_recent_drinks;
pub use estimator::{classify_bac, drink_contribution, estimate_bac, total_bac_at};
pub use trend::{peak, sample_trend};
