//! SmallCap Core: the screening pipeline behind the dashboard.
//!
//! - Domain types (financial records, tables, price history)
//! - Provider trait and the Yahoo Finance implementation
//! - Record normalization with an explicit missing sentinel
//! - Fetch orchestration with per-symbol failure isolation and a TTL table cache
//! - Data-driven screening rules
//! - Configuration and logging setup

pub mod config;
pub mod data;
pub mod domain;
pub mod logging;
pub mod pipeline;
pub mod screening;

pub use config::{ConfigError, ScreenerConfig};
pub use pipeline::{ScreenResult, Screener};
