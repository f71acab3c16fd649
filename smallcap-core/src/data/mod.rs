//! Data acquisition: provider lookups, normalization, orchestration, caching

pub mod cache;
pub mod circuit_breaker;
pub mod normalize;
pub mod orchestrator;
pub mod provider;
pub mod yahoo;

pub use cache::{CacheKey, CachedTable, Clock, ManualClock, SystemClock, TableCache};
pub use circuit_breaker::{BreakerState, CircuitBreaker};
pub use normalize::normalize;
pub use orchestrator::{partition, FetchOrchestrator, FetchOutcome, FetchReport, FetchWarning};
pub use provider::{FetchProgress, FundamentalsProvider, LogProgress, ProviderError, RawFundamentals, RawValue};
pub use yahoo::{YahooConfig, YahooProvider};
