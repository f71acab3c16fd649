//! Provider trait and structured error types.
//!
//! The FundamentalsProvider trait abstracts over data sources so the Yahoo
//! implementation can be swapped out and scripted providers used in tests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::{Lookback, PriceHistory};

/// A single provider value before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawValue {
    Text(String),
    Number(f64),
    Unset,
}

impl RawValue {
    /// Convert a JSON scalar. Objects, arrays, bools and null are `Unset`.
    pub fn from_json(value: &serde_json::Value) -> RawValue {
        match value {
            serde_json::Value::String(s) => RawValue::Text(s.clone()),
            serde_json::Value::Number(n) => n.as_f64().map(RawValue::Number).unwrap_or(RawValue::Unset),
            _ => RawValue::Unset,
        }
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

/// Raw key/value fundamentals for one symbol, keyed by provider field name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawFundamentals {
    pub symbol: String,
    pub fields: BTreeMap<String, RawValue>,
}

impl RawFundamentals {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<RawValue>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.fields.get(key)
    }
}

/// Structured error types for provider operations.
///
/// These are displayable in both log lines and the TUI warning list.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("provider error: {0}")]
    Other(String),
}

/// Trait for fundamentals providers (Yahoo Finance, scripted test doubles).
///
/// Implementations only fetch. Caching and failure isolation live in the
/// orchestrator above this trait.
pub trait FundamentalsProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the raw fundamentals bundle for one symbol.
    fn fundamentals(&self, symbol: &str) -> Result<RawFundamentals, ProviderError>;

    /// Fetch daily closes for one symbol over a lookback window.
    fn price_history(&self, symbol: &str, lookback: Lookback) -> Result<PriceHistory, ProviderError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool;
}

/// Progress callback for multi-symbol fetches.
pub trait FetchProgress: Send + Sync {
    /// Called when starting to fetch a symbol.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called when a symbol fetch completes.
    fn on_complete(&self, symbol: &str, index: usize, total: usize, error: Option<&ProviderError>);

    /// Called when the entire batch is done.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Progress reporter that writes tracing events.
pub struct LogProgress;

impl FetchProgress for LogProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        tracing::debug!(symbol, "[{}/{}] fetching", index + 1, total);
    }

    fn on_complete(&self, symbol: &str, _index: usize, _total: usize, error: Option<&ProviderError>) {
        match error {
            None => tracing::debug!(symbol, "fetched"),
            Some(e) => tracing::debug!(symbol, error = %e, "fetch failed"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        tracing::info!(succeeded, failed, total, "fetch batch complete");
    }
}
