//! Fetch orchestrator: multi-symbol fetch with failure isolation and memoization.
//!
//! Each symbol is looked up once. Failures become warnings and the symbol is
//! skipped; the rest of the batch proceeds. Whole tables are cached by symbol
//! list for the cache's TTL.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::sync::Arc;

use super::cache::{CacheKey, Clock, SystemClock, TableCache};
use super::normalize::normalize;
use super::provider::{FetchProgress, FundamentalsProvider, ProviderError};
use crate::domain::{FinancialRecord, FinancialTable, Lookback, PriceHistory};

/// A symbol that was skipped, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchWarning {
    pub symbol: String,
    pub cause: String,
}

impl std::fmt::Display for FetchWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error fetching data for {}: {}", self.symbol, self.cause)
    }
}

/// Outcome of one symbol's lookup.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Fetched(FinancialRecord),
    Failed(FetchWarning),
}

/// Result of one orchestrator call.
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub table: FinancialTable,
    /// Skipped symbols, in input order. A cache hit repeats the original fetch's.
    pub warnings: Vec<FetchWarning>,
    pub from_cache: bool,
    /// When the table was fetched (the original time on a cache hit).
    pub fetched_at: DateTime<Utc>,
}

impl FetchReport {
    pub fn all_succeeded(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Split outcomes into the table of successes and the list of warnings,
/// both in input order.
pub fn partition(outcomes: Vec<FetchOutcome>) -> (FinancialTable, Vec<FetchWarning>) {
    let mut records = Vec::with_capacity(outcomes.len());
    let mut warnings = Vec::new();
    for outcome in outcomes {
        match outcome {
            FetchOutcome::Fetched(record) => records.push(record),
            FetchOutcome::Failed(warning) => warnings.push(warning),
        }
    }
    (FinancialTable::new(records), warnings)
}

/// Coordinates provider lookups, normalization and the table cache.
pub struct FetchOrchestrator<C: Clock = SystemClock> {
    provider: Arc<dyn FundamentalsProvider>,
    cache: TableCache<C>,
    parallelism: usize,
}

impl<C: Clock> FetchOrchestrator<C> {
    pub fn new(provider: Arc<dyn FundamentalsProvider>, cache: TableCache<C>) -> Self {
        Self {
            provider,
            cache,
            parallelism: 1,
        }
    }

    /// Fan lookups out over `n` threads. Output order is unaffected.
    pub fn with_parallelism(mut self, n: usize) -> Self {
        self.parallelism = n.max(1);
        self
    }

    /// Table for `symbols`, served from cache while fresh.
    pub fn fetch(&mut self, symbols: &[String], progress: &dyn FetchProgress) -> FetchReport {
        let key = CacheKey::for_symbols(symbols);
        if let Some(hit) = self.cache.get(&key) {
            tracing::info!(
                key = %key,
                rows = hit.table.len(),
                skipped = hit.warnings.len(),
                fetched_at = %hit.fetched_at,
                "serving table from cache"
            );
            return FetchReport {
                table: hit.table.clone(),
                warnings: hit.warnings.clone(),
                from_cache: true,
                fetched_at: hit.fetched_at,
            };
        }
        self.fetch_and_store(key, symbols, progress)
    }

    /// Re-fetch `symbols` regardless of the cache, replacing the entry.
    pub fn refresh(&mut self, symbols: &[String], progress: &dyn FetchProgress) -> FetchReport {
        let key = CacheKey::for_symbols(symbols);
        self.fetch_and_store(key, symbols, progress)
    }

    /// Drop the cached table for `symbols`.
    pub fn invalidate(&mut self, symbols: &[String]) -> bool {
        self.cache.invalidate(&CacheKey::for_symbols(symbols))
    }

    /// Close history for the detail chart. Never cached.
    pub fn price_history(&self, symbol: &str, lookback: Lookback) -> Result<PriceHistory, ProviderError> {
        self.provider.price_history(symbol, lookback)
    }

    fn fetch_and_store(&mut self, key: CacheKey, symbols: &[String], progress: &dyn FetchProgress) -> FetchReport {
        self.cache.purge_expired();

        let outcomes = self.fetch_all(symbols, progress);
        let (table, warnings) = partition(outcomes);

        for w in &warnings {
            tracing::warn!(symbol = %w.symbol, error = %w.cause, "skipping symbol: fetch failed");
        }
        progress.on_batch_complete(table.len(), warnings.len(), symbols.len());

        let stored = self.cache.put(key, table, warnings);
        FetchReport {
            table: stored.table.clone(),
            warnings: stored.warnings.clone(),
            from_cache: false,
            fetched_at: stored.fetched_at,
        }
    }

    fn fetch_all(&self, symbols: &[String], progress: &dyn FetchProgress) -> Vec<FetchOutcome> {
        let total = symbols.len();
        let provider = self.provider.as_ref();

        if self.parallelism > 1 && total > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.parallelism)
                .thread_name(|i| format!("smallcap-fetch-{i}"))
                .build()
            {
                Ok(pool) => {
                    return pool.install(|| {
                        symbols
                            .par_iter()
                            .enumerate()
                            .map(|(i, symbol)| fetch_one(provider, symbol, i, total, progress))
                            .collect()
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "fetch pool unavailable, fetching sequentially");
                }
            }
        }

        symbols
            .iter()
            .enumerate()
            .map(|(i, symbol)| fetch_one(provider, symbol, i, total, progress))
            .collect()
    }
}

/// Fetch and normalize a single symbol.
fn fetch_one(
    provider: &dyn FundamentalsProvider,
    symbol: &str,
    index: usize,
    total: usize,
    progress: &dyn FetchProgress,
) -> FetchOutcome {
    progress.on_start(symbol, index, total);
    match provider.fundamentals(symbol) {
        Ok(raw) => {
            progress.on_complete(symbol, index, total, None);
            FetchOutcome::Fetched(normalize(symbol, &raw))
        }
        Err(e) => {
            progress.on_complete(symbol, index, total, Some(&e));
            FetchOutcome::Failed(FetchWarning {
                symbol: symbol.to_string(),
                cause: e.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_keeps_input_order() {
        let outcomes = vec![
            FetchOutcome::Fetched(FinancialRecord::empty("A")),
            FetchOutcome::Failed(FetchWarning {
                symbol: "B".into(),
                cause: "network unreachable: reset".into(),
            }),
            FetchOutcome::Fetched(FinancialRecord::empty("C")),
            FetchOutcome::Failed(FetchWarning {
                symbol: "D".into(),
                cause: "symbol not found: D".into(),
            }),
        ];
        let (table, warnings) = partition(outcomes);
        assert_eq!(table.symbols(), vec!["A", "C"]);
        let skipped: Vec<&str> = warnings.iter().map(|w| w.symbol.as_str()).collect();
        assert_eq!(skipped, vec!["B", "D"]);
    }

    #[test]
    fn warning_names_symbol_and_cause() {
        let w = FetchWarning {
            symbol: "CCRN".into(),
            cause: "request timed out: 30s".into(),
        };
        assert_eq!(w.to_string(), "Error fetching data for CCRN: request timed out: 30s");
    }
}
