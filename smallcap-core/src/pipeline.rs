//! End-to-end screening pipeline: symbols → fetch → screen.

use std::sync::Arc;

use crate::config::ScreenerConfig;
use crate::data::{
    CircuitBreaker, Clock, FetchOrchestrator, FetchProgress, FetchReport, FundamentalsProvider,
    ProviderError, SystemClock, TableCache, YahooProvider,
};
use crate::domain::{FinancialTable, Lookback, PriceHistory};
use crate::screening::{screen, RuleSet};

/// One screening pass.
#[derive(Debug, Clone)]
pub struct ScreenResult {
    /// Everything that was fetched, plus skipped-symbol warnings.
    pub report: FetchReport,
    /// Rows of `report.table` that pass every rule.
    pub candidates: FinancialTable,
}

/// Owns the orchestrator and the active symbol list and rule set.
pub struct Screener<C: Clock = SystemClock> {
    orchestrator: FetchOrchestrator<C>,
    symbols: Vec<String>,
    rules: RuleSet,
    lookback: Lookback,
}

impl Screener<SystemClock> {
    /// Wire a Yahoo-backed screener from a validated config.
    pub fn from_config(config: &ScreenerConfig) -> Self {
        let breaker = Arc::new(CircuitBreaker::new(config.breaker_cooldown()));
        let provider = Arc::new(YahooProvider::with_config(config.yahoo_config(), breaker));
        let cache = TableCache::new(config.cache_ttl());
        let orchestrator = FetchOrchestrator::new(provider, cache)
            .with_parallelism(config.provider.max_parallel_fetches);
        Self::new(orchestrator, config.symbols.clone(), config.rule_set())
            .with_lookback(config.provider.history_lookback)
    }
}

impl<C: Clock> Screener<C> {
    pub fn new(orchestrator: FetchOrchestrator<C>, symbols: Vec<String>, rules: RuleSet) -> Self {
        Self {
            orchestrator,
            symbols,
            rules,
            lookback: Lookback::default(),
        }
    }

    /// Build around any provider with an explicit cache.
    pub fn with_provider(
        provider: Arc<dyn FundamentalsProvider>,
        cache: TableCache<C>,
        symbols: Vec<String>,
        rules: RuleSet,
    ) -> Self {
        Self::new(FetchOrchestrator::new(provider, cache), symbols, rules)
    }

    pub fn with_lookback(mut self, lookback: Lookback) -> Self {
        self.lookback = lookback;
        self
    }

    /// Swap the rule set. Cached tables stay valid since rules apply after fetch.
    pub fn set_rules(&mut self, rules: RuleSet) {
        self.rules = rules;
    }

    /// Fetch (cache permitting) and screen.
    pub fn run(&mut self, progress: &dyn FetchProgress) -> ScreenResult {
        let report = self.orchestrator.fetch(&self.symbols, progress);
        self.finish(report)
    }

    /// Re-fetch ignoring the cache, then screen.
    pub fn refresh(&mut self, progress: &dyn FetchProgress) -> ScreenResult {
        let report = self.orchestrator.refresh(&self.symbols, progress);
        self.finish(report)
    }

    pub fn price_history(&self, symbol: &str) -> Result<PriceHistory, ProviderError> {
        self.orchestrator.price_history(symbol, self.lookback)
    }

    fn finish(&self, report: FetchReport) -> ScreenResult {
        let candidates = screen(&report.table, &self.rules);
        tracing::info!(
            fetched = report.table.len(),
            skipped = report.warnings.len(),
            candidates = candidates.len(),
            from_cache = report.from_cache,
            "screen complete"
        );
        ScreenResult { report, candidates }
    }
}
