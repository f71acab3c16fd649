//! Test helpers: an in-memory provider and canned screen results.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};

use smallcap_core::data::normalize::keys;
use smallcap_core::data::{
    normalize, FetchReport, FetchWarning, FundamentalsProvider, ProviderError, RawFundamentals,
};
use smallcap_core::domain::{FinancialTable, Lookback, PriceHistory, PricePoint};
use smallcap_core::screening::{screen, RuleSet};
use smallcap_core::ScreenResult;

/// Serves canned bundles; unknown symbols are not found.
#[derive(Default)]
pub struct StubProvider {
    bundles: HashMap<String, RawFundamentals>,
}

impl StubProvider {
    pub fn with(mut self, raw: RawFundamentals) -> Self {
        self.bundles.insert(raw.symbol.clone(), raw);
        self
    }
}

impl FundamentalsProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    fn fundamentals(&self, symbol: &str) -> Result<RawFundamentals, ProviderError> {
        self.bundles
            .get(symbol)
            .cloned()
            .ok_or_else(|| ProviderError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
    }

    fn price_history(&self, symbol: &str, lookback: Lookback) -> Result<PriceHistory, ProviderError> {
        if !self.bundles.contains_key(symbol) {
            return Err(ProviderError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        Ok(history(symbol, lookback, &[10.0, 11.0, 10.5, 12.0]))
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Bundle that passes every default rule.
pub fn passing(symbol: &str) -> RawFundamentals {
    RawFundamentals::new(symbol)
        .with(keys::NAME, format!("{symbol} Holdings").as_str())
        .with(keys::SECTOR, "Consumer Cyclical")
        .with(keys::MARKET_CAP, 5e8)
        .with(keys::YOY_GROWTH, 0.15)
        .with(keys::DEBT_TO_EQUITY, 0.5)
        .with(keys::CURRENT_RATIO, 2.0)
        .with(keys::GROSS_MARGIN, 0.4)
        .with(keys::FREE_CASH_FLOW, 1e6)
        .with(keys::INSIDER_OWNERSHIP, 0.1)
        .with(keys::PE_RATIO, 14.2)
        .with(keys::DESCRIPTION, "Operates stores.")
}

pub fn history(symbol: &str, lookback: Lookback, closes: &[f64]) -> PriceHistory {
    let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    PriceHistory {
        symbol: symbol.to_string(),
        lookback,
        points: closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start + chrono::Duration::days(i as i64),
                close,
            })
            .collect(),
    }
}

/// Screen `passing` bundles for `symbols` plus warnings for `skipped`.
pub fn screen_result(symbols: &[&str], skipped: &[&str]) -> ScreenResult {
    let table: FinancialTable = symbols.iter().map(|s| normalize(s, &passing(s))).collect();
    let candidates = screen(&table, &RuleSet::small_cap());
    ScreenResult {
        report: FetchReport {
            table,
            warnings: skipped
                .iter()
                .map(|s| FetchWarning {
                    symbol: s.to_string(),
                    cause: "network unreachable: connection reset".into(),
                })
                .collect(),
            from_cache: false,
            fetched_at: Utc::now(),
        },
        candidates,
    }
}
