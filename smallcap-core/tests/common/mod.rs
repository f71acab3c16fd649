//! Shared test doubles: a scripted provider and passing/failing fixtures.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use smallcap_core::data::normalize::keys;
use smallcap_core::data::{FundamentalsProvider, ProviderError, RawFundamentals};
use smallcap_core::domain::{Lookback, PriceHistory, PricePoint};

/// What the scripted provider does for one symbol.
#[derive(Clone)]
pub enum Script {
    Respond(RawFundamentals),
    NotFound,
    Timeout,
    Network,
}

/// In-memory provider that replays a script and counts lookups.
#[derive(Default)]
pub struct ScriptedProvider {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, symbol: &str, script: Script) -> Self {
        self.scripts.insert(symbol.to_string(), script);
        self
    }

    /// Every symbol looked up so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl FundamentalsProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn fundamentals(&self, symbol: &str) -> Result<RawFundamentals, ProviderError> {
        self.calls.lock().unwrap().push(symbol.to_string());
        match self.scripts.get(symbol) {
            Some(Script::Respond(raw)) => Ok(raw.clone()),
            Some(Script::Timeout) => Err(ProviderError::Timeout(format!("{symbol} took too long"))),
            Some(Script::Network) => Err(ProviderError::NetworkUnreachable("connection reset".into())),
            Some(Script::NotFound) | None => Err(ProviderError::SymbolNotFound {
                symbol: symbol.to_string(),
            }),
        }
    }

    fn price_history(&self, symbol: &str, lookback: Lookback) -> Result<PriceHistory, ProviderError> {
        if !self.scripts.contains_key(symbol) {
            return Err(ProviderError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let points = (0..5)
            .map(|i| PricePoint {
                date: start + chrono::Duration::days(i),
                close: 100.0 + i as f64,
            })
            .collect();
        Ok(PriceHistory {
            symbol: symbol.to_string(),
            lookback,
            points,
        })
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Fundamentals that pass every default rule.
pub fn passing(symbol: &str) -> RawFundamentals {
    RawFundamentals::new(symbol)
        .with(keys::NAME, format!("{symbol} Holdings").as_str())
        .with(keys::MARKET_CAP, 5e8)
        .with(keys::YOY_GROWTH, 0.15)
        .with(keys::DEBT_TO_EQUITY, 0.5)
        .with(keys::CURRENT_RATIO, 2.0)
        .with(keys::GROSS_MARGIN, 0.4)
        .with(keys::FREE_CASH_FLOW, 1e6)
        .with(keys::INSIDER_OWNERSHIP, 0.1)
}

pub fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
