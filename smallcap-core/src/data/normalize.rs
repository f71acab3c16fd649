//! Record normalization: raw provider bundle → fixed-shape FinancialRecord.
//!
//! Total and pure: every input mapping produces a record. Absent, unset,
//! non-finite, or mistyped values become the missing sentinel.

use super::provider::{RawFundamentals, RawValue};
use crate::domain::FinancialRecord;

/// Provider keys for each record attribute.
pub mod keys {
    pub const NAME: &str = "longName";
    pub const SECTOR: &str = "sector";
    pub const INDUSTRY: &str = "industry";
    pub const MARKET_CAP: &str = "marketCap";
    pub const REVENUE: &str = "totalRevenue";
    pub const YOY_GROWTH: &str = "revenueGrowth";
    pub const DEBT_TO_EQUITY: &str = "debtToEquity";
    pub const CURRENT_RATIO: &str = "currentRatio";
    pub const GROSS_MARGIN: &str = "grossMargins";
    pub const FREE_CASH_FLOW: &str = "freeCashflow";
    pub const INSIDER_OWNERSHIP: &str = "heldPercentInsiders";
    pub const PE_RATIO: &str = "trailingPE";
    pub const PB_RATIO: &str = "priceToBook";
    pub const PEG_RATIO: &str = "pegRatio";
    pub const DESCRIPTION: &str = "longBusinessSummary";
}

/// Normalize a raw bundle for `symbol`.
///
/// The record's symbol is always the requested one, whatever the bundle
/// carries.
pub fn normalize(symbol: &str, raw: &RawFundamentals) -> FinancialRecord {
    FinancialRecord {
        symbol: symbol.to_string(),
        name: text(raw, keys::NAME),
        sector: text(raw, keys::SECTOR),
        industry: text(raw, keys::INDUSTRY),
        market_cap: number(raw, keys::MARKET_CAP),
        revenue: number(raw, keys::REVENUE),
        yoy_growth: number(raw, keys::YOY_GROWTH),
        debt_to_equity: number(raw, keys::DEBT_TO_EQUITY),
        current_ratio: number(raw, keys::CURRENT_RATIO),
        gross_margin: number(raw, keys::GROSS_MARGIN),
        free_cash_flow: number(raw, keys::FREE_CASH_FLOW),
        insider_ownership: number(raw, keys::INSIDER_OWNERSHIP),
        pe_ratio: number(raw, keys::PE_RATIO),
        pb_ratio: number(raw, keys::PB_RATIO),
        peg_ratio: number(raw, keys::PEG_RATIO),
        description: text(raw, keys::DESCRIPTION),
    }
}

fn number(raw: &RawFundamentals, key: &str) -> Option<f64> {
    let v = match raw.get(key)? {
        RawValue::Number(n) => *n,
        RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
        RawValue::Unset => return None,
    };
    v.is_finite().then_some(v)
}

fn text(raw: &RawFundamentals, key: &str) -> Option<String> {
    match raw.get(key)? {
        RawValue::Text(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        _ => None,
    }
}
