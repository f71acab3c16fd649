//! FinancialRecord: one row of fundamentals per symbol.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fundamentals for a single symbol.
///
/// Every attribute except `symbol` may be missing (`None`). Missing is a
/// distinct state from zero: it is never substituted into arithmetic, and it
/// fails every screening comparison.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub symbol: String,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<f64>,
    pub revenue: Option<f64>,
    /// Year-over-year revenue growth as a fraction (0.15 = 15%).
    pub yoy_growth: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub current_ratio: Option<f64>,
    /// Gross margin as a fraction.
    pub gross_margin: Option<f64>,
    pub free_cash_flow: Option<f64>,
    /// Fraction of shares held by insiders.
    pub insider_ownership: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub pb_ratio: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub description: Option<String>,
}

impl FinancialRecord {
    /// A record with only the symbol set; every other attribute is missing.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    /// Look up a numeric attribute by field.
    pub fn numeric(&self, field: Field) -> Option<f64> {
        match field {
            Field::MarketCap => self.market_cap,
            Field::Revenue => self.revenue,
            Field::YoyGrowth => self.yoy_growth,
            Field::DebtToEquity => self.debt_to_equity,
            Field::CurrentRatio => self.current_ratio,
            Field::GrossMargin => self.gross_margin,
            Field::FreeCashFlow => self.free_cash_flow,
            Field::InsiderOwnership => self.insider_ownership,
            Field::PeRatio => self.pe_ratio,
            Field::PbRatio => self.pb_ratio,
            Field::PegRatio => self.peg_ratio,
        }
    }

    /// Number of numeric attributes that are present.
    pub fn populated_count(&self) -> usize {
        Field::ALL
            .iter()
            .filter(|f| self.numeric(**f).is_some())
            .count()
    }
}

/// The numeric attributes of a `FinancialRecord`, addressable as data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    MarketCap,
    Revenue,
    YoyGrowth,
    DebtToEquity,
    CurrentRatio,
    GrossMargin,
    FreeCashFlow,
    InsiderOwnership,
    PeRatio,
    PbRatio,
    PegRatio,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::MarketCap,
        Field::Revenue,
        Field::YoyGrowth,
        Field::DebtToEquity,
        Field::CurrentRatio,
        Field::GrossMargin,
        Field::FreeCashFlow,
        Field::InsiderOwnership,
        Field::PeRatio,
        Field::PbRatio,
        Field::PegRatio,
    ];

    /// Short display label.
    pub fn label(self) -> &'static str {
        match self {
            Field::MarketCap => "Market Cap",
            Field::Revenue => "Revenue",
            Field::YoyGrowth => "YoY Growth",
            Field::DebtToEquity => "Debt/Equity",
            Field::CurrentRatio => "Current Ratio",
            Field::GrossMargin => "Gross Margin",
            Field::FreeCashFlow => "Free Cash Flow",
            Field::InsiderOwnership => "Insider Ownership",
            Field::PeRatio => "P/E",
            Field::PbRatio => "P/B",
            Field::PegRatio => "PEG",
        }
    }

    /// Whether values of this field are fractions best shown as percentages.
    pub fn is_fraction(self) -> bool {
        matches!(
            self,
            Field::YoyGrowth | Field::GrossMargin | Field::InsiderOwnership
        )
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record_has_only_symbol() {
        let r = FinancialRecord::empty("BJRI");
        assert_eq!(r.symbol, "BJRI");
        assert_eq!(r.populated_count(), 0);
        for field in Field::ALL {
            assert!(r.numeric(field).is_none(), "{field} should be missing");
        }
    }

    #[test]
    fn numeric_lookup_maps_every_field() {
        let r = FinancialRecord {
            symbol: "X".into(),
            market_cap: Some(1.0),
            revenue: Some(2.0),
            yoy_growth: Some(3.0),
            debt_to_equity: Some(4.0),
            current_ratio: Some(5.0),
            gross_margin: Some(6.0),
            free_cash_flow: Some(7.0),
            insider_ownership: Some(8.0),
            pe_ratio: Some(9.0),
            pb_ratio: Some(10.0),
            peg_ratio: Some(11.0),
            ..Default::default()
        };
        let values: Vec<f64> = Field::ALL.iter().filter_map(|f| r.numeric(*f)).collect();
        assert_eq!(values, (1..=11).map(f64::from).collect::<Vec<_>>());
    }

    #[test]
    fn field_serializes_snake_case() {
        let json = serde_json::to_string(&Field::FreeCashFlow).unwrap();
        assert_eq!(json, "\"free_cash_flow\"");
        let back: Field = serde_json::from_str("\"insider_ownership\"").unwrap();
        assert_eq!(back, Field::InsiderOwnership);
    }
}
