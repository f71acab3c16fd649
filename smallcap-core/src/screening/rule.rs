//! Screening rules: `(field, comparator, threshold)` predicates as data.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{Field, FinancialRecord};

/// Comparison applied as `value <op> threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
}

impl Comparator {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
            Comparator::Lt => "<",
            Comparator::Le => "<=",
        }
    }

    /// Missing values never compare true.
    pub fn compare(self, value: Option<f64>, threshold: f64) -> bool {
        let Some(v) = value else {
            return false;
        };
        match self {
            Comparator::Gt => v > threshold,
            Comparator::Ge => v >= threshold,
            Comparator::Lt => v < threshold,
            Comparator::Le => v <= threshold,
        }
    }

    /// Whether the comparator bounds the field from below.
    pub fn is_lower_bound(self) -> bool {
        matches!(self, Comparator::Gt | Comparator::Ge)
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One threshold predicate over one field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreeningRule {
    pub field: Field,
    pub comparator: Comparator,
    pub threshold: f64,
}

impl ScreeningRule {
    pub const fn new(field: Field, comparator: Comparator, threshold: f64) -> Self {
        Self {
            field,
            comparator,
            threshold,
        }
    }

    pub fn matches(&self, record: &FinancialRecord) -> bool {
        self.comparator.compare(record.numeric(self.field), self.threshold)
    }

    /// Per-rule verdict with the value that was compared.
    pub fn evaluate(&self, record: &FinancialRecord) -> RuleVerdict {
        match record.numeric(self.field) {
            None => RuleVerdict::Missing,
            Some(actual) if self.comparator.compare(Some(actual), self.threshold) => RuleVerdict::Pass { actual },
            Some(actual) => RuleVerdict::Fail { actual },
        }
    }
}

impl fmt::Display for ScreeningRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.comparator, self.threshold)
    }
}

/// Outcome of one rule against one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuleVerdict {
    Pass { actual: f64 },
    Fail { actual: f64 },
    Missing,
}

impl RuleVerdict {
    pub fn passed(self) -> bool {
        matches!(self, RuleVerdict::Pass { .. })
    }
}

/// Ordered conjunction of rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<ScreeningRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<ScreeningRule>) -> Self {
        Self { rules }
    }

    /// The small-cap quality screen.
    pub fn small_cap() -> Self {
        Thresholds::default().to_rule_set()
    }

    pub fn rules(&self) -> &[ScreeningRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// True when every rule holds. An empty set passes everything.
    pub fn matches(&self, record: &FinancialRecord) -> bool {
        self.rules.iter().all(|r| r.matches(record))
    }

    /// Builder-style append.
    pub fn with(mut self, rule: ScreeningRule) -> Self {
        self.rules.push(rule);
        self
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::small_cap()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a ScreeningRule;
    type IntoIter = std::slice::Iter<'a, ScreeningRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Named thresholds of the small-cap screen.
///
/// Each field is optional in config files; omitted ones keep their default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    pub min_market_cap: f64,
    pub max_market_cap: f64,
    pub min_yoy_growth: f64,
    pub max_debt_to_equity: f64,
    pub min_current_ratio: f64,
    pub min_gross_margin: f64,
    pub min_free_cash_flow: f64,
    pub min_insider_ownership: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_market_cap: 1e8,
            max_market_cap: 2e9,
            min_yoy_growth: 0.10,
            max_debt_to_equity: 1.0,
            min_current_ratio: 1.5,
            min_gross_margin: 0.30,
            min_free_cash_flow: 0.0,
            min_insider_ownership: 0.05,
        }
    }
}

impl Thresholds {
    pub fn to_rule_set(&self) -> RuleSet {
        use Comparator::*;
        RuleSet::new(vec![
            ScreeningRule::new(Field::MarketCap, Ge, self.min_market_cap),
            ScreeningRule::new(Field::MarketCap, Le, self.max_market_cap),
            ScreeningRule::new(Field::YoyGrowth, Gt, self.min_yoy_growth),
            ScreeningRule::new(Field::DebtToEquity, Lt, self.max_debt_to_equity),
            ScreeningRule::new(Field::CurrentRatio, Gt, self.min_current_ratio),
            ScreeningRule::new(Field::GrossMargin, Gt, self.min_gross_margin),
            ScreeningRule::new(Field::FreeCashFlow, Gt, self.min_free_cash_flow),
            ScreeningRule::new(Field::InsiderOwnership, Gt, self.min_insider_ownership),
        ])
    }
}
