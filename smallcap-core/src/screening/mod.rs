//! Screening engine: filters a table through a data-driven rule set.
//!
//! Rules are `(field, comparator, threshold)` tuples joined by logical AND.
//! A missing operand fails its rule; nothing is ever defaulted to zero.

pub mod engine;
pub mod rule;

pub use engine::{explain, rejection_counts, screen};
pub use rule::{Comparator, RuleSet, RuleVerdict, ScreeningRule, Thresholds};
