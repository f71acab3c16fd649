//! Rule evaluation over whole tables.

use crate::domain::{FinancialRecord, FinancialTable};

use super::rule::{RuleSet, RuleVerdict, ScreeningRule};

/// Records satisfying every rule, in input order.
pub fn screen(table: &FinancialTable, rules: &RuleSet) -> FinancialTable {
    let screened = table.filter(|r| rules.matches(r));
    tracing::debug!(
        input = table.len(),
        passed = screened.len(),
        rules = rules.len(),
        "screened table"
    );
    screened
}

/// Every rule's verdict for one record, in rule order.
pub fn explain(record: &FinancialRecord, rules: &RuleSet) -> Vec<(ScreeningRule, RuleVerdict)> {
    rules.rules().iter().map(|rule| (*rule, rule.evaluate(record))).collect()
}

/// How many records each rule rejects on its own, in rule order.
///
/// Counts overlap: a record failing three rules is counted three times.
pub fn rejection_counts(table: &FinancialTable, rules: &RuleSet) -> Vec<(ScreeningRule, usize)> {
    rules
        .rules()
        .iter()
        .map(|rule| (*rule, table.iter().filter(|r| !rule.matches(r)).count()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Field;
    use crate::screening::rule::Comparator;

    fn passing(symbol: &str) -> FinancialRecord {
        FinancialRecord {
            symbol: symbol.into(),
            market_cap: Some(5e8),
            yoy_growth: Some(0.15),
            debt_to_equity: Some(0.5),
            current_ratio: Some(2.0),
            gross_margin: Some(0.4),
            free_cash_flow: Some(1e6),
            insider_ownership: Some(0.1),
            ..Default::default()
        }
    }

    #[test]
    fn keeps_only_full_passes_in_order() {
        let mut too_big = passing("B");
        too_big.market_cap = Some(5e9);
        let table = FinancialTable::new(vec![passing("A"), too_big, passing("C")]);

        let out = screen(&table, &RuleSet::small_cap());
        assert_eq!(out.symbols(), vec!["A", "C"]);
    }

    #[test]
    fn empty_table_screens_empty() {
        assert!(screen(&FinancialTable::empty(), &RuleSet::small_cap()).is_empty());
    }

    #[test]
    fn boundaries_follow_comparators() {
        let mut at_floor = passing("FLOOR");
        at_floor.market_cap = Some(1e8);
        let mut at_ceiling = passing("CEIL");
        at_ceiling.market_cap = Some(2e9);
        let mut growth_edge = passing("GROW");
        growth_edge.yoy_growth = Some(0.10);
        let table = FinancialTable::new(vec![at_floor, at_ceiling, growth_edge]);

        let out = screen(&table, &RuleSet::small_cap());
        assert_eq!(out.symbols(), vec!["FLOOR", "CEIL"]);
    }

    #[test]
    fn explain_reports_each_rule() {
        let mut r = passing("A");
        r.debt_to_equity = Some(45.0);
        r.insider_ownership = None;

        let verdicts = explain(&r, &RuleSet::small_cap());
        assert_eq!(verdicts.len(), 8);
        assert_eq!(verdicts[3].0.field, Field::DebtToEquity);
        assert_eq!(verdicts[3].1, RuleVerdict::Fail { actual: 45.0 });
        assert_eq!(verdicts[7].1, RuleVerdict::Missing);
        assert_eq!(verdicts.iter().filter(|(_, v)| v.passed()).count(), 6);
    }

    #[test]
    fn rejection_counts_per_rule() {
        let mut no_fcf = passing("B");
        no_fcf.free_cash_flow = None;
        let table = FinancialTable::new(vec![passing("A"), no_fcf]);
        let rules = RuleSet::new(vec![
            ScreeningRule::new(Field::MarketCap, Comparator::Ge, 1e8),
            ScreeningRule::new(Field::FreeCashFlow, Comparator::Gt, 0.0),
        ]);

        let counts: Vec<usize> = rejection_counts(&table, &rules).into_iter().map(|(_, n)| n).collect();
        assert_eq!(counts, vec![0, 1]);
    }
}
