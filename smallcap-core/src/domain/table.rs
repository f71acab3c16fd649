//! FinancialTable: the ordered snapshot produced by one fetch cycle.

use serde::{Deserialize, Serialize};

use super::record::FinancialRecord;

/// Ordered, immutable sequence of records.
///
/// Row order is the order of the symbols that were fetched successfully.
/// Filtering never edits a table in place; it builds a new one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FinancialTable {
    records: Vec<FinancialRecord>,
}

impl FinancialTable {
    pub fn new(records: Vec<FinancialRecord>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FinancialRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[FinancialRecord] {
        &self.records
    }

    /// Row at `index`, if any.
    pub fn row(&self, index: usize) -> Option<&FinancialRecord> {
        self.records.get(index)
    }

    /// Find the record for a symbol.
    pub fn get(&self, symbol: &str) -> Option<&FinancialRecord> {
        self.records.iter().find(|r| r.symbol == symbol)
    }

    /// Symbols in row order.
    pub fn symbols(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.symbol.as_str()).collect()
    }

    /// New table with the rows matching `pred`, relative order preserved.
    pub fn filter<P>(&self, mut pred: P) -> FinancialTable
    where
        P: FnMut(&FinancialRecord) -> bool,
    {
        FinancialTable {
            records: self.records.iter().filter(|r| pred(r)).cloned().collect(),
        }
    }
}

impl FromIterator<FinancialRecord> for FinancialTable {
    fn from_iter<I: IntoIterator<Item = FinancialRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FinancialTable {
    type Item = &'a FinancialRecord;
    type IntoIter = std::slice::Iter<'a, FinancialRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
