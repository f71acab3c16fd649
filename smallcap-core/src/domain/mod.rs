//! Domain types for the screener

pub mod price;
pub mod record;
pub mod table;

pub use price::{Lookback, PriceHistory, PricePoint};
pub use record::{Field, FinancialRecord};
pub use table::FinancialTable;
