//! Display formatting for record values. Missing values render as `N/A`.

use smallcap_core::domain::{Field, FinancialRecord};

pub const NA: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnKind {
    Symbol,
    Name,
    Metric(Field),
}

/// A candidate-table column.
pub struct Column {
    pub header: &'static str,
    pub width: u16,
    pub kind: ColumnKind,
}

/// Symbol, name, then the numeric fields shown in the table.
pub const COLUMNS: [Column; 11] = [
    Column { header: "Symbol", width: 7, kind: ColumnKind::Symbol },
    Column { header: "Name", width: 24, kind: ColumnKind::Name },
    Column { header: "Mkt Cap", width: 9, kind: ColumnKind::Metric(Field::MarketCap) },
    Column { header: "YoY", width: 7, kind: ColumnKind::Metric(Field::YoyGrowth) },
    Column { header: "D/E", width: 6, kind: ColumnKind::Metric(Field::DebtToEquity) },
    Column { header: "Curr", width: 6, kind: ColumnKind::Metric(Field::CurrentRatio) },
    Column { header: "Gross", width: 7, kind: ColumnKind::Metric(Field::GrossMargin) },
    Column { header: "FCF", width: 9, kind: ColumnKind::Metric(Field::FreeCashFlow) },
    Column { header: "P/E", width: 7, kind: ColumnKind::Metric(Field::PeRatio) },
    Column { header: "P/B", width: 6, kind: ColumnKind::Metric(Field::PbRatio) },
    Column { header: "PEG", width: 6, kind: ColumnKind::Metric(Field::PegRatio) },
];

/// Cell text for one column of one record.
pub fn cell(record: &FinancialRecord, column: &Column) -> String {
    match column.kind {
        ColumnKind::Symbol => record.symbol.clone(),
        ColumnKind::Name => record.name.clone().unwrap_or_else(|| NA.to_string()),
        ColumnKind::Metric(field) => format_field(field, record.numeric(field)),
    }
}

pub fn format_field(field: Field, value: Option<f64>) -> String {
    match field {
        Field::MarketCap | Field::Revenue | Field::FreeCashFlow => format_money(value),
        f if f.is_fraction() => format_percent(value),
        _ => format_ratio(value),
    }
}

/// `$1.50B`, `$482.0M`, `$12.5K`, `-$3.2M`.
pub fn format_money(value: Option<f64>) -> String {
    let Some(v) = value else {
        return NA.to_string();
    };
    let sign = if v < 0.0 { "-" } else { "" };
    let a = v.abs();
    if a >= 1e12 {
        format!("{sign}${:.2}T", a / 1e12)
    } else if a >= 1e9 {
        format!("{sign}${:.2}B", a / 1e9)
    } else if a >= 1e6 {
        format!("{sign}${:.1}M", a / 1e6)
    } else if a >= 1e3 {
        format!("{sign}${:.1}K", a / 1e3)
    } else {
        format!("{sign}${a:.0}")
    }
}

pub fn format_percent(value: Option<f64>) -> String {
    value.map_or_else(|| NA.to_string(), |v| format!("{:.1}%", v * 100.0))
}

pub fn format_ratio(value: Option<f64>) -> String {
    value.map_or_else(|| NA.to_string(), |v| format!("{v:.2}"))
}

/// Threshold text in the field's own units.
pub fn format_threshold(field: Field, threshold: f64) -> String {
    format_field(field, Some(threshold))
}

/// Cut to `max` characters, marking the cut with a trailing `.`.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{kept}.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_scales() {
        assert_eq!(format_money(Some(1.5e9)), "$1.50B");
        assert_eq!(format_money(Some(4.82e8)), "$482.0M");
        assert_eq!(format_money(Some(12_500.0)), "$12.5K");
        assert_eq!(format_money(Some(-3.2e6)), "-$3.2M");
        assert_eq!(format_money(Some(0.0)), "$0");
        assert_eq!(format_money(None), "N/A");
    }

    #[test]
    fn fractions_render_as_percent() {
        assert_eq!(format_field(Field::YoyGrowth, Some(0.153)), "15.3%");
        assert_eq!(format_field(Field::GrossMargin, None), "N/A");
        assert_eq!(format_field(Field::DebtToEquity, Some(0.5)), "0.50");
        assert_eq!(format_field(Field::FreeCashFlow, Some(1.1e8)), "$110.0M");
    }

    #[test]
    fn cells_fall_back_to_na() {
        let record = FinancialRecord::empty("HZO");
        let cells: Vec<String> = COLUMNS.iter().map(|c| cell(&record, c)).collect();
        assert_eq!(cells[0], "HZO");
        assert!(cells[1..].iter().all(|c| c == NA));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("Boot Barn", 20), "Boot Barn");
        assert_eq!(truncate("Boot Barn Holdings", 6), "Boot .");
        assert_eq!(truncate("Société Générale", 5), "Soci.");
    }
}
