//! Color tokens and styles for the dashboard.
//!
//! Neon accents on a dark background:
//! - **Accent**: electric cyan (focus, headers, selection)
//! - **Positive**: neon green (passing rules, price gains)
//! - **Negative**: hot pink (failing rules, losses, errors)
//! - **Warning**: neon orange (skipped symbols, missing data)
//! - **Neutral**: cool purple (secondary labels)
//! - **Muted**: steel blue (hints, disabled text)

use ratatui::style::{Color, Modifier, Style};

use smallcap_core::screening::RuleVerdict;

pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
pub const NEGATIVE: Color = Color::Rgb(255, 20, 147);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const NEUTRAL: Color = Color::Rgb(147, 112, 219);
pub const MUTED: Color = Color::Rgb(100, 149, 237);
pub const TEXT: Color = Color::White;

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn positive() -> Style {
    Style::default().fg(POSITIVE)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn neutral() -> Style {
    Style::default().fg(NEUTRAL)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn text() -> Style {
    Style::default().fg(TEXT)
}

/// Highlighted table row.
pub fn selected_row() -> Style {
    accent().add_modifier(Modifier::REVERSED)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent_bold()
    } else {
        muted()
    }
}

/// Green for gains, pink for losses.
pub fn change_style(value: f64) -> Style {
    if value >= 0.0 {
        positive()
    } else {
        negative()
    }
}

pub fn verdict_style(verdict: RuleVerdict) -> Style {
    match verdict {
        RuleVerdict::Pass { .. } => positive(),
        RuleVerdict::Fail { .. } => negative(),
        RuleVerdict::Missing => warning(),
    }
}
