//! Overlay widgets: skipped-symbol warnings, rule breakdown, key help.

use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use smallcap_core::screening::rejection_counts;

use crate::app::AppState;
use crate::theme;
use crate::ui::centered_rect;
use crate::view;

/// Symbols the last fetch skipped, with the provider's reason.
pub fn render_warnings(f: &mut Frame, area: Rect, app: &AppState) {
    let popup = centered_rect(80, 70, area);
    f.render_widget(Clear, popup);

    let warnings = app.warnings();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::warning())
        .title(format!(" Skipped Symbols ({}) [Esc]close [j/k]scroll ", warnings.len()))
        .title_style(theme::warning());

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    if warnings.is_empty() {
        let text = Paragraph::new(Span::styled("Every symbol was fetched.", theme::muted()));
        f.render_widget(text, inner);
        return;
    }

    let lines: Vec<Line> = warnings
        .iter()
        .enumerate()
        .skip(app.warning_scroll)
        .take(inner.height as usize)
        .map(|(i, w)| {
            let style = if i == app.warning_scroll {
                theme::warning().add_modifier(Modifier::BOLD)
            } else {
                theme::muted()
            };
            Line::from(Span::styled(w.to_string(), style))
        })
        .collect();

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

/// Active rules with how many fetched rows each one rejects.
pub fn render_rules(f: &mut Frame, area: Rect, app: &AppState) {
    let popup = centered_rect(60, 60, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(" Screening Rules [Esc]close ")
        .title_style(theme::accent_bold());

    let mut lines = Vec::new();
    if app.rules.is_empty() {
        lines.push(Line::from(Span::styled(
            "No rules: every fetched symbol is a candidate.",
            theme::muted(),
        )));
    }

    let counts = app
        .result
        .as_ref()
        .map(|r| (r.report.table.len(), rejection_counts(&r.report.table, &app.rules)));

    for (i, rule) in app.rules.rules().iter().enumerate() {
        let text = format!(
            "{:<20} {:<2} {:>10}",
            rule.field.label(),
            rule.comparator.symbol(),
            view::format_threshold(rule.field, rule.threshold)
        );
        let mut spans = vec![Span::styled(text, theme::text())];
        if let Some((total, counts)) = &counts {
            let rejected = counts.get(i).map_or(0, |(_, n)| *n);
            let style = if rejected > 0 { theme::warning() } else { theme::positive() };
            spans.push(Span::styled(format!("   rejects {rejected}/{total}"), style));
        }
        lines.push(Line::from(spans));
    }

    f.render_widget(Paragraph::new(lines).block(block), popup);
}

pub fn render_help(f: &mut Frame, area: Rect) {
    let popup = centered_rect(50, 60, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(" Keys ")
        .title_style(theme::accent_bold());

    let keys = [
        ("j / k", "move selection"),
        ("g / G", "first / last row"),
        ("Enter", "reload price chart"),
        ("r", "screen (uses cache)"),
        ("R", "refresh, bypassing cache"),
        ("f", "rule breakdown"),
        ("w", "skipped symbols"),
        ("q", "quit"),
    ];
    let lines: Vec<Line> = keys
        .iter()
        .map(|(k, what)| {
            Line::from(vec![
                Span::styled(format!("  {k:<8}"), theme::accent()),
                Span::styled(*what, theme::muted()),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), popup);
}
