//! Bottom status bar: fetch progress, last status message, key hints.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, StatusLevel};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans: Vec<Span> = Vec::new();

    spans.push(Span::styled(" r:screen R:refresh f:rules w:warnings ?:help q:quit", theme::muted()));
    spans.push(Span::raw(" | "));

    if app.fetch.in_progress && app.fetch.total > 0 {
        spans.push(Span::styled(
            format!("[{}/{}] ", app.fetch.done, app.fetch.total),
            theme::accent(),
        ));
    }

    if let Some((msg, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => theme::accent(),
            StatusLevel::Warning => theme::warning(),
            StatusLevel::Error => theme::negative(),
        };
        spans.push(Span::styled(msg.as_str(), style));
    }

    if let Some(r) = &app.result {
        spans.push(Span::styled(
            format!("  fetched {}", r.report.fetched_at.format("%H:%M:%S")),
            theme::muted(),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
