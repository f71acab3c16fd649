//! Candidate table: one row per symbol that passed every rule.

use ratatui::layout::{Constraint, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;
use crate::view::{self, ColumnKind, COLUMNS};

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let title = match &app.result {
        Some(r) => format!(
            " Candidates ({} of {}) ",
            r.candidates.len(),
            r.report.table.len()
        ),
        None => " Candidates ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(title)
        .title_style(theme::panel_title(true));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(candidates) = app.candidates() else {
        render_placeholder(f, inner, app);
        return;
    };

    if candidates.is_empty() {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "No symbols passed the screen.",
                theme::warning(),
            )),
            Line::from(Span::styled(
                "Press f to see which rules rejected them, w for skipped symbols.",
                theme::muted(),
            )),
        ];
        f.render_widget(Paragraph::new(lines), inner);
        return;
    }

    let header = Row::new(COLUMNS.iter().map(|c| Cell::from(c.header))).style(theme::accent_bold());

    let rows = candidates.iter().map(|record| {
        Row::new(COLUMNS.iter().map(|column| {
            let text = view::truncate(&view::cell(record, column), column.width as usize);
            let style = match column.kind {
                ColumnKind::Symbol => theme::accent(),
                ColumnKind::Metric(field) if record.numeric(field).is_none() => theme::warning(),
                _ => theme::text(),
            };
            Cell::from(text).style(style)
        }))
    });

    let widths: Vec<Constraint> = COLUMNS.iter().map(|c| Constraint::Length(c.width)).collect();
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .row_highlight_style(theme::selected_row());

    let mut state = TableState::default().with_selected(app.selected);
    f.render_stateful_widget(table, inner, &mut state);
}

fn render_placeholder(f: &mut Frame, area: Rect, app: &AppState) {
    let line = if app.fetch.in_progress {
        let symbol = app.fetch.current_symbol.as_deref().unwrap_or("...");
        Line::from(Span::styled(
            format!("Fetching {symbol} ({}/{})", app.fetch.done, app.fetch.total),
            theme::accent(),
        ))
    } else {
        Line::from(Span::styled("Press r to screen the symbol list.", theme::muted()))
    };
    f.render_widget(Paragraph::new(vec![Line::from(""), line]), area);
}
