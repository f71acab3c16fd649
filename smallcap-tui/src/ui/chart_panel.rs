//! Close-price line chart for the selected symbol.

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap};
use ratatui::Frame;

use smallcap_core::domain::PriceHistory;

use crate::app::{AppState, ChartState};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(false))
        .title(format!(" Price ({}) ", app.lookback.label()))
        .title_style(theme::panel_title(false));

    match &app.chart {
        ChartState::Loaded(history) if !history.is_empty() => render_chart(f, area, block, history),
        ChartState::Loaded(history) => {
            render_message(f, area, block, format!("No closes for {}.", history.symbol), theme::muted())
        }
        ChartState::Loading(symbol) => {
            render_message(f, area, block, format!("Loading {symbol}..."), theme::accent())
        }
        ChartState::Failed { symbol, error } => {
            render_message(f, area, block, format!("{symbol}: {error}"), theme::negative())
        }
        ChartState::Idle if app.selected.is_some() => {
            render_message(f, area, block, "Press Enter to load the chart.".into(), theme::muted())
        }
        ChartState::Idle => render_message(f, area, block, String::new(), theme::muted()),
    }
}

fn render_message(f: &mut Frame, area: Rect, block: Block, text: String, style: Style) {
    let para = Paragraph::new(vec![Line::from(""), Line::from(Span::styled(text, style))])
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(para, area);
}

fn render_chart(f: &mut Frame, area: Rect, block: Block, history: &PriceHistory) {
    let Some((lo, hi)) = history.close_range() else {
        return;
    };
    let padding = ((hi - lo).abs() * 0.05).max(0.01);
    let y_min = lo - padding;
    let y_max = hi + padding;
    let x_max = history.points.len().saturating_sub(1) as f64;

    let data: Vec<(f64, f64)> = history
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.close))
        .collect();

    let change = history.change().unwrap_or(0.0);
    let label = format!("{} {:+.1}%", history.symbol, change * 100.0);

    let dataset = Dataset::default()
        .name(label)
        .marker(symbols::Marker::Braille)
        .style(theme::change_style(change))
        .graph_type(GraphType::Line)
        .data(&data);

    let first = history
        .first_date()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    let last = history
        .last_date()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([0.0, x_max.max(1.0)])
                .labels(vec![Span::styled(first, theme::muted()), Span::styled(last, theme::muted())]),
        )
        .y_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::styled(format!("{lo:.2}"), theme::muted()),
                    Span::styled(format!("{hi:.2}"), theme::muted()),
                ]),
        );

    f.render_widget(chart, area);
}
