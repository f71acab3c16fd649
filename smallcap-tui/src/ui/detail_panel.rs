//! Detail panel: profile, valuation and rule verdicts for the selected symbol.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use smallcap_core::domain::{Field, FinancialRecord};
use smallcap_core::screening::{explain, RuleSet, RuleVerdict};

use crate::app::AppState;
use crate::theme;
use crate::view::{self, NA};

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let record = app.selected_record();
    let title = match record {
        Some(r) => format!(" {} ", r.symbol),
        None => " Detail ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(false))
        .title(title)
        .title_style(theme::panel_title(false));

    let Some(record) = record else {
        let para = Paragraph::new(Span::styled("No symbol selected.", theme::muted())).block(block);
        f.render_widget(para, area);
        return;
    };

    let para = Paragraph::new(detail_lines(record, &app.rules))
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(para, area);
}

fn detail_lines<'a>(record: &'a FinancialRecord, rules: &RuleSet) -> Vec<Line<'a>> {
    let mut lines = vec![
        Line::from(Span::styled(
            record.name.as_deref().unwrap_or(NA),
            theme::accent_bold(),
        )),
        Line::from(vec![
            Span::styled(record.sector.as_deref().unwrap_or(NA), theme::neutral()),
            Span::styled(" / ", theme::muted()),
            Span::styled(record.industry.as_deref().unwrap_or(NA), theme::neutral()),
        ]),
        Line::from(""),
    ];

    for pair in [
        [Field::MarketCap, Field::Revenue],
        [Field::PeRatio, Field::PbRatio],
        [Field::PegRatio, Field::InsiderOwnership],
    ] {
        let mut spans = Vec::new();
        for field in pair {
            spans.push(Span::styled(format!("{}: ", field.label()), theme::muted()));
            spans.push(Span::styled(
                format!("{:<12}", view::format_field(field, record.numeric(field))),
                theme::text(),
            ));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Rules", theme::accent_bold())));
    for (rule, verdict) in explain(record, rules) {
        let mark = match verdict {
            RuleVerdict::Pass { .. } => "pass",
            RuleVerdict::Fail { .. } => "FAIL",
            RuleVerdict::Missing => "n/a ",
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {mark} "), theme::verdict_style(verdict)),
            Span::styled(
                format!(
                    "{} {} {}",
                    rule.field.label(),
                    rule.comparator,
                    view::format_threshold(rule.field, rule.threshold)
                ),
                theme::muted(),
            ),
        ]));
    }

    if let Some(description) = record.description.as_deref() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(description, theme::text())));
    }
    lines
}
