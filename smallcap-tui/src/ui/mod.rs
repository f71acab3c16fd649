//! Top-level UI layout: candidate table over a detail/chart split, status bar below.

pub mod chart_panel;
pub mod detail_panel;
pub mod overlays;
pub mod status_bar;
pub mod table_panel;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Frame;

use crate::app::{AppState, Overlay};

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    // Split: main area + 1-line status bar.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    let main_area = chunks[0];
    let status_area = chunks[1];

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Min(8)])
        .split(main_area);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[1]);

    table_panel::render(f, rows[0], app);
    detail_panel::render(f, bottom[0], app);
    chart_panel::render(f, bottom[1], app);
    status_bar::render(f, status_area, app);

    // Draw overlays on top.
    match app.overlay {
        Overlay::Warnings => overlays::render_warnings(f, main_area, app),
        Overlay::Rules => overlays::render_rules(f, main_area, app),
        Overlay::Help => overlays::render_help(f, main_area),
        Overlay::None => {}
    }
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::app::{ChartState, Overlay};
    use crate::test_helpers::{history, screen_result};
    use crate::worker::{WorkerCommand, WorkerResponse};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use smallcap_core::domain::Lookback;
    use smallcap_core::screening::RuleSet;
    use std::sync::mpsc;

    /// The command receiver is returned so sends from the app keep succeeding.
    pub(crate) fn app() -> (AppState, mpsc::Receiver<WorkerCommand>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (_resp_tx, resp_rx) = mpsc::channel();
        let app = AppState::new(cmd_tx, resp_rx, RuleSet::small_cap(), Lookback::ThreeMonths);
        (app, cmd_rx)
    }

    /// Render one frame and return the screen as text, one line per row.
    pub(crate) fn render(app: &AppState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn empty_state_renders_placeholders() {
        let (app, _rx) = app();
        let screen = render(&app, 120, 30);
        assert!(screen.contains("Candidates"));
        assert!(screen.contains("Press r to screen"));
    }

    #[test]
    fn full_dashboard_renders() {
        let (mut app, _rx) = app();
        app.apply(WorkerResponse::Screened {
            result: Box::new(screen_result(&["BOOT", "HZO"], &["CCRN"])),
        });
        app.chart = ChartState::Loaded(history("BOOT", Lookback::ThreeMonths, &[10.0, 12.0, 11.0]));

        let screen = render(&app, 140, 40);
        assert!(screen.contains("BOOT Holdings"));
        assert!(screen.contains("HZO"));
        assert!(screen.contains("$500.0M"));
        assert!(screen.contains("Consumer Cyclical"));
        assert!(screen.contains("1 skipped"));
    }

    #[test]
    fn overlays_draw_over_dashboard() {
        let (mut app, _rx) = app();
        app.apply(WorkerResponse::Screened {
            result: Box::new(screen_result(&["BOOT"], &["CCRN"])),
        });

        app.overlay = Overlay::Warnings;
        assert!(render(&app, 120, 30).contains("Error fetching data for CCRN"));

        app.overlay = Overlay::Rules;
        let screen = render(&app, 120, 30);
        assert!(screen.contains("Screening Rules"));
        assert!(screen.contains("rejects 0/1"));

        app.overlay = Overlay::Help;
        assert!(render(&app, 120, 30).contains("Keys"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let (mut app, _rx) = app();
        app.apply(WorkerResponse::Screened {
            result: Box::new(screen_result(&["BOOT"], &[])),
        });
        render(&app, 20, 6);
    }
}
