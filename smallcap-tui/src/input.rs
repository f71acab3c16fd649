//! Keyboard input dispatch: overlays first, then global keys.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::{AppState, Overlay};

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    match app.overlay {
        Overlay::Warnings => {
            handle_warnings_overlay(app, key);
            return;
        }
        Overlay::Rules | Overlay::Help => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q' | '?' | 'f')) {
                app.overlay = Overlay::None;
            }
            return;
        }
        Overlay::None => {}
    }

    // 2. Dashboard keys.
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.running = false,
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Char('g') | KeyCode::Home => app.select_first(),
        KeyCode::Char('G') | KeyCode::End => app.select_last(),
        KeyCode::Enter => app.request_history(),
        KeyCode::Char('r') => app.request_screen(false),
        KeyCode::Char('R') => app.request_screen(true),
        KeyCode::Char('w') => {
            app.overlay = Overlay::Warnings;
            app.warning_scroll = 0;
        }
        KeyCode::Char('f') => app.overlay = Overlay::Rules,
        KeyCode::Char('?') => app.overlay = Overlay::Help,
        _ => {}
    }
}

fn handle_warnings_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('w') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.warning_scroll + 1 < app.warnings().len() {
                app.warning_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.warning_scroll = app.warning_scroll.saturating_sub(1);
        }
        _ => {}
    }
}
