//! Small-cap screener dashboard.
//!
//! Panels:
//! 1. Candidates: symbols that passed every rule
//! 2. Detail: profile, valuation and rule verdicts for the selection
//! 3. Chart: close prices over the configured lookback
//!
//! Overlays list skipped symbols (`w`), rule rejections (`f`) and keys (`?`).

mod app;
mod input;
mod theme;
mod ui;
mod view;
mod worker;

#[cfg(test)]
mod test_helpers;

use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use smallcap_core::logging::{init_logging, LogConfig};
use smallcap_core::{Screener, ScreenerConfig};

use crate::app::AppState;
use crate::worker::WorkerCommand;

fn main() -> Result<()> {
    // Restore the terminal before printing a panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let config = ScreenerConfig::load().context("load screener config")?;

    // The UI owns the terminal, so logs always go to a file.
    let mut log_config = LogConfig::from_env();
    if log_config.file.is_none() {
        let path = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("smallcap")
            .join("smallcap.log");
        log_config = log_config.with_file(path);
    }
    init_logging(log_config).context("initialize logging")?;

    tracing::info!(
        symbols = config.symbols.len(),
        ttl_secs = config.cache_ttl_secs,
        "starting screener"
    );

    let screener = Screener::from_config(&config);

    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let worker_handle = worker::spawn_worker(screener, cmd_rx, resp_tx);

    let mut app = AppState::new(
        cmd_tx.clone(),
        resp_rx,
        config.rule_set(),
        config.provider.history_lookback,
    );
    app.request_screen(false);

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("screener exited");
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Drain worker responses (non-blocking)
        while let Ok(resp) = app.worker_rx.try_recv() {
            app.apply(resp);
        }

        // 3. Poll for input events (50ms tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        // 4. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}
