//! Application state. Single-owner, main-thread only.
//!
//! The worker thread owns the screener; this side only holds what the last
//! screen produced and what the user is looking at.

use std::sync::mpsc::{Receiver, Sender};

use smallcap_core::data::FetchWarning;
use smallcap_core::domain::{FinancialRecord, FinancialTable, Lookback, PriceHistory};
use smallcap_core::screening::RuleSet;
use smallcap_core::ScreenResult;

use crate::worker::{WorkerCommand, WorkerResponse};

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Warnings,
    Rules,
    Help,
}

/// Price chart for the selected symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartState {
    Idle,
    Loading(String),
    Loaded(PriceHistory),
    Failed { symbol: String, error: String },
}

/// Progress of the fetch currently running on the worker.
#[derive(Debug, Clone, Default)]
pub struct FetchStatus {
    pub in_progress: bool,
    pub current_symbol: Option<String>,
    pub done: usize,
    pub total: usize,
}

/// Top-level application state.
pub struct AppState {
    pub running: bool,

    pub result: Option<ScreenResult>,
    /// Row index into the candidate table. `None` when there are no candidates.
    pub selected: Option<usize>,
    pub chart: ChartState,
    pub fetch: FetchStatus,

    pub rules: RuleSet,
    pub lookback: Lookback,

    // Worker communication
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,

    // Cross-cutting
    pub status_message: Option<(String, StatusLevel)>,
    pub overlay: Overlay,
    pub warning_scroll: usize,
}

impl AppState {
    pub fn new(
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        rules: RuleSet,
        lookback: Lookback,
    ) -> Self {
        Self {
            running: true,
            result: None,
            selected: None,
            chart: ChartState::Idle,
            fetch: FetchStatus::default(),
            rules,
            lookback,
            worker_tx,
            worker_rx,
            status_message: None,
            overlay: Overlay::None,
            warning_scroll: 0,
        }
    }

    pub fn candidates(&self) -> Option<&FinancialTable> {
        self.result.as_ref().map(|r| &r.candidates)
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates().map_or(0, FinancialTable::len)
    }

    pub fn selected_record(&self) -> Option<&FinancialRecord> {
        self.candidates()?.row(self.selected?)
    }

    pub fn warnings(&self) -> &[FetchWarning] {
        self.result
            .as_ref()
            .map(|r| r.report.warnings.as_slice())
            .unwrap_or_default()
    }

    /// Ask the worker to screen. Ignored while a fetch is running.
    pub fn request_screen(&mut self, refresh: bool) {
        if self.fetch.in_progress {
            return;
        }
        let cmd = if refresh {
            WorkerCommand::Refresh
        } else {
            WorkerCommand::Screen
        };
        if self.worker_tx.send(cmd).is_err() {
            self.set_error("worker is not running");
            return;
        }
        self.fetch = FetchStatus {
            in_progress: true,
            ..FetchStatus::default()
        };
        self.set_status(if refresh { "Refreshing..." } else { "Screening..." });
    }

    /// Ask the worker for the selected symbol's close history.
    pub fn request_history(&mut self) {
        let Some(symbol) = self.selected_record().map(|r| r.symbol.clone()) else {
            return;
        };
        if self.chart == ChartState::Loading(symbol.clone()) {
            return;
        }
        if self
            .worker_tx
            .send(WorkerCommand::FetchHistory { symbol: symbol.clone() })
            .is_err()
        {
            self.set_error("worker is not running");
            return;
        }
        self.chart = ChartState::Loading(symbol);
    }

    pub fn select_next(&mut self) {
        let count = self.candidate_count();
        if let Some(i) = self.selected {
            if i + 1 < count {
                self.select(i + 1);
            }
        }
    }

    pub fn select_prev(&mut self) {
        if let Some(i) = self.selected {
            if i > 0 {
                self.select(i - 1);
            }
        }
    }

    pub fn select_first(&mut self) {
        if self.candidate_count() > 0 {
            self.select(0);
        }
    }

    pub fn select_last(&mut self) {
        let count = self.candidate_count();
        if count > 0 {
            self.select(count - 1);
        }
    }

    /// Move the selection and load the new row's chart.
    fn select(&mut self, index: usize) {
        if self.selected != Some(index) {
            self.selected = Some(index);
            self.chart = ChartState::Idle;
            self.request_history();
        }
    }

    /// Fold one worker response into the state.
    pub fn apply(&mut self, resp: WorkerResponse) {
        match resp {
            WorkerResponse::FetchProgress { symbol, index, total } => {
                self.fetch.current_symbol = Some(symbol);
                self.fetch.done = index;
                self.fetch.total = total;
            }
            WorkerResponse::FetchSymbolDone { .. } => {
                self.fetch.done += 1;
            }
            WorkerResponse::Screened { result } => self.apply_screen(*result),
            WorkerResponse::History { history } => {
                // Drop answers for a row the user has already left.
                if self.chart == ChartState::Loading(history.symbol.clone()) {
                    self.chart = ChartState::Loaded(history);
                }
            }
            WorkerResponse::HistoryFailed { symbol, error } => {
                if self.chart == ChartState::Loading(symbol.clone()) {
                    self.set_warning(format!("No price history for {symbol}"));
                    self.chart = ChartState::Failed { symbol, error };
                }
            }
        }
    }

    fn apply_screen(&mut self, result: ScreenResult) {
        self.fetch = FetchStatus::default();

        let previous = self.selected_record().map(|r| r.symbol.clone());
        let fetched = result.report.table.len();
        let skipped = result.report.warnings.len();
        let candidates = result.candidates.len();
        let cached = result.report.from_cache;

        // Keep the same symbol selected across refreshes when it survives.
        self.selected = match previous.and_then(|s| result.candidates.symbols().iter().position(|c| *c == s)) {
            Some(i) => Some(i),
            None if candidates > 0 => Some(0),
            None => None,
        };
        self.result = Some(result);
        self.warning_scroll = 0;
        self.chart = ChartState::Idle;

        let source = if cached { " (cached)" } else { "" };
        if skipped > 0 {
            self.set_warning(format!(
                "{candidates} of {fetched} passed{source}; {skipped} skipped, press w for details"
            ));
        } else if fetched == 0 {
            self.set_warning("No data fetched");
        } else {
            self.set_status(format!("{candidates} of {fetched} passed{source}"));
        }

        self.request_history();
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Error));
    }
}
