//! Background worker thread. It owns the screener, and with it the table cache.
//!
//! Communication with the TUI main thread is via `mpsc` channels. Network
//! lookups block, so nothing here ever runs on the render thread.

use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use smallcap_core::data::{Clock, FetchProgress, ProviderError};
use smallcap_core::domain::PriceHistory;
use smallcap_core::{ScreenResult, Screener};

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    /// Fetch (cache permitting) and screen.
    Screen,
    /// Fetch ignoring the cache, then screen.
    Refresh,
    FetchHistory { symbol: String },
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug, Clone)]
pub enum WorkerResponse {
    FetchProgress {
        symbol: String,
        index: usize,
        total: usize,
    },
    FetchSymbolDone {
        symbol: String,
        error: Option<String>,
    },
    Screened {
        result: Box<ScreenResult>,
    },
    History {
        history: PriceHistory,
    },
    HistoryFailed {
        symbol: String,
        error: String,
    },
}

/// Spawn the background worker thread.
pub fn spawn_worker<C>(
    screener: Screener<C>,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) -> JoinHandle<()>
where
    C: Clock + 'static,
{
    thread::Builder::new()
        .name("smallcap-worker".into())
        .spawn(move || worker_loop(screener, rx, tx))
        .expect("failed to spawn worker thread")
}

fn worker_loop<C: Clock>(mut screener: Screener<C>, rx: Receiver<WorkerCommand>, tx: Sender<WorkerResponse>) {
    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(cmd) => handle_command(&mut screener, cmd, &tx),
        }
    }
    tracing::debug!("worker stopped");
}

fn handle_command<C: Clock>(screener: &mut Screener<C>, cmd: WorkerCommand, tx: &Sender<WorkerResponse>) {
    match cmd {
        WorkerCommand::Screen => {
            let progress = ChannelProgress { tx: tx.clone() };
            let result = screener.run(&progress);
            let _ = tx.send(WorkerResponse::Screened {
                result: Box::new(result),
            });
        }
        WorkerCommand::Refresh => {
            let progress = ChannelProgress { tx: tx.clone() };
            let result = screener.refresh(&progress);
            let _ = tx.send(WorkerResponse::Screened {
                result: Box::new(result),
            });
        }
        WorkerCommand::FetchHistory { symbol } => {
            let resp = match screener.price_history(&symbol) {
                Ok(history) => WorkerResponse::History { history },
                Err(e) => {
                    tracing::warn!(symbol = %symbol, error = %e, "price history unavailable");
                    WorkerResponse::HistoryFailed {
                        symbol,
                        error: e.to_string(),
                    }
                }
            };
            let _ = tx.send(resp);
        }
        WorkerCommand::Shutdown => {} // handled in loop
    }
}

/// Forwards orchestrator progress to the TUI.
struct ChannelProgress {
    tx: Sender<WorkerResponse>,
}

impl FetchProgress for ChannelProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        let _ = self.tx.send(WorkerResponse::FetchProgress {
            symbol: symbol.to_string(),
            index,
            total,
        });
    }

    fn on_complete(&self, symbol: &str, _index: usize, _total: usize, error: Option<&ProviderError>) {
        let _ = self.tx.send(WorkerResponse::FetchSymbolDone {
            symbol: symbol.to_string(),
            error: error.map(|e| e.to_string()),
        });
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        tracing::info!(succeeded, failed, total, "fetch batch complete");
    }
}
