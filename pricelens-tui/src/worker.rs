//! Background worker thread: every fetch and render runs here.
//!
//! The worker owns the provider, the name table, and the session's
//! `FetchCache`, so the cache needs no lock. Communication with the TUI main
//! thread is via `mpsc` channels; each render request carries a generation
//! number so the UI can drop answers that a newer request has superseded.

use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use chrono::Local;
use tracing::{debug, info};

use pricelens_core::dashboard::{render, DashboardInput, DashboardOutput, RenderContext};
use pricelens_core::data::{DataProvider, FetchCache};
use pricelens_core::ticker::NameTable;

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    Render {
        generation: u64,
        input: DashboardInput,
    },
    /// Forget every memoized fetch; the next render refetches.
    ClearCache,
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug)]
pub enum WorkerResponse {
    Rendered {
        generation: u64,
        output: Box<DashboardOutput>,
    },
    CacheCleared,
}

/// Spawn the background worker thread.
pub fn spawn_worker(
    provider: Box<dyn DataProvider>,
    names: NameTable,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("pricelens-worker".into())
        .spawn(move || worker_loop(provider.as_ref(), &names, rx, tx))
}

fn worker_loop(
    provider: &dyn DataProvider,
    names: &NameTable,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) {
    let mut cache = FetchCache::new();
    let mut deferred: Option<WorkerCommand> = None;
    info!(provider = provider.name(), "worker started");

    loop {
        let cmd = match deferred.take() {
            Some(cmd) => cmd,
            None => match rx.recv() {
                Ok(cmd) => cmd,
                Err(_) => break,
            },
        };
        let response = match cmd {
            WorkerCommand::Shutdown => break,
            WorkerCommand::Render { generation, input } => {
                let (generation, input, next) = latest_render(&rx, generation, input);
                deferred = next;
                debug!(generation, "rendering dashboard");
                let output = handle_render(provider, names, &mut cache, &input);
                WorkerResponse::Rendered {
                    generation,
                    output: Box::new(output),
                }
            }
            WorkerCommand::ClearCache => {
                cache.clear();
                WorkerResponse::CacheCleared
            }
        };
        if tx.send(response).is_err() {
            break;
        }
    }
    info!(cached = cache.len(), "worker stopped");
}

/// Skip render requests already superseded in the queue. Draining stops at
/// the first non-render command, which is handed back to run next.
fn latest_render(
    rx: &Receiver<WorkerCommand>,
    generation: u64,
    input: DashboardInput,
) -> (u64, DashboardInput, Option<WorkerCommand>) {
    let (mut generation, mut input) = (generation, input);
    while let Ok(next) = rx.try_recv() {
        match next {
            WorkerCommand::Render {
                generation: g,
                input: i,
            } => {
                generation = g;
                input = i;
            }
            other => return (generation, input, Some(other)),
        }
    }
    (generation, input, None)
}

pub fn handle_render(
    provider: &dyn DataProvider,
    names: &NameTable,
    cache: &mut FetchCache,
    input: &DashboardInput,
) -> DashboardOutput {
    let mut ctx = RenderContext {
        provider,
        cache,
        names,
        today: Local::now().date_naive(),
    };
    render(input, &mut ctx)
}
