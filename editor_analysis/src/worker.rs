//! A single analysis worker.
//!
//! Each worker owns an OS thread running a single-threaded tokio runtime.
//! Requests arrive over an unbounded tokio channel; each one is analyzed on
//! the blocking pool, so a slow request does not hold back the ones behind
//! it and answers may come back in any order. Answers and the final
//! unavailability notice go out over a crossbeam channel that the main loop
//! polls without blocking.

use crossbeam_channel::Sender;
use sandpit_core::{AnalysisKind, AnalysisPayload, AnalysisRequest, AnalysisResponse, WorkerEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// The computation a worker runs for each request.
pub type Analyzer = Arc<dyn Fn(&AnalysisRequest) -> AnalysisPayload + Send + Sync>;

/// Handle to a running worker thread.
pub struct Worker {
    kind: AnalysisKind,
    request_tx: Option<mpsc::UnboundedSender<AnalysisRequest>>,
    /// Cleared when the worker stops, on request or because it failed.
    running: Arc<AtomicBool>,
    /// Set before an intentional stop so the thread exits quietly.
    stopping: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawns a worker thread for `kind`.
    pub fn spawn(kind: AnalysisKind, analyzer: Analyzer, events: Sender<WorkerEvent>) -> Self {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let running = Arc::new(AtomicBool::new(true));
        let stopping = Arc::new(AtomicBool::new(false));

        let thread_running = running.clone();
        let thread_stopping = stopping.clone();
        let spawned = thread::Builder::new()
            .name(format!("sandpit-{}", kind))
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread().build() {
                    Ok(rt) => rt,
                    Err(e) => {
                        log::error!("Failed to create {} worker runtime: {}", kind, e);
                        thread_running.store(false, Ordering::SeqCst);
                        let _ = events.send(WorkerEvent::Unavailable(kind));
                        return;
                    }
                };

                let failed = runtime.block_on(run_worker(kind, analyzer, request_rx, events.clone()));
                runtime.shutdown_background();

                thread_running.store(false, Ordering::SeqCst);
                if failed || !thread_stopping.load(Ordering::SeqCst) {
                    log::error!("{} worker terminated", kind);
                    let _ = events.send(WorkerEvent::Unavailable(kind));
                } else {
                    log::debug!("{} worker stopped", kind);
                }
            });

        let thread = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("Failed to spawn {} worker thread: {}", kind, e);
                running.store(false, Ordering::SeqCst);
                None
            }
        };

        log::info!("Started {} worker", kind);
        Self {
            kind,
            request_tx: Some(request_tx),
            running,
            stopping,
            thread,
        }
    }

    pub fn kind(&self) -> AnalysisKind {
        self.kind
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Queues a request. Fails if the worker is gone.
    pub fn send(&self, request: AnalysisRequest) -> Result<(), AnalysisRequest> {
        if !self.is_running() {
            return Err(request);
        }
        match &self.request_tx {
            Some(tx) => tx.send(request).map_err(|e| e.0),
            None => Err(request),
        }
    }

    /// Stops the worker. Requests still being analyzed are abandoned.
    pub fn shutdown(&mut self) {
        self.stopping.store(true, Ordering::SeqCst);
        // Closing the request channel ends the worker loop.
        self.request_tx = None;
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("{} worker thread panicked", self.kind);
            }
        }
        self.running.store(false, Ordering::SeqCst);
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Runs the worker loop until the request channel closes or an analysis
/// task fails. Returns true on failure.
async fn run_worker(
    kind: AnalysisKind,
    analyzer: Analyzer,
    mut requests: mpsc::UnboundedReceiver<AnalysisRequest>,
    events: Sender<WorkerEvent>,
) -> bool {
    let mut tasks: JoinSet<AnalysisResponse> = JoinSet::new();

    loop {
        tokio::select! {
            request = requests.recv() => {
                let Some(request) = request else {
                    return false;
                };
                log::trace!("{} worker got {} @ {}", kind, request.document, request.version);
                let analyzer = analyzer.clone();
                tasks.spawn_blocking(move || {
                    let payload = analyzer(&request);
                    AnalysisResponse {
                        kind: request.kind,
                        document: request.document,
                        version: request.version,
                        payload,
                    }
                });
            }
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                match joined {
                    Ok(response) => {
                        if events.send(WorkerEvent::Response(response)).is_err() {
                            // Nobody is listening any more.
                            return false;
                        }
                    }
                    Err(e) => {
                        log::error!("{} analysis task failed: {}", kind, e);
                        return true;
                    }
                }
            }
        }
    }
}
