//! Analysis dispatch: debounced submission of tokenize and lint requests,
//! and version-checked application of their results.
//!
//! The version stamp carried by every request is the only ordering
//! mechanism. Workers are never cancelled; a result computed against a
//! version the buffer has since moved past is dropped on arrival.

use crate::analysis::{
    AnalysisBackend, AnalysisKind, AnalysisPayload, AnalysisRequest, AnalysisResponse, WorkerEvent,
};
use crate::cache::BufferCache;
use crate::config::SessionConfig;
use crate::debounce::Debouncer;
use crate::error::SessionError;
use crate::event::SessionEvent;
use crate::language::ContentKind;
use crate::version::{BufferHandle, VersionStamp};
use crate::workspace::DocumentId;
use std::collections::{HashMap, HashSet};
use std::time::Instant;

/// Analysis freshness of one document for one pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// No request outstanding.
    Idle,
    /// A request for this version was sent and not yet answered.
    Pending(VersionStamp),
    /// The result for this version arrived while it was current and was applied.
    Applied(VersionStamp),
    /// A result arrived that no longer described the buffer; nothing was shown.
    Superseded,
}

/// The latest edit waiting for the debounce window to close.
#[derive(Debug, Clone)]
struct PendingEdit {
    document: DocumentId,
    content: String,
    content_kind: ContentKind,
    version: VersionStamp,
}

/// Submits analysis work to the backend and filters what comes back.
pub struct AnalysisDispatcher<B: AnalysisBackend> {
    backend: B,
    debouncer: Debouncer<PendingEdit>,
    freshness: HashMap<(DocumentId, AnalysisKind), Freshness>,
    unavailable: HashSet<AnalysisKind>,
    /// Events taken off the backend early, handed out by the next drain.
    backlog: Vec<WorkerEvent>,
    enabled: bool,
    started: bool,
}

impl<B: AnalysisBackend> AnalysisDispatcher<B> {
    pub fn new(backend: B, config: &SessionConfig) -> Self {
        Self {
            backend,
            debouncer: Debouncer::new(config.debounce()),
            freshness: HashMap::new(),
            unavailable: HashSet::new(),
            backlog: Vec::new(),
            enabled: config.analysis_enabled,
            started: false,
        }
    }

    /// Starts both workers. Called once at session start.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.backend.start();
        self.unavailable.clear();
        self.started = true;
        log::info!("Analysis dispatcher started");
    }

    /// Stops both workers. Called once at session teardown.
    pub fn stop(&mut self) {
        if !self.started {
            return;
        }
        self.debouncer.cancel();
        self.freshness.clear();
        self.backlog.clear();
        self.backend.stop();
        self.started = false;
        log::info!("Analysis dispatcher stopped");
    }

    /// Returns true between [`Self::start`] and [`Self::stop`].
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// The backend requests are submitted to.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backend, for hosts that tune it directly.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Records an edit. The request is sent by [`Self::poll_due`] once no
    /// further edit has arrived for the debounce window.
    pub fn on_content_changed(
        &mut self,
        document: &DocumentId,
        content: &str,
        content_kind: ContentKind,
        version: VersionStamp,
        now: Instant,
    ) {
        if !self.enabled || !content_kind.is_analyzable() {
            log::trace!("{}: {} is not analyzed", document, content_kind.name());
            return;
        }

        let edit = PendingEdit {
            document: document.clone(),
            content: content.to_string(),
            content_kind,
            version,
        };
        if let Some(coalesced) = self.debouncer.trigger(edit, now) {
            log::trace!("Coalesced {} @ {}", coalesced.document, coalesced.version);
        }
    }

    /// Sends the debounced edit if its window has closed.
    pub fn poll_due(&mut self, now: Instant) -> Vec<SessionEvent> {
        match self.debouncer.poll(now) {
            Some(edit) => self.dispatch(edit),
            None => Vec::new(),
        }
    }

    /// Sends requests for `document` immediately, bypassing the debounce
    /// window. A debounced edit of the same document is dropped since this
    /// request covers it.
    pub fn dispatch_now(
        &mut self,
        document: &DocumentId,
        content: &str,
        content_kind: ContentKind,
        version: VersionStamp,
    ) -> Vec<SessionEvent> {
        if matches!(self.debouncer.pending(), Some(p) if &p.document == document) {
            self.debouncer.cancel();
        }
        self.dispatch(PendingEdit {
            document: document.clone(),
            content: content.to_string(),
            content_kind,
            version,
        })
    }

    /// Sends a single `kind` of request for `document` immediately. A
    /// debounced edit is left in place for the other kind.
    pub fn dispatch_kind_now(
        &mut self,
        kind: AnalysisKind,
        document: &DocumentId,
        content: &str,
        content_kind: ContentKind,
        version: VersionStamp,
    ) -> Vec<SessionEvent> {
        let edit = PendingEdit {
            document: document.clone(),
            content: content.to_string(),
            content_kind,
            version,
        };
        self.submit_kinds(&edit, &[kind])
    }

    fn dispatch(&mut self, edit: PendingEdit) -> Vec<SessionEvent> {
        self.submit_kinds(&edit, &AnalysisKind::ALL)
    }

    fn submit_kinds(&mut self, edit: &PendingEdit, kinds: &[AnalysisKind]) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if !self.enabled || !edit.content_kind.is_analyzable() {
            return events;
        }

        for &kind in kinds {
            if self.unavailable.contains(&kind) {
                continue;
            }
            let request = AnalysisRequest {
                kind,
                document: edit.document.clone(),
                content: edit.content.clone(),
                content_kind: edit.content_kind,
                version: edit.version,
            };
            match self.backend.submit(request) {
                Ok(()) => {
                    log::debug!("Sent {} request for {} @ {}", kind, edit.document, edit.version);
                    self.freshness
                        .insert((edit.document.clone(), kind), Freshness::Pending(edit.version));
                }
                Err(SessionError::WorkerUnavailable(kind)) => {
                    events.extend(self.on_worker_unavailable(kind));
                }
                Err(e) => log::error!("Failed to submit {} request: {}", kind, e),
            }
        }
        events
    }

    /// Drains every message the workers have produced so far.
    pub fn drain_worker_events(&mut self) -> Vec<WorkerEvent> {
        let mut events = std::mem::take(&mut self.backlog);
        events.extend(std::iter::from_fn(|| self.backend.try_recv()));
        events
    }

    /// Applies a worker result if it still describes the buffer.
    ///
    /// `bound` is the buffer currently shown on the surface; decorations are
    /// only applied to that buffer. Diagnostics are applied to any record.
    pub fn on_worker_result(
        &mut self,
        response: AnalysisResponse,
        cache: &mut BufferCache,
        bound: Option<BufferHandle>,
    ) -> Option<SessionEvent> {
        let key = (response.document.clone(), response.kind);

        let Some(record) = cache.get_mut(&response.document) else {
            log::debug!(
                "Dropped {} result for {} @ {}: buffer disposed",
                response.kind,
                response.document,
                response.version
            );
            self.freshness.remove(&key);
            return None;
        };

        let current = record.version();
        if current != response.version {
            log::debug!(
                "Dropped stale {} result for {}: computed @ {}, buffer @ {}",
                response.kind,
                response.document,
                response.version,
                current
            );
            self.supersede(key, current);
            return None;
        }

        match response.payload {
            AnalysisPayload::Tokens(decorations) => {
                if bound != Some(record.handle()) {
                    log::debug!("Dropped tokens for {}: not on the surface", response.document);
                    self.freshness.insert(key, Freshness::Superseded);
                    return None;
                }
                let count = decorations.len();
                record.replace_decorations(decorations, current);
                self.freshness.insert(key, Freshness::Applied(current));
                Some(SessionEvent::DecorationsUpdated {
                    document: response.document,
                    version: current,
                    count,
                })
            }
            AnalysisPayload::Diagnostics(diagnostics) => {
                let count = record.replace_diagnostics(diagnostics);
                self.freshness.insert(key, Freshness::Applied(current));
                Some(SessionEvent::DiagnosticsUpdated {
                    document: response.document,
                    version: current,
                    count,
                })
            }
        }
    }

    /// A stale arrival does not disturb a request or result for the
    /// current version.
    fn supersede(&mut self, key: (DocumentId, AnalysisKind), current: VersionStamp) {
        let state = self.freshness.entry(key).or_insert(Freshness::Idle);
        if *state != Freshness::Pending(current) && *state != Freshness::Applied(current) {
            *state = Freshness::Superseded;
        }
    }

    /// Marks a worker as gone. Reported once until the worker is restarted.
    pub fn on_worker_unavailable(&mut self, kind: AnalysisKind) -> Option<SessionEvent> {
        if !self.unavailable.insert(kind) {
            return None;
        }
        log::error!("{} worker unavailable; continuing without it", kind);
        Some(SessionEvent::WorkerUnavailable { kind })
    }

    /// Replaces the `kind` worker. An unavailability notice the old worker
    /// left queued is discarded so it cannot mark the new worker as gone;
    /// every other queued event is kept for the next drain.
    pub fn restart_worker(&mut self, kind: AnalysisKind) {
        log::info!("Restarting {} worker", kind);
        self.backend.restart(kind);
        self.unavailable.remove(&kind);

        let leftover = WorkerEvent::Unavailable(kind);
        let queued: Vec<WorkerEvent> = std::iter::from_fn(|| self.backend.try_recv()).collect();
        self.backlog
            .extend(queued.into_iter().filter(|event| event != &leftover));
    }

    /// Returns false while `kind`'s worker is known to be gone.
    pub fn is_available(&self, kind: AnalysisKind) -> bool {
        !self.unavailable.contains(&kind)
    }

    /// Where `kind` analysis of `document` stands; `Idle` if never requested.
    pub fn freshness(&self, document: &DocumentId, kind: AnalysisKind) -> Freshness {
        self.freshness
            .get(&(document.clone(), kind))
            .copied()
            .unwrap_or(Freshness::Idle)
    }

    /// Returns true if an edit is waiting for its debounce window.
    pub fn has_pending_edit(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Drops all state about a disposed document.
    pub fn forget(&mut self, document: &DocumentId) {
        self.freshness.retain(|(d, _), _| d != document);
        if matches!(self.debouncer.pending(), Some(p) if &p.document == document) {
            self.debouncer.cancel();
        }
    }

    /// Drops all per-document state. Workers keep running.
    pub fn reset(&mut self) {
        self.freshness.clear();
        self.debouncer.cancel();
    }
}
