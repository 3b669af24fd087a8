//! The pair of workers behind the dispatcher.

use crate::worker::{Analyzer, Worker};
use crate::{linter, tokenizer};
use crossbeam_channel::{Receiver, Sender};
use sandpit_core::{
    AnalysisBackend, AnalysisKind, AnalysisPayload, AnalysisRequest, LintOptions, SessionError,
    WorkerEvent,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Runs the analysis `request.kind` asks for.
pub fn analyze(request: &AnalysisRequest, options: &LintOptions) -> AnalysisPayload {
    match request.kind {
        AnalysisKind::Tokenize => {
            AnalysisPayload::Tokens(tokenizer::tokenize(&request.content, request.content_kind))
        }
        AnalysisKind::Lint => AnalysisPayload::Diagnostics(linter::lint(
            &request.content,
            request.content_kind,
            options,
        )),
    }
}

/// One tokenize worker and one lint worker sharing an event channel.
pub struct WorkerPool {
    analyzers: HashMap<AnalysisKind, Analyzer>,
    workers: HashMap<AnalysisKind, Worker>,
    events_tx: Sender<WorkerEvent>,
    events_rx: Receiver<WorkerEvent>,
}

impl WorkerPool {
    /// Creates a pool running the bundled tokenizer and linter.
    pub fn new(options: LintOptions) -> Self {
        let tokenize: Analyzer = Arc::new(|request: &AnalysisRequest| {
            analyze(request, &LintOptions::default())
        });
        let lint: Analyzer = Arc::new(move |request: &AnalysisRequest| analyze(request, &options));
        Self::with_analyzers(tokenize, lint)
    }

    /// Creates a pool running custom analyzers.
    pub fn with_analyzers(tokenize: Analyzer, lint: Analyzer) -> Self {
        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        let analyzers = HashMap::from([(AnalysisKind::Tokenize, tokenize), (AnalysisKind::Lint, lint)]);
        Self {
            analyzers,
            workers: HashMap::new(),
            events_tx,
            events_rx,
        }
    }

    fn spawn(&mut self, kind: AnalysisKind) {
        let Some(analyzer) = self.analyzers.get(&kind).cloned() else {
            return;
        };
        let worker = Worker::spawn(kind, analyzer, self.events_tx.clone());
        if let Some(mut old) = self.workers.insert(kind, worker) {
            old.shutdown();
        }
    }
}

impl AnalysisBackend for WorkerPool {
    fn start(&mut self) {
        for kind in AnalysisKind::ALL {
            if !self.workers.contains_key(&kind) {
                self.spawn(kind);
            }
        }
    }

    fn stop(&mut self) {
        for (_, mut worker) in self.workers.drain() {
            worker.shutdown();
        }
    }

    fn restart(&mut self, kind: AnalysisKind) {
        if let Some(mut old) = self.workers.remove(&kind) {
            old.shutdown();
        }
        self.spawn(kind);
    }

    fn is_running(&self, kind: AnalysisKind) -> bool {
        self.workers.get(&kind).is_some_and(Worker::is_running)
    }

    fn submit(&mut self, request: AnalysisRequest) -> Result<(), SessionError> {
        let kind = request.kind;
        let worker = self
            .workers
            .get(&kind)
            .ok_or(SessionError::WorkerUnavailable(kind))?;
        worker
            .send(request)
            .map_err(|_| SessionError::WorkerUnavailable(kind))
    }

    fn try_recv(&mut self) -> Option<WorkerEvent> {
        self.events_rx.try_recv().ok()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sandpit_core::{BufferHandle, ContentKind, DocumentId, VersionStamp};

    fn request(kind: AnalysisKind, content: &str, content_kind: ContentKind) -> AnalysisRequest {
        AnalysisRequest {
            kind,
            document: DocumentId::from("m1"),
            content: content.to_string(),
            content_kind,
            version: VersionStamp::initial(BufferHandle::new(1)),
        }
    }

    #[test]
    fn test_analyze_dispatches_by_kind() {
        let options = LintOptions::default();
        let tokens = analyze(&request(AnalysisKind::Tokenize, "let a = 1;", ContentKind::JavaScript), &options);
        assert!(matches!(tokens, AnalysisPayload::Tokens(ref t) if !t.is_empty()));

        let lint = analyze(&request(AnalysisKind::Lint, "let a = 1; ", ContentKind::JavaScript), &options);
        assert!(matches!(lint, AnalysisPayload::Diagnostics(ref d) if d.len() == 1));
    }

    #[test]
    fn test_submit_before_start_is_refused() {
        let mut pool = WorkerPool::new(LintOptions::default());
        let result = pool.submit(request(AnalysisKind::Lint, "", ContentKind::Rust));
        assert!(matches!(result, Err(SessionError::WorkerUnavailable(AnalysisKind::Lint))));
        assert!(!pool.is_running(AnalysisKind::Lint));
    }

    #[test]
    fn test_stop_then_submit_is_refused() {
        let mut pool = WorkerPool::new(LintOptions::default());
        pool.start();
        assert!(pool.is_running(AnalysisKind::Tokenize));
        pool.stop();
        assert!(!pool.is_running(AnalysisKind::Tokenize));
        assert!(pool
            .submit(request(AnalysisKind::Tokenize, "", ContentKind::Rust))
            .is_err());
    }
}
