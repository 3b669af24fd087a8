//! Scripted collaborators for unit tests.

use crate::analysis::{
    AnalysisBackend, AnalysisKind, AnalysisPayload, AnalysisRequest, AnalysisResponse, WorkerEvent,
};
use crate::decoration::{Decoration, Diagnostic, Severity, TokenClass};
use crate::error::SessionError;
use crate::surface::{EditSurface, Position};
use crate::version::BufferHandle;
use std::collections::{HashSet, VecDeque};

/// Backend that records requests and hands out whatever the test queues.
#[derive(Debug, Default)]
pub struct ManualBackend {
    pub submitted: Vec<AnalysisRequest>,
    pub inbox: VecDeque<WorkerEvent>,
    /// Kinds whose worker refuses requests as if it had died.
    pub refuse: HashSet<AnalysisKind>,
    pub restarts: Vec<AnalysisKind>,
    pub starts: usize,
    pub stops: usize,
}

impl ManualBackend {
    pub fn requests(&self, kind: AnalysisKind) -> Vec<&AnalysisRequest> {
        self.submitted.iter().filter(|r| r.kind == kind).collect()
    }

    /// A canned answer: one keyword decoration or one error on line 1.
    pub fn answer(request: &AnalysisRequest) -> AnalysisResponse {
        let payload = match request.kind {
            AnalysisKind::Tokenize => {
                AnalysisPayload::Tokens(vec![Decoration::new(0, 0, 1, TokenClass::Keyword)])
            }
            AnalysisKind::Lint => AnalysisPayload::Diagnostics(vec![Diagnostic::new(
                1,
                1,
                1,
                2,
                Severity::Error,
                "canned",
            )]),
        };
        AnalysisResponse {
            kind: request.kind,
            document: request.document.clone(),
            version: request.version,
            payload,
        }
    }

    /// Queues answers to every request submitted so far.
    pub fn answer_all(&mut self) {
        let answers: Vec<_> = self
            .submitted
            .drain(..)
            .map(|r| WorkerEvent::Response(Self::answer(&r)))
            .collect();
        self.inbox.extend(answers);
    }
}

impl AnalysisBackend for ManualBackend {
    fn start(&mut self) {
        self.starts += 1;
    }

    fn stop(&mut self) {
        self.stops += 1;
    }

    fn restart(&mut self, kind: AnalysisKind) {
        self.restarts.push(kind);
    }

    fn is_running(&self, kind: AnalysisKind) -> bool {
        self.starts > self.stops && !self.refuse.contains(&kind)
    }

    fn submit(&mut self, request: AnalysisRequest) -> Result<(), SessionError> {
        if self.refuse.contains(&request.kind) {
            return Err(SessionError::WorkerUnavailable(request.kind));
        }
        self.submitted.push(request);
        Ok(())
    }

    fn try_recv(&mut self) -> Option<WorkerEvent> {
        self.inbox.pop_front()
    }
}

/// Calls made on a [`RecordingSurface`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    Bind(BufferHandle),
    Unbind,
    Replace,
    Decorate(BufferHandle, usize),
}

/// Surface that remembers what it was told.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub bound: Option<BufferHandle>,
    pub text: String,
    pub position: Position,
    pub decorations: Vec<Decoration>,
    pub calls: Vec<SurfaceCall>,
}

impl EditSurface for RecordingSurface {
    fn bind(&mut self, handle: BufferHandle, text: &str) {
        self.bound = Some(handle);
        self.text = text.to_string();
        self.position = Position::default();
        self.decorations.clear();
        self.calls.push(SurfaceCall::Bind(handle));
    }

    fn unbind(&mut self) {
        self.bound = None;
        self.text.clear();
        self.decorations.clear();
        self.calls.push(SurfaceCall::Unbind);
    }

    fn bound(&self) -> Option<BufferHandle> {
        self.bound
    }

    fn current_position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, pos: Position) {
        self.position = pos;
    }

    fn replace_full_content(&mut self, text: &str) {
        self.text = text.to_string();
        self.calls.push(SurfaceCall::Replace);
    }

    fn set_decorations(&mut self, handle: BufferHandle, decorations: &[Decoration]) {
        assert_eq!(self.bound, Some(handle), "decorated a buffer that is not bound");
        self.decorations = decorations.to_vec();
        self.calls.push(SurfaceCall::Decorate(handle, decorations.len()));
    }
}
