//! Messages exchanged with the background analysis workers, and the seam
//! the dispatcher talks to them through.
//!
//! Workers only ever see immutable snapshots. Each request is answered at
//! most once, in no particular order relative to other requests.

use crate::decoration::{Decoration, Diagnostic};
use crate::error::SessionError;
use crate::language::ContentKind;
use crate::version::VersionStamp;
use crate::workspace::DocumentId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two analysis pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Tokenize,
    Lint,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 2] = [AnalysisKind::Tokenize, AnalysisKind::Lint];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Tokenize => "tokenize",
            Self::Lint => "lint",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A snapshot of one buffer sent to one worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub kind: AnalysisKind,
    pub document: DocumentId,
    pub content: String,
    pub content_kind: ContentKind,
    pub version: VersionStamp,
}

/// What a worker computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "items", rename_all = "lowercase")]
pub enum AnalysisPayload {
    Tokens(Vec<Decoration>),
    Diagnostics(Vec<Diagnostic>),
}

/// A worker's answer, tagged with the version it was computed against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub kind: AnalysisKind,
    pub document: DocumentId,
    pub version: VersionStamp,
    pub payload: AnalysisPayload,
}

/// Messages coming back from the workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    Response(AnalysisResponse),
    /// The worker crashed or terminated and will not answer until restarted.
    Unavailable(AnalysisKind),
}

/// The pair of long-lived analysis workers.
///
/// Workers are started once per session and survive document switches and
/// workspace resets; only [`AnalysisBackend::stop`] and
/// [`AnalysisBackend::restart`] tear them down.
pub trait AnalysisBackend {
    fn start(&mut self);

    fn stop(&mut self);

    /// Replaces the worker of `kind` with a fresh one.
    fn restart(&mut self, kind: AnalysisKind);

    fn is_running(&self, kind: AnalysisKind) -> bool;

    /// Sends a request without waiting for its answer.
    fn submit(&mut self, request: AnalysisRequest) -> Result<(), SessionError>;

    /// Returns the next worker message, if one is ready.
    fn try_recv(&mut self) -> Option<WorkerEvent>;
}
