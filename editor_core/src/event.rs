//! Notifications the core emits for the host to render.

use crate::analysis::AnalysisKind;
use crate::version::VersionStamp;
use crate::workspace::DocumentId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A fresh decoration set was applied to the bound buffer.
    DecorationsUpdated {
        document: DocumentId,
        version: VersionStamp,
        count: usize,
    },
    /// A fresh diagnostic set was attached to a buffer.
    DiagnosticsUpdated {
        document: DocumentId,
        version: VersionStamp,
        count: usize,
    },
    /// Editing continues without feedback from this pipeline until the
    /// worker is restarted.
    WorkerUnavailable { kind: AnalysisKind },
}
