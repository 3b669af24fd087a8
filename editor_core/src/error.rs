//! Error types.

use crate::analysis::AnalysisKind;
use crate::workspace::{DirectoryId, DocumentId};
use thiserror::Error;

/// Failure to derive a module's logical path from the workspace tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("module {0} is not in the workspace")]
    ModuleNotFound(DocumentId),

    #[error("module {0} appears more than once in the workspace")]
    AmbiguousModule(DocumentId),

    #[error("directory {directory} containing module {module} does not exist")]
    MissingDirectory {
        module: DocumentId,
        directory: DirectoryId,
    },

    #[error("directory {0} is its own ancestor")]
    DirectoryCycle(DirectoryId),
}

/// Failures surfaced to the host.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Path resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("{0} worker unavailable")]
    WorkerUnavailable(AnalysisKind),

    #[error("Unknown document: {0}")]
    UnknownDocument(DocumentId),

    #[error("No active document")]
    NoActiveDocument,

    #[error("Format failed: {0}")]
    Format(String),

    #[error("Save failed: {0}")]
    Save(String),
}

pub type SessionResult<T> = Result<T, SessionError>;
