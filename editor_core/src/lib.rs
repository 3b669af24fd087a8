//! Sandpit Core - buffer lifecycle and analysis coordination.
//!
//! This crate owns the per-document text buffers of a multi-file sandbox,
//! keeps one of them bound to the visible editing surface, and coordinates
//! debounced background analysis against versioned buffer snapshots. It has
//! no dependency on any UI toolkit or worker implementation; both plug in
//! through the traits in [`surface`] and [`analysis`].

pub mod analysis;
pub mod buffer;
pub mod cache;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod decoration;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod language;
pub mod record;
pub mod resolver;
pub mod surface;
pub mod version;
pub mod workspace;

#[cfg(test)]
mod testing;

pub use analysis::{
    AnalysisBackend, AnalysisKind, AnalysisPayload, AnalysisRequest, AnalysisResponse, WorkerEvent,
};
pub use buffer::TextBuffer;
pub use cache::{BufferCache, CacheStats, Ensured, ReconcileReport};
pub use config::{LintOptions, SessionConfig};
pub use controller::{ActiveBinding, ActiveDocumentController};
pub use debounce::Debouncer;
pub use decoration::{Decoration, Diagnostic, Severity, TokenClass};
pub use dispatcher::{AnalysisDispatcher, Freshness};
pub use error::{ResolutionError, SessionError, SessionResult};
pub use event::SessionEvent;
pub use language::ContentKind;
pub use record::BufferRecord;
pub use resolver::{PathResolver, TreeResolver};
pub use surface::{EditSurface, FormatOptions, Formatter, Position, SaveSink};
pub use version::{BufferHandle, VersionStamp};
pub use workspace::{Directory, DirectoryId, DocumentId, Module};
