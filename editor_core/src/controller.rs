//! Active document controller: binds one cached buffer to the visible
//! surface and keeps that binding valid across navigation, external path
//! changes and workspace resets.
//!
//! This is the entry point the host calls. All methods run on the main
//! loop; nothing here blocks.

use crate::analysis::{AnalysisBackend, AnalysisKind, WorkerEvent};
use crate::cache::{BufferCache, ReconcileReport};
use crate::dispatcher::AnalysisDispatcher;
use crate::error::{SessionError, SessionResult};
use crate::event::SessionEvent;
use crate::record::BufferRecord;
use crate::surface::{EditSurface, FormatOptions, Formatter, SaveSink};
use crate::version::{BufferHandle, VersionStamp};
use crate::workspace::{Directory, DocumentId, Module};
use std::time::Instant;

/// The buffer currently shown on the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveBinding {
    pub document: DocumentId,
    pub handle: BufferHandle,
}

/// Runs before each record is released: unbinds the surface if it shows
/// that record, and remembers the document so its analysis state can be
/// dropped afterwards.
struct ReleaseGuard<'a, S: EditSurface> {
    surface: &'a mut S,
    binding: &'a mut Option<ActiveBinding>,
    released: Vec<DocumentId>,
}

impl<'a, S: EditSurface> ReleaseGuard<'a, S> {
    fn new(surface: &'a mut S, binding: &'a mut Option<ActiveBinding>) -> Self {
        Self {
            surface,
            binding,
            released: Vec::new(),
        }
    }

    fn before_dispose(&mut self, record: &BufferRecord) {
        if self.binding.as_ref().map(|b| b.handle) == Some(record.handle()) {
            log::debug!("Unbinding {} before release", record.document());
            self.surface.unbind();
            *self.binding = None;
        }
        self.released.push(record.document().clone());
    }
}

pub struct ActiveDocumentController<S: EditSurface, B: AnalysisBackend> {
    cache: BufferCache,
    dispatcher: AnalysisDispatcher<B>,
    surface: S,
    binding: Option<ActiveBinding>,
    modules: Vec<Module>,
    directories: Vec<Directory>,
    events: Vec<SessionEvent>,
}

impl<S: EditSurface, B: AnalysisBackend> ActiveDocumentController<S, B> {
    pub fn new(cache: BufferCache, dispatcher: AnalysisDispatcher<B>, surface: S) -> Self {
        Self {
            cache,
            dispatcher,
            surface,
            binding: None,
            modules: Vec::new(),
            directories: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Starts the analysis workers. Called once at session start.
    pub fn start(&mut self) {
        self.dispatcher.start();
    }

    /// Releases every buffer and stops the workers.
    pub fn shutdown(&mut self) {
        let mut guard = ReleaseGuard::new(&mut self.surface, &mut self.binding);
        let count = self
            .cache
            .dispose_all(&mut |r: &BufferRecord| guard.before_dispose(r));
        self.dispatcher.stop();
        log::info!("Session shut down, released {} buffers", count);
    }

    /// The document shown on the surface, if any.
    pub fn active_document(&self) -> Option<&DocumentId> {
        self.binding.as_ref().map(|b| &b.document)
    }

    pub fn binding(&self) -> Option<&ActiveBinding> {
        self.binding.as_ref()
    }

    pub fn cache(&self) -> &BufferCache {
        &self.cache
    }

    pub fn dispatcher(&self) -> &AnalysisDispatcher<B> {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut AnalysisDispatcher<B> {
        &mut self.dispatcher
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The module set last handed in, with edited code.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Discards every buffer and recreates them for a new workspace.
    ///
    /// Nothing is bound afterwards; the host activates a document once the
    /// surface has settled.
    pub fn reset_workspace(
        &mut self,
        modules: Vec<Module>,
        directories: Vec<Directory>,
    ) -> ReconcileReport {
        log::info!("Resetting workspace ({} modules)", modules.len());

        let mut guard = ReleaseGuard::new(&mut self.surface, &mut self.binding);
        self.cache
            .dispose_all(&mut |r: &BufferRecord| guard.before_dispose(r));
        self.dispatcher.reset();

        self.modules = modules;
        self.directories = directories;
        // The cache is empty, so nothing can be disposed here.
        self.cache
            .reconcile(&self.modules, &self.directories, &mut |_: &BufferRecord| {})
    }

    /// Shows `document` on the surface, creating its buffer if needed, and
    /// requests fresh analysis for it.
    pub fn activate(&mut self, document: &DocumentId) -> SessionResult<()> {
        if self.active_document() == Some(document) {
            return Ok(());
        }

        if !self.cache.contains(document) {
            let module = self
                .modules
                .iter()
                .find(|m| &m.id == document)
                .ok_or_else(|| SessionError::UnknownDocument(document.clone()))?;
            let mut guard = ReleaseGuard::new(&mut self.surface, &mut self.binding);
            self.cache.ensure_module(
                module,
                &self.modules,
                &self.directories,
                &mut |r: &BufferRecord| guard.before_dispose(r),
            )?;
        }

        if let Some(previous) = self.binding.take() {
            log::debug!("Unbinding {}", previous.document);
            self.surface.unbind();
        }
        self.bind(document)
    }

    fn bind(&mut self, document: &DocumentId) -> SessionResult<()> {
        let record = self
            .cache
            .get(document)
            .ok_or_else(|| SessionError::UnknownDocument(document.clone()))?;
        let handle = record.handle();
        let text = record.text();

        self.surface.bind(handle, &text);
        if let Some(decorations) = record.current_decorations() {
            self.surface.set_decorations(handle, decorations);
        }
        self.binding = Some(ActiveBinding {
            document: document.clone(),
            handle,
        });
        log::debug!("Bound {} ({})", document, handle);

        let (kind, version) = (record.kind(), record.version());
        let events = self.dispatcher.dispatch_now(document, &text, kind, version);
        self.events.extend(events);
        Ok(())
    }

    /// Reconciles the cache with a changed file tree. If the active buffer
    /// was replaced because its path changed, the surface is rebound to the
    /// replacement with the cursor where it was.
    ///
    /// The tree only supplies paths: a replacement record starts from the
    /// text its predecessor held, not from the code in `modules`.
    pub fn apply_external_path_changes(
        &mut self,
        mut modules: Vec<Module>,
        directories: Vec<Directory>,
    ) -> ReconcileReport {
        let previous = self.binding.clone();
        let position = self.surface.current_position();
        for module in &mut modules {
            if let Some(record) = self.cache.get(&module.id) {
                module.code = record.text();
            }
        }
        self.modules = modules;
        self.directories = directories;

        let mut guard = ReleaseGuard::new(&mut self.surface, &mut self.binding);
        let report = self.cache.reconcile(
            &self.modules,
            &self.directories,
            &mut |r: &BufferRecord| guard.before_dispose(r),
        );
        for document in guard.released {
            self.dispatcher.forget(&document);
        }

        if let Some(previous) = previous {
            if self.binding.is_none() && self.cache.contains(&previous.document) {
                log::info!("Rebinding {} after path change", previous.document);
                if let Err(e) = self.bind(&previous.document) {
                    log::error!("Failed to rebind {}: {}", previous.document, e);
                } else if let Some(record) = self.cache.get(&previous.document) {
                    self.surface
                        .set_position(record.buffer().clamp_position(position));
                }
            }
        }

        report
    }

    /// Records new content for `document` and schedules analysis for it.
    pub fn on_content_changed(
        &mut self,
        document: &DocumentId,
        content: &str,
        now: Instant,
    ) -> SessionResult<VersionStamp> {
        let record = self
            .cache
            .get_mut(document)
            .ok_or_else(|| SessionError::UnknownDocument(document.clone()))?;
        let version = record.set_content(content);
        self.dispatcher
            .on_content_changed(document, content, record.kind(), version, now);
        self.sync_module(document, content);
        Ok(version)
    }

    /// Keeps the module snapshot in step with the buffer, so a record built
    /// later for `document` starts from the edited text.
    fn sync_module(&mut self, document: &DocumentId, content: &str) {
        if let Some(module) = self.modules.iter_mut().find(|m| &m.id == document) {
            module.code = content.to_string();
        }
    }

    /// Records an edit made on the surface to the active document.
    pub fn edit_active(&mut self, content: &str, now: Instant) -> SessionResult<VersionStamp> {
        let document = self
            .active_document()
            .cloned()
            .ok_or(SessionError::NoActiveDocument)?;
        self.on_content_changed(&document, content, now)
    }

    /// Runs one main-loop step: sends due requests, applies worker results
    /// and returns the notifications produced since the last call.
    pub fn poll(&mut self, now: Instant) -> Vec<SessionEvent> {
        let due = self.dispatcher.poll_due(now);
        self.events.extend(due);

        for message in self.dispatcher.drain_worker_events() {
            match message {
                WorkerEvent::Response(response) => {
                    let bound = self.binding.as_ref().map(|b| b.handle);
                    let applied = self
                        .dispatcher
                        .on_worker_result(response, &mut self.cache, bound);
                    if let Some(event) = applied {
                        if let SessionEvent::DecorationsUpdated { document, .. } = &event {
                            self.paint(document);
                        }
                        self.events.push(event);
                    }
                }
                WorkerEvent::Unavailable(kind) => {
                    let event = self.dispatcher.on_worker_unavailable(kind);
                    self.events.extend(event);
                }
            }
        }

        self.drain_events()
    }

    /// Returns the notifications queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    fn paint(&mut self, document: &DocumentId) {
        let Some(binding) = &self.binding else {
            return;
        };
        if &binding.document != document {
            return;
        }
        if let Some(record) = self.cache.get(document) {
            self.surface.set_decorations(binding.handle, record.decorations());
        }
    }

    /// Formats the active buffer in place, keeping the cursor where it was
    /// as far as the new text allows.
    pub fn format_active(
        &mut self,
        formatter: &dyn Formatter,
        options: &FormatOptions,
    ) -> SessionResult<VersionStamp> {
        let document = self
            .active_document()
            .cloned()
            .ok_or(SessionError::NoActiveDocument)?;
        let record = self
            .cache
            .get_mut(&document)
            .ok_or_else(|| SessionError::UnknownDocument(document.clone()))?;

        let formatted = formatter
            .format(&record.text(), record.kind(), options)
            .map_err(SessionError::Format)?;
        if record.buffer().eq_str(&formatted) {
            return Ok(record.version());
        }

        let position = self.surface.current_position();
        let version = record.set_content(&formatted);
        self.surface.replace_full_content(&formatted);
        self.surface
            .set_position(record.buffer().clamp_position(position));

        let kind = record.kind();
        let events = self
            .dispatcher
            .dispatch_now(&document, &formatted, kind, version);
        self.events.extend(events);
        self.sync_module(&document, &formatted);
        Ok(version)
    }

    /// Hands the active buffer's text to `sink`.
    pub fn save_active(&mut self, sink: &mut dyn SaveSink) -> SessionResult<()> {
        let document = self
            .active_document()
            .cloned()
            .ok_or(SessionError::NoActiveDocument)?;
        let record = self
            .cache
            .get(&document)
            .ok_or_else(|| SessionError::UnknownDocument(document.clone()))?;
        sink.save(&document, record.path(), &record.text())
            .map_err(SessionError::Save)
    }

    /// Restarts a worker after it became unavailable and resends the active
    /// document to it so feedback resumes.
    pub fn restart_worker(&mut self, kind: AnalysisKind) {
        self.dispatcher.restart_worker(kind);
        let Some(binding) = &self.binding else {
            return;
        };
        if let Some(record) = self.cache.get(&binding.document) {
            let events = self.dispatcher.dispatch_kind_now(
                kind,
                &binding.document,
                &record.text(),
                record.kind(),
                record.version(),
            );
            self.events.extend(events);
        }
    }
}
