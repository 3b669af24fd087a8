//! Buffer cache: one record per document, reconciled against the external
//! workspace tree.

use crate::error::ResolutionError;
use crate::record::BufferRecord;
use crate::resolver::{PathResolver, TreeResolver};
use crate::version::BufferHandle;
use crate::workspace::{Directory, DocumentId, Module};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// Lifetime counters of a cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub created: usize,
    pub disposed: usize,
}

/// What [`BufferCache::ensure`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ensured {
    /// The cached record was current and returned as is.
    Existing,
    /// No record existed; a new one was created.
    Created,
    /// The cached record had a stale path; it was disposed and recreated.
    Replaced,
}

/// Outcome of one [`BufferCache::reconcile`] pass.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub created: Vec<DocumentId>,
    pub replaced: Vec<DocumentId>,
    pub disposed: Vec<DocumentId>,
    /// Modules skipped because their path could not be resolved.
    pub failed: Vec<ResolutionError>,
}

impl ReconcileReport {
    /// Returns true if the pass neither created nor disposed anything.
    pub fn is_noop(&self) -> bool {
        self.created.is_empty() && self.replaced.is_empty() && self.disposed.is_empty()
    }
}

/// Owns every live [`BufferRecord`], keyed by document.
///
/// Every disposal goes through a `before_dispose` hook supplied by the
/// caller, which runs while the record is still alive so the caller can
/// unbind it from the surface before its buffer is released.
pub struct BufferCache {
    records: HashMap<DocumentId, BufferRecord>,
    resolver: Box<dyn PathResolver>,
    next_handle: u64,
    stats: CacheStats,
}

impl Default for BufferCache {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferCache {
    /// Creates an empty cache resolving paths with [`TreeResolver`].
    pub fn new() -> Self {
        Self::with_resolver(TreeResolver)
    }

    /// Creates an empty cache resolving paths with `resolver`.
    pub fn with_resolver(resolver: impl PathResolver + 'static) -> Self {
        Self {
            records: HashMap::new(),
            resolver: Box::new(resolver),
            next_handle: 1,
            stats: CacheStats::default(),
        }
    }

    /// Returns the live record for `document`.
    pub fn get(&self, document: &DocumentId) -> Option<&BufferRecord> {
        self.records.get(document)
    }

    /// Returns the live record for `document` for editing.
    pub fn get_mut(&mut self, document: &DocumentId) -> Option<&mut BufferRecord> {
        self.records.get_mut(document)
    }

    /// Returns true if `document` has a live record.
    pub fn contains(&self, document: &DocumentId) -> bool {
        self.records.contains_key(document)
    }

    /// Returns the number of live records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no record is alive.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the cached document ids in sorted order.
    pub fn documents(&self) -> Vec<DocumentId> {
        let mut ids: Vec<_> = self.records.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Returns how many records were created and disposed so far.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Returns the record for `document`, creating it from `content` if
    /// absent. A record whose path differs from `path` is disposed and
    /// replaced by a fresh one; nothing carries over from the old record.
    pub fn ensure(
        &mut self,
        document: &DocumentId,
        content: &str,
        path: &str,
        before_dispose: &mut dyn FnMut(&BufferRecord),
    ) -> (&mut BufferRecord, Ensured) {
        let outcome = match self.records.get(document) {
            Some(record) if record.path() == path => Ensured::Existing,
            Some(_) => Ensured::Replaced,
            None => Ensured::Created,
        };

        if outcome == Ensured::Replaced {
            if let Some(stale) = self.records.remove(document) {
                log::debug!("{}: path changed {} -> {}", document, stale.path(), path);
                Self::dispose(&mut self.stats, stale, before_dispose);
            }
        }

        let record = match self.records.entry(document.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let handle = BufferHandle::new(self.next_handle);
                self.next_handle += 1;
                self.stats.created += 1;
                log::debug!("{}: created {} at {}", document, handle, path);
                entry.insert(BufferRecord::new(
                    document.clone(),
                    path.to_string(),
                    content,
                    handle,
                ))
            }
        };

        (record, outcome)
    }

    /// Resolves `module`'s path and ensures its record.
    pub fn ensure_module(
        &mut self,
        module: &Module,
        modules: &[Module],
        directories: &[Directory],
        before_dispose: &mut dyn FnMut(&BufferRecord),
    ) -> Result<(&mut BufferRecord, Ensured), ResolutionError> {
        let path = self.resolver.resolve_path(&module.id, modules, directories)?;
        Ok(self.ensure(&module.id, &module.code, &path, before_dispose))
    }

    /// Brings the cache in line with the external module set.
    ///
    /// Modules whose path cannot be resolved are skipped and reported; their
    /// existing records, if any, are left untouched.
    pub fn reconcile(
        &mut self,
        modules: &[Module],
        directories: &[Directory],
        before_dispose: &mut dyn FnMut(&BufferRecord),
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for module in modules {
            match self.ensure_module(module, modules, directories, before_dispose) {
                Ok((_, Ensured::Existing)) => {}
                Ok((_, Ensured::Created)) => report.created.push(module.id.clone()),
                Ok((_, Ensured::Replaced)) => report.replaced.push(module.id.clone()),
                Err(e) => {
                    log::warn!("Skipping module {}: {}", module.id, e);
                    report.failed.push(e);
                }
            }
        }

        let present: HashSet<&DocumentId> = modules.iter().map(|m| &m.id).collect();
        let mut gone: Vec<DocumentId> = self
            .records
            .keys()
            .filter(|id| !present.contains(id))
            .cloned()
            .collect();
        gone.sort();

        for id in gone {
            if let Some(record) = self.records.remove(&id) {
                Self::dispose(&mut self.stats, record, before_dispose);
                report.disposed.push(id);
            }
        }

        report
    }

    /// Disposes every record. Returns how many were disposed.
    pub fn dispose_all(&mut self, before_dispose: &mut dyn FnMut(&BufferRecord)) -> usize {
        let count = self.records.len();
        for (_, record) in self.records.drain() {
            Self::dispose(&mut self.stats, record, before_dispose);
        }
        count
    }

    fn dispose(
        stats: &mut CacheStats,
        record: BufferRecord,
        before_dispose: &mut dyn FnMut(&BufferRecord),
    ) {
        before_dispose(&record);
        stats.disposed += 1;
        log::debug!("{}: disposed {}", record.document(), record.handle());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::Directory;

    fn noop() -> impl FnMut(&BufferRecord) {
        |_: &BufferRecord| {}
    }

    fn workspace() -> (Vec<Module>, Vec<Directory>) {
        (
            vec![
                Module::new("m1", "index.js", "console.log(1);"),
                Module::new("m2", "App.js", "export default 1;").in_directory("d1"),
                Module::new("m3", "styles.css", "body {}"),
            ],
            vec![Directory::new("d1", "src")],
        )
    }

    #[test]
    fn test_ensure_creates_then_reuses() {
        let mut cache = BufferCache::new();
        let id = DocumentId::from("m1");

        let (record, outcome) = cache.ensure(&id, "a", "/a.js", &mut noop());
        assert_eq!(outcome, Ensured::Created);
        let handle = record.handle();

        let (record, outcome) = cache.ensure(&id, "ignored", "/a.js", &mut noop());
        assert_eq!(outcome, Ensured::Existing);
        assert_eq!(record.handle(), handle);
        assert_eq!(record.text(), "a");
    }

    #[test]
    fn test_ensure_replaces_on_path_change() {
        let mut cache = BufferCache::new();
        let id = DocumentId::from("m1");
        let old = cache.ensure(&id, "a", "/a.js", &mut noop()).0.handle();
        cache.get_mut(&id).unwrap().set_content("ab");

        let mut disposed = Vec::new();
        let (record, outcome) =
            cache.ensure(&id, "fresh", "/b.js", &mut |r: &BufferRecord| disposed.push(r.handle()));
        assert_eq!(outcome, Ensured::Replaced);
        assert_ne!(record.handle(), old);
        assert!(record.version().is_initial());
        assert_eq!(record.text(), "fresh");
        assert_eq!(disposed, vec![old]);
        assert_eq!(cache.stats(), CacheStats { created: 2, disposed: 1 });
    }

    #[test]
    fn test_reconcile_creates_all() {
        let (modules, dirs) = workspace();
        let mut cache = BufferCache::new();
        let report = cache.reconcile(&modules, &dirs, &mut noop());

        assert_eq!(report.created.len(), 3);
        assert!(report.failed.is_empty());
        assert_eq!(cache.get(&DocumentId::from("m2")).unwrap().path(), "/src/App.js");
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let (modules, dirs) = workspace();
        let mut cache = BufferCache::new();
        cache.reconcile(&modules, &dirs, &mut noop());
        let before = cache.stats();

        let report = cache.reconcile(&modules, &dirs, &mut noop());
        assert!(report.is_noop());
        assert_eq!(cache.stats(), before);
    }

    #[test]
    fn test_reconcile_disposes_removed_modules() {
        let (mut modules, dirs) = workspace();
        let mut cache = BufferCache::new();
        cache.reconcile(&modules, &dirs, &mut noop());

        modules.retain(|m| m.id != DocumentId::from("m3"));
        let mut seen = Vec::new();
        let report = cache.reconcile(&modules, &dirs, &mut |r: &BufferRecord| {
            seen.push(r.document().clone())
        });

        assert_eq!(report.disposed, vec![DocumentId::from("m3")]);
        assert_eq!(seen, vec![DocumentId::from("m3")]);
        assert!(!cache.contains(&DocumentId::from("m3")));
    }

    #[test]
    fn test_rename_directory_replaces_record_once() {
        let (modules, mut dirs) = workspace();
        let mut cache = BufferCache::new();
        cache.reconcile(&modules, &dirs, &mut noop());
        let before = cache.stats();

        dirs[0].title = "lib".to_string();
        let report = cache.reconcile(&modules, &dirs, &mut noop());

        assert_eq!(report.replaced, vec![DocumentId::from("m2")]);
        let after = cache.stats();
        assert_eq!(after.created - before.created, 1);
        assert_eq!(after.disposed - before.disposed, 1);
        assert_eq!(cache.get(&DocumentId::from("m2")).unwrap().path(), "/lib/App.js");
    }

    #[test]
    fn test_reconcile_skips_unresolvable_module() {
        let (mut modules, dirs) = workspace();
        modules.push(Module::new("m4", "lost.js", "").in_directory("missing"));
        let mut cache = BufferCache::new();

        let report = cache.reconcile(&modules, &dirs, &mut noop());
        assert_eq!(report.created.len(), 3);
        assert_eq!(report.failed.len(), 1);
        assert!(!cache.contains(&DocumentId::from("m4")));
    }

    #[test]
    fn test_dispose_all() {
        let (modules, dirs) = workspace();
        let mut cache = BufferCache::new();
        cache.reconcile(&modules, &dirs, &mut noop());

        let mut count = 0;
        assert_eq!(cache.dispose_all(&mut |_: &BufferRecord| count += 1), 3);
        assert_eq!(count, 3);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_handles_are_never_reused() {
        let mut cache = BufferCache::new();
        let id = DocumentId::from("m1");
        let first = cache.ensure(&id, "", "/a.js", &mut noop()).0.handle();
        cache.dispose_all(&mut noop());
        let second = cache.ensure(&id, "", "/a.js", &mut noop()).0.handle();
        assert_ne!(first, second);
    }
}
