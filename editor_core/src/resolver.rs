//! Logical path resolution against the workspace tree.

use crate::error::ResolutionError;
use crate::workspace::{Directory, DocumentId, Module};
use std::collections::HashSet;

/// Derives a module's current logical path from the external tree.
pub trait PathResolver {
    fn resolve_path(
        &self,
        module: &DocumentId,
        modules: &[Module],
        directories: &[Directory],
    ) -> Result<String, ResolutionError>;
}

/// Resolves `/dir/sub/file.ext` by walking directory parents up to the root.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeResolver;

impl PathResolver for TreeResolver {
    fn resolve_path(
        &self,
        module: &DocumentId,
        modules: &[Module],
        directories: &[Directory],
    ) -> Result<String, ResolutionError> {
        let mut matches = modules.iter().filter(|m| &m.id == module);
        let found = matches
            .next()
            .ok_or_else(|| ResolutionError::ModuleNotFound(module.clone()))?;
        if matches.next().is_some() {
            return Err(ResolutionError::AmbiguousModule(module.clone()));
        }

        let mut segments = vec![found.title.as_str()];
        let mut visited = HashSet::new();
        let mut current = found.directory.as_ref();

        while let Some(dir_id) = current {
            if !visited.insert(dir_id) {
                return Err(ResolutionError::DirectoryCycle(dir_id.clone()));
            }
            let dir = directories
                .iter()
                .find(|d| &d.id == dir_id)
                .ok_or_else(|| ResolutionError::MissingDirectory {
                    module: module.clone(),
                    directory: dir_id.clone(),
                })?;
            segments.push(dir.title.as_str());
            current = dir.parent.as_ref();
        }

        segments.reverse();
        Ok(format!("/{}", segments.join("/")))
    }
}
