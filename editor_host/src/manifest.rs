//! Workspace manifest: the JSON file the host is started with.

use sandpit_core::{Directory, DocumentId, Module, SessionConfig};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub modules: Vec<Module>,
    #[serde(default)]
    pub directories: Vec<Directory>,
    /// Document shown first; defaults to the first module.
    #[serde(default)]
    pub active: Option<DocumentId>,
    #[serde(default)]
    pub config: SessionConfig,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// The document to activate after the workspace is loaded.
    pub fn initial_document(&self) -> Option<DocumentId> {
        self.active
            .clone()
            .or_else(|| self.modules.first().map(|m| m.id.clone()))
    }
}
