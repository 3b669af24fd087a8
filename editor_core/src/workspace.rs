//! External workspace tree: modules (files) and directories.
//!
//! These are snapshots handed in by the host; the core never mutates them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a logical file. Survives renames and moves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a directory in the workspace tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DirectoryId(String);

impl DirectoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl From<&str> for DirectoryId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for DirectoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file in the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: DocumentId,
    /// File name, e.g. `index.js`.
    pub title: String,
    /// Containing directory; `None` for the workspace root.
    #[serde(default)]
    pub directory: Option<DirectoryId>,
    /// Content used when a buffer is first created for this module.
    #[serde(default)]
    pub code: String,
}

impl Module {
    pub fn new(id: impl Into<String>, title: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: DocumentId::new(id),
            title: title.into(),
            directory: None,
            code: code.into(),
        }
    }

    pub fn in_directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = Some(DirectoryId::new(directory));
        self
    }
}

/// A directory in the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    pub id: DirectoryId,
    pub title: String,
    #[serde(default)]
    pub parent: Option<DirectoryId>,
}

impl Directory {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: DirectoryId::new(id),
            title: title.into(),
            parent: None,
        }
    }

    pub fn in_directory(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(DirectoryId::new(parent));
        self
    }
}
