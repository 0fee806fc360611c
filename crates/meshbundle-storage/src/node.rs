//! Directory listing entries

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Entry type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    /// Directory node
    Directory,
    /// File node
    File,
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageNode {
    /// Entry name (without path)
    pub name: String,
    /// Full path of the entry
    pub path: PathBuf,
    /// Node type
    pub node_type: NodeType,
    /// File size (0 for directories)
    pub size: u64,
}

impl StorageNode {
    /// Create a new file node
    pub fn new_file(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        Self {
            name: file_name_of(&path),
            path,
            node_type: NodeType::File,
            size,
        }
    }

    /// Create a new directory node
    pub fn new_directory(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: file_name_of(&path),
            path,
            node_type: NodeType::Directory,
            size: 0,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.node_type == NodeType::Directory
    }

    pub fn is_file(&self) -> bool {
        self.node_type == NodeType::File
    }

    /// Lowercased extension, files only
    pub fn extension(&self) -> Option<String> {
        if self.is_dir() {
            return None;
        }
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
    }

    /// Case-insensitive extension check (`ext` without the dot)
    pub fn has_extension(&self, ext: &str) -> bool {
        self.extension()
            .is_some_and(|own| own.eq_ignore_ascii_case(ext.trim_start_matches('.')))
    }
}

fn file_name_of(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
