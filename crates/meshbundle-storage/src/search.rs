//! File listing with name filters

use std::path::{Path, PathBuf};

use crate::node::StorageNode;
use crate::path::glob_match;
use crate::storage::{Storage, StorageResult};

/// File listing query
#[derive(Debug, Clone, Default)]
pub struct FileQuery {
    /// File name pattern (glob), `None` matches everything
    pub pattern: Option<String>,
    /// File extension filter
    pub extension: Option<String>,
    /// Descend into subdirectories
    pub recursive: bool,
}

impl FileQuery {
    /// Create a new query matching every file directly inside the root
    pub fn new() -> Self {
        Self::default()
    }

    /// Set file name pattern; an empty pattern matches everything
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        self.pattern = if pattern.is_empty() { None } else { Some(pattern) };
        self
    }

    /// Set file extension filter
    pub fn with_extension(mut self, ext: impl Into<String>) -> Self {
        self.extension = Some(ext.into());
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Check if a file node matches this query
    pub fn matches(&self, node: &StorageNode) -> bool {
        if !node.is_file() {
            return false;
        }

        if let Some(ref ext) = self.extension {
            if !node.has_extension(ext) {
                return false;
            }
        }

        match self.pattern {
            Some(ref pattern) => glob_match(pattern, &node.name),
            None => true,
        }
    }

    /// Run the query under `root`, returning matching file paths sorted
    pub fn run(&self, storage: &dyn Storage, root: &Path) -> StorageResult<Vec<PathBuf>> {
        Ok(self
            .run_nodes(storage, root)?
            .into_iter()
            .map(|node| node.path)
            .collect())
    }

    /// Like [`FileQuery::run`], keeping the listing entries (sizes included)
    pub fn run_nodes(&self, storage: &dyn Storage, root: &Path) -> StorageResult<Vec<StorageNode>> {
        let mut found = Vec::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            for node in storage.list_dir(&dir)? {
                if node.is_dir() {
                    if self.recursive {
                        pending.push(node.path);
                    }
                } else if self.matches(&node) {
                    found.push(node);
                }
            }
        }

        found.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(found)
    }
}

/// List files under `path` whose names match `pattern`
pub fn list_files(
    storage: &dyn Storage,
    path: impl AsRef<Path>,
    pattern: &str,
    recursive: bool,
) -> StorageResult<Vec<String>> {
    let paths = FileQuery::new()
        .with_pattern(pattern)
        .recursive(recursive)
        .run(storage, path.as_ref())?;

    Ok(paths
        .into_iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect())
}
