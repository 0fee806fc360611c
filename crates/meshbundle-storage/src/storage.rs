//! Storage capability
//!
//! The pipelines never touch `std::fs` directly. Every existence check,
//! directory creation, read and write goes through [`Storage`], backed by
//! the real filesystem in production and by [`MemoryStorage`] in tests.

use std::collections::{BTreeMap, HashMap};
use std::path::{Component, Path, PathBuf};

use parking_lot::RwLock;

use crate::node::StorageNode;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage operation errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Parent directory missing for {0}")]
    MissingParent(PathBuf),

    #[error("A file already occupies {0}")]
    FileInTheWay(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(path.to_path_buf())
        } else {
            StorageError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

impl From<StorageError> for meshbundle_core::Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(path) => meshbundle_core::Error::NotFound(path),
            StorageError::Io { source, .. } => meshbundle_core::Error::Io(source),
            other => meshbundle_core::Error::Io(std::io::Error::other(other.to_string())),
        }
    }
}

/// Filesystem-like storage
pub trait Storage {
    /// Check if a file or directory exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Check if `path` is an existing directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Create `path` and every missing ancestor; existing directories are fine
    fn create_dir_all(&self, path: &Path) -> StorageResult<()>;

    /// Read a whole file
    fn read(&self, path: &Path) -> StorageResult<Vec<u8>>;

    /// Create or replace a file; the parent directory must exist
    fn write(&self, path: &Path, data: &[u8]) -> StorageResult<()>;

    /// Entries directly inside a directory
    fn list_dir(&self, path: &Path) -> StorageResult<Vec<StorageNode>>;

    /// Read a whole file as UTF-8 text
    fn read_to_string(&self, path: &Path) -> StorageResult<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|e| StorageError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })
    }

    /// Create the parent directory of `path` if it is missing
    fn ensure_parent(&self, path: &Path) -> StorageResult<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => self.create_dir_all(parent),
            _ => Ok(()),
        }
    }
}

/// Local filesystem storage
///
/// Relative paths resolve against the optional root, absolute paths are
/// used as given.
#[derive(Debug, Clone, Default)]
pub struct FilesystemStorage {
    root: Option<PathBuf>,
}

impl FilesystemStorage {
    /// Storage over the process working directory
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Storage resolving relative paths against `root`
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Self {
            root: Some(root.as_ref().to_path_buf()),
        }
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl Storage for FilesystemStorage {
    fn exists(&self, path: &Path) -> bool {
        self.resolve_path(path).exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.resolve_path(path).is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> StorageResult<()> {
        let abs_path = self.resolve_path(path);
        std::fs::create_dir_all(&abs_path).map_err(|e| StorageError::io(path, e))
    }

    fn read(&self, path: &Path) -> StorageResult<Vec<u8>> {
        let abs_path = self.resolve_path(path);
        std::fs::read(&abs_path).map_err(|e| StorageError::io(path, e))
    }

    fn write(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        let abs_path = self.resolve_path(path);
        if let Some(parent) = abs_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(StorageError::MissingParent(path.to_path_buf()));
            }
        }
        std::fs::write(&abs_path, data).map_err(|e| StorageError::io(path, e))
    }

    fn list_dir(&self, path: &Path) -> StorageResult<Vec<StorageNode>> {
        let abs_path = self.resolve_path(path);

        if !abs_path.exists() {
            return Err(StorageError::NotFound(path.to_path_buf()));
        }

        if !abs_path.is_dir() {
            return Err(StorageError::NotADirectory(path.to_path_buf()));
        }

        let mut nodes = Vec::new();

        for entry in std::fs::read_dir(&abs_path).map_err(|e| StorageError::io(path, e))? {
            let entry = entry.map_err(|e| StorageError::io(path, e))?;
            let metadata = entry.metadata().map_err(|e| StorageError::io(path, e))?;
            let entry_path = path.join(entry.file_name());

            let node = if metadata.is_dir() {
                StorageNode::new_directory(entry_path)
            } else {
                StorageNode::new_file(entry_path, metadata.len())
            };

            nodes.push(node);
        }

        Ok(nodes)
    }
}

#[derive(Debug, Clone)]
enum MemoryNode {
    Directory,
    File(Vec<u8>),
}

/// In-memory storage
///
/// Mirrors filesystem semantics closely enough for pipeline tests: writes
/// need an existing parent directory and every write is counted per path.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    nodes: RwLock<BTreeMap<PathBuf, MemoryNode>>,
    writes: RwLock<HashMap<PathBuf, usize>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lexically normalize: drop `.`, resolve `..`, keep the root
    fn key(path: &Path) -> PathBuf {
        let mut out = PathBuf::new();
        for component in path.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    out.pop();
                }
                other => out.push(other.as_os_str()),
            }
        }
        out
    }

    fn is_implicit_dir(key: &Path) -> bool {
        key.as_os_str().is_empty() || key.parent().is_none()
    }

    /// Number of times `path` has been written
    pub fn write_count(&self, path: impl AsRef<Path>) -> usize {
        let key = Self::key(path.as_ref());
        self.writes.read().get(&key).copied().unwrap_or(0)
    }

    /// Total number of file writes across all paths
    pub fn total_writes(&self) -> usize {
        self.writes.read().values().sum()
    }

    /// Every stored file path, sorted
    pub fn files(&self) -> Vec<PathBuf> {
        self.nodes
            .read()
            .iter()
            .filter(|(_, node)| matches!(node, MemoryNode::File(_)))
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Remove a file; returns whether it existed
    pub fn remove(&self, path: impl AsRef<Path>) -> bool {
        let key = Self::key(path.as_ref());
        let mut nodes = self.nodes.write();
        if matches!(nodes.get(&key), Some(MemoryNode::File(_))) {
            nodes.remove(&key);
            true
        } else {
            false
        }
    }
}

impl Storage for MemoryStorage {
    fn exists(&self, path: &Path) -> bool {
        let key = Self::key(path);
        Self::is_implicit_dir(&key) || self.nodes.read().contains_key(&key)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let key = Self::key(path);
        Self::is_implicit_dir(&key)
            || matches!(self.nodes.read().get(&key), Some(MemoryNode::Directory))
    }

    fn create_dir_all(&self, path: &Path) -> StorageResult<()> {
        let key = Self::key(path);
        let mut nodes = self.nodes.write();

        let mut current = PathBuf::new();
        for component in key.components() {
            current.push(component.as_os_str());
            if Self::is_implicit_dir(&current) {
                continue;
            }
            match nodes.get(&current) {
                Some(MemoryNode::File(_)) => return Err(StorageError::FileInTheWay(current)),
                Some(MemoryNode::Directory) => {}
                None => {
                    nodes.insert(current.clone(), MemoryNode::Directory);
                }
            }
        }

        Ok(())
    }

    fn read(&self, path: &Path) -> StorageResult<Vec<u8>> {
        let key = Self::key(path);
        match self.nodes.read().get(&key) {
            Some(MemoryNode::File(data)) => Ok(data.clone()),
            Some(MemoryNode::Directory) => Err(StorageError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::other("is a directory"),
            }),
            None => Err(StorageError::NotFound(path.to_path_buf())),
        }
    }

    fn write(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        let key = Self::key(path);
        if let Some(parent) = key.parent() {
            if !self.is_dir(parent) {
                return Err(StorageError::MissingParent(path.to_path_buf()));
            }
        }

        let mut nodes = self.nodes.write();
        if matches!(nodes.get(&key), Some(MemoryNode::Directory)) {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::other("is a directory"),
            });
        }
        nodes.insert(key.clone(), MemoryNode::File(data.to_vec()));
        drop(nodes);

        *self.writes.write().entry(key).or_insert(0) += 1;
        Ok(())
    }

    fn list_dir(&self, path: &Path) -> StorageResult<Vec<StorageNode>> {
        let key = Self::key(path);
        if !self.is_dir(&key) {
            return if self.exists(&key) {
                Err(StorageError::NotADirectory(path.to_path_buf()))
            } else {
                Err(StorageError::NotFound(path.to_path_buf()))
            };
        }

        let nodes = self.nodes.read();
        let listing = nodes
            .iter()
            .filter(|(candidate, _)| candidate.parent() == Some(key.as_path()))
            .map(|(candidate, node)| match node {
                MemoryNode::Directory => StorageNode::new_directory(candidate.clone()),
                MemoryNode::File(data) => StorageNode::new_file(candidate.clone(), data.len() as u64),
            })
            .collect();

        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_write_needs_parent() {
        let storage = MemoryStorage::new();
        let file = Path::new("/out/Hero/SK_Hero.fbx");

        assert!(matches!(
            storage.write(file, b"fbx"),
            Err(StorageError::MissingParent(_))
        ));

        storage.ensure_parent(file).unwrap();
        storage.write(file, b"fbx").unwrap();

        assert!(storage.exists(file));
        assert!(storage.is_dir(Path::new("/out/Hero")));
        assert_eq!(storage.read(file).unwrap(), b"fbx");
        assert_eq!(storage.write_count(file), 1);
    }

    #[test]
    fn test_memory_normalizes_paths() {
        let storage = MemoryStorage::new();
        storage.create_dir_all(Path::new("/out/a/../b")).unwrap();
        storage.write(Path::new("/out/./b/x.json"), b"{}").unwrap();

        assert!(storage.exists(Path::new("/out/b/x.json")));
        assert!(!storage.exists(Path::new("/out/a")));
    }

    #[test]
    fn test_memory_list_dir_is_shallow() {
        let storage = MemoryStorage::new();
        storage.create_dir_all(Path::new("/out/sub")).unwrap();
        storage.write(Path::new("/out/a.png"), &[1, 2, 3]).unwrap();
        storage.write(Path::new("/out/sub/b.png"), &[1]).unwrap();

        let listing = storage.list_dir(Path::new("/out")).unwrap();
        let names: Vec<_> = listing.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "sub"]);
        assert_eq!(listing[0].size, 3);
        assert!(listing[1].is_dir());
    }

    #[test]
    fn test_memory_file_blocks_directory() {
        let storage = MemoryStorage::new();
        storage.create_dir_all(Path::new("/out")).unwrap();
        storage.write(Path::new("/out/x"), b"file").unwrap();

        assert!(matches!(
            storage.create_dir_all(Path::new("/out/x/y")),
            Err(StorageError::FileInTheWay(_))
        ));
    }

    #[test]
    fn test_storage_error_into_core() {
        let err: meshbundle_core::Error = StorageError::NotFound(PathBuf::from("/x")).into();
        assert!(err.is_not_found());

        let err: meshbundle_core::Error = StorageError::MissingParent(PathBuf::from("/x/y")).into();
        assert!(err.is_io_error());
    }
}
