//! meshbundle storage
//!
//! Provides the storage capability used by the export and import
//! pipelines:
//! - `FilesystemStorage` over the local filesystem
//! - `MemoryStorage` for tests and dry runs
//! - package/bundle path helpers and glob-filtered file listing
//!
//! # Example
//! ```no_run
//! use meshbundle_storage::{list_files, FilesystemStorage};
//!
//! let storage = FilesystemStorage::new();
//! let meshes = list_files(&storage, "/tmp/bundle", "*.fbx", true).unwrap();
//! for mesh in meshes {
//!     println!("{mesh}");
//! }
//! ```

pub mod node;
pub mod path;
pub mod search;
pub mod storage;

pub use node::{NodeType, StorageNode};
pub use search::{list_files, FileQuery};
pub use storage::{FilesystemStorage, MemoryStorage, Storage, StorageError, StorageResult};
