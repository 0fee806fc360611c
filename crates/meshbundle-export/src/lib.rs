//! meshbundle export pipeline
//!
//! Walks an actor's skeletal meshes and writes a portable bundle:
//! - mesh geometry (FBX) per unique mesh
//! - PNG per unique texture, optionally downscaled
//! - JSON per unique material and an actor manifest tying them together
//!
//! # Example
//! ```no_run
//! use meshbundle_core::{ActorRef, AssetExporter, SceneGraph};
//! use meshbundle_export::{export_skel_meshes, ExportContext};
//! use meshbundle_storage::FilesystemStorage;
//!
//! fn run(scene: &dyn SceneGraph, exporter: &dyn AssetExporter) -> meshbundle_core::Result<()> {
//!     let storage = FilesystemStorage::new();
//!     let ctx = ExportContext::new(scene, exporter, &storage);
//!     let report = export_skel_meshes(&ctx, &ActorRef::new("Hero", "/Game/Maps/Hero"), "Hero", "/tmp/bundle")?;
//!     println!("{} meshes", report.meshes.exported);
//!     Ok(())
//! }
//! ```

pub mod assets;
pub mod context;
pub mod flat;
pub mod manifest;
pub mod material;
pub mod options;
pub mod report;
pub mod textures;
pub mod walker;

pub use assets::{export_mesh, export_texture, ExportStatus};
pub use context::ExportContext;
pub use flat::export_flat;
pub use manifest::{
    ExportManifest, FlatMaterialManifest, FlatTextureEntry, MaterialManifest, MaterialRef, MeshEntry,
};
pub use material::describe_material;
pub use options::{ExportLayout, ExportOptions};
pub use report::{ExportReport, UnitCounts};
pub use textures::{resize, resize_file, PngTranscoder, ResizeOutcome, TextureError};
pub use walker::export_skel_meshes;
