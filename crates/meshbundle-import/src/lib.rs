//! meshbundle import pipeline
//!
//! Re-hydrates an exported mesh file into a target asset tree: geometry
//! through the external importer, then one material instance per slot
//! named in the `<mesh>.json` sidecar, with its role textures bound.

pub mod importer;
pub mod roles;
pub mod sidecar;

pub use importer::{instance_package, remap_texture_package, ImportOptions, ImportReport, MeshImporter};
pub use roles::TextureRole;
pub use sidecar::{ClassifiedTextures, Sidecar, SlotEntry};
