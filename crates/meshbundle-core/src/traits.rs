//! Collaborator interfaces used by the export and import pipelines.
//!
//! The scene-graph runtime, the asset exporter, the geometry importer, the
//! image codec and the asset registry all live outside this workspace.
//! The pipelines only talk to them through the narrow contracts below,
//! which keeps the walkers free of any engine object model and lets the
//! tests drive them with in-memory fakes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{
    ActorRef, AssetKind, AssetRef, MaterialSlot, MeshComponent, MeshObject, RasterImage,
    ScalarParameter, TextureParameter, VectorParameter,
};

// ==================== Scene graph ====================

/// Read access to actors, meshes and materials
pub trait SceneGraph {
    /// Skeletal mesh components of an actor, in stable enumeration order
    fn mesh_components(&self, actor: &ActorRef) -> Result<Vec<MeshComponent>>;

    /// Material slots of a mesh, in slot-index order
    fn material_slots(&self, mesh: &AssetRef) -> Result<Vec<MaterialSlot>>;

    fn scalar_parameters(&self, material: &AssetRef) -> Result<Vec<ScalarParameter>>;

    fn vector_parameters(&self, material: &AssetRef) -> Result<Vec<VectorParameter>>;

    fn texture_parameters(&self, material: &AssetRef) -> Result<Vec<TextureParameter>>;
}

// ==================== Asset export ====================

/// Options handed to the asset exporter
///
/// Every toggle is off by default and the pipeline never turns one on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetExportOptions {
    pub export_morph_targets: bool,
    pub export_preview_mesh: bool,
    pub export_local_time: bool,
    pub force_front_x_axis: bool,
    pub collision: bool,
    pub level_of_detail: bool,
    /// Run without prompting
    pub automated: bool,
}

impl Default for AssetExportOptions {
    fn default() -> Self {
        Self {
            export_morph_targets: false,
            export_preview_mesh: false,
            export_local_time: false,
            force_front_x_axis: false,
            collision: false,
            level_of_detail: false,
            automated: true,
        }
    }
}

/// What the exporter reported for one task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportTaskOutcome {
    pub errors: Vec<String>,
}

impl ExportTaskOutcome {
    pub fn success() -> Self {
        Self::default()
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            errors: vec![error.into()],
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Serializes an asset to a file (geometry interchange or raster image)
pub trait AssetExporter {
    fn export(
        &self,
        asset: &AssetRef,
        destination: &Path,
        options: &AssetExportOptions,
    ) -> ExportTaskOutcome;
}

// ==================== Geometry import ====================

/// Mesh type requested from the geometry importer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeshImportType {
    Static,
    Skeletal,
}

/// Options handed to the geometry importer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryImportOptions {
    pub mesh_type: MeshImportType,
    /// Always false: the type is chosen explicitly
    pub auto_detect_type: bool,
    pub uniform_scale: f32,
    pub import_materials: bool,
    pub import_textures: bool,
    pub import_animations: bool,
    pub create_physics_asset: bool,
    pub automated: bool,
}

impl GeometryImportOptions {
    /// Geometry-only import: the importer never creates materials,
    /// textures, animations or physics assets of its own
    pub fn geometry_only(mesh_type: MeshImportType, uniform_scale: f32) -> Self {
        Self {
            mesh_type,
            auto_detect_type: false,
            uniform_scale,
            import_materials: false,
            import_textures: false,
            import_animations: false,
            create_physics_asset: false,
            automated: true,
        }
    }
}

/// What the importer created for one task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeometryImportOutcome {
    pub created_object_paths: Vec<String>,
}

/// Imports an interchange file into the destination asset tree
pub trait GeometryImporter {
    fn import(
        &self,
        source_file: &Path,
        destination_path: &str,
        options: &GeometryImportOptions,
    ) -> GeometryImportOutcome;
}

// ==================== Image codec ====================

/// Decode/encode between file bytes and raw RGBA8 rasters
pub trait ImageTranscoder {
    /// File extension of the encoded format, without the dot
    fn extension(&self) -> &'static str;

    fn decode(&self, bytes: &[u8]) -> Result<RasterImage>;

    fn encode(&self, image: &RasterImage) -> Result<Vec<u8>>;
}

// ==================== Asset registry ====================

/// Compression preset applied to an imported texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureCompression {
    Default,
    NormalMap,
    Masks,
}

/// Color-space and compression treatment for one texture import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureImportSettings {
    pub srgb: bool,
    pub compression: TextureCompression,
}

/// A texture import request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImportRequest {
    pub source_file: PathBuf,
    /// Destination package name, e.g. `/Game/Imported/Textures/T_Body`
    pub package: String,
    pub settings: TextureImportSettings,
}

/// Package registry of the destination asset tree
pub trait AssetRegistry {
    /// Existing asset of the given kind stored under `package`
    fn find_asset(&self, package: &str, kind: AssetKind) -> Option<AssetRef>;

    /// True when `asset` resolves to a loaded material
    fn is_valid_material(&self, asset: &AssetRef) -> bool;

    fn import_texture(&mut self, request: &TextureImportRequest) -> Result<AssetRef>;

    fn create_material_instance(&mut self, package: &str, parent: &AssetRef) -> Result<AssetRef>;

    fn set_texture_parameter(
        &mut self,
        instance: &AssetRef,
        parameter: &str,
        texture: &AssetRef,
    ) -> Result<()>;

    /// Resolve an object created by the geometry importer
    fn load_mesh(&self, object_path: &str) -> Option<MeshObject>;

    /// Persist slot assignments made on a loaded mesh
    fn save_mesh(&mut self, mesh: &MeshObject) -> Result<()>;
}
