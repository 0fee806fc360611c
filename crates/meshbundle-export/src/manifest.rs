//! JSON documents written into a bundle
//!
//! Field names are PascalCase on disk; every cross-reference is a path
//! relative to the export directory.

use std::path::Path;

use meshbundle_core::{Error, LinearColor, Result};
use meshbundle_storage::Storage;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Suffix of per-material manifest files in the manifest layout
pub const MATERIAL_MANIFEST_SUFFIX: &str = "_material.json";

/// Geometry interchange extension
pub const MESH_EXTENSION: &str = "fbx";

/// Root document: `<export_path>/<export_name>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExportManifest {
    pub actor_name: String,
    pub skeletal_meshes: Vec<MeshEntry>,
}

/// One exported mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MeshEntry {
    pub mesh_name: String,
    pub mesh_asset_path: String,
    #[serde(rename = "ExportedFBXPath", default, skip_serializing_if = "Option::is_none")]
    pub exported_fbx_path: Option<String>,
    pub materials: Vec<MaterialRef>,
}

/// Material slot of an exported mesh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MaterialRef {
    pub material_slot_index: usize,
    pub material_slot_name: String,
    #[serde(rename = "MaterialJSONPath", default, skip_serializing_if = "Option::is_none")]
    pub material_json_path: Option<String>,
}

/// Per-material document: `<key>_material.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MaterialManifest {
    pub material_name: String,
    pub material_asset_path: String,
    pub scalar_parameters: Vec<ScalarEntry>,
    pub vector_parameters: Vec<VectorEntry>,
    pub texture_parameters: Vec<TextureEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScalarEntry {
    pub name: String,
    pub value: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VectorEntry {
    pub name: String,
    pub value: LinearColor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TextureEntry {
    pub parameter_name: String,
    pub texture_asset_path: String,
    #[serde(rename = "ExportedPNGPath")]
    pub exported_png_path: String,
}

/// Per-material document of the flat layout: `<MaterialName>.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FlatMaterialManifest {
    pub material_name: String,
    pub material_path: String,
    pub textures: Vec<FlatTextureEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FlatTextureEntry {
    pub parameter_name: String,
    pub texture_name: String,
    pub texture_path: String,
    /// Full path of the written file
    pub exported_file: String,
}

impl ExportManifest {
    /// Every bundle-relative path the manifest references directly
    pub fn referenced_paths(&self) -> impl Iterator<Item = &str> {
        self.skeletal_meshes.iter().flat_map(|mesh| {
            mesh.exported_fbx_path.as_deref().into_iter().chain(
                mesh.materials
                    .iter()
                    .filter_map(|slot| slot.material_json_path.as_deref()),
            )
        })
    }
}

/// Serialize `value` and write it to `path`
pub fn write_json<T: Serialize>(
    storage: &dyn Storage,
    path: &Path,
    value: &T,
    pretty: bool,
) -> Result<()> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(value)
    } else {
        serde_json::to_vec(value)
    }
    .map_err(|e| Error::WriteFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    storage.write(path, &bytes).map_err(|e| Error::WriteFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Read and parse a JSON document
pub fn read_json<T: DeserializeOwned>(storage: &dyn Storage, path: &Path) -> Result<T> {
    let bytes = storage.read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| Error::parse(path, e))
}
