//! In-memory collaborators for import tests
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use meshbundle_core::{
    AssetKind, AssetRef, AssetRegistry, Error, GeometryImportOptions, GeometryImportOutcome,
    GeometryImporter, ImportedMesh, MaterialSlot, MeshObject, Result, TextureImportRequest,
};
use meshbundle_storage::{MemoryStorage, Storage};

pub const PARENT: &str = "/Game/Materials/M_Master.M_Master";
pub const TARGET: &str = "/Game/Imported";
pub const HERO_OBJECT: &str = "/Game/Imported/Hero.Hero";

/// Geometry importer returning a fixed set of object paths
pub struct FakeGeometryImporter {
    created: Vec<String>,
    requests: RefCell<Vec<(String, GeometryImportOptions)>>,
}

impl FakeGeometryImporter {
    pub fn creating(paths: &[&str]) -> Self {
        Self {
            created: paths.iter().map(|p| p.to_string()).collect(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn last_options(&self) -> Option<GeometryImportOptions> {
        self.requests.borrow().last().map(|(_, options)| options.clone())
    }

    pub fn call_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl GeometryImporter for FakeGeometryImporter {
    fn import(&self, source_file: &Path, _destination_path: &str, options: &GeometryImportOptions) -> GeometryImportOutcome {
        self.requests
            .borrow_mut()
            .push((source_file.display().to_string(), options.clone()));
        GeometryImportOutcome {
            created_object_paths: self.created.clone(),
        }
    }
}

/// Asset registry keeping everything in maps
#[derive(Debug, Default)]
pub struct FakeRegistry {
    assets: HashMap<(String, AssetKind), AssetRef>,
    valid_materials: HashSet<String>,
    meshes: HashMap<String, MeshObject>,
    failing_textures: HashSet<String>,
    pub texture_imports: Vec<TextureImportRequest>,
    pub instances_created: Vec<(String, AssetRef)>,
    /// `(instance path, parameter, texture path)`
    pub bindings: Vec<(String, String, String)>,
    pub saved: Vec<MeshObject>,
}

fn object_path(package: &str) -> String {
    let name = package.rsplit('/').next().unwrap_or(package);
    format!("{package}.{name}")
}

impl FakeRegistry {
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.valid_materials.insert(PARENT.to_string());
        registry
    }

    pub fn with_mesh(mut self, mesh: MeshObject) -> Self {
        self.meshes.insert(mesh.object_path().to_string(), mesh);
        self
    }

    /// Importing a texture from `file` fails
    pub fn failing_texture(mut self, file: &str) -> Self {
        self.failing_textures.insert(file.to_string());
        self
    }

    pub fn mesh(&self, path: &str) -> &MeshObject {
        &self.meshes[path]
    }

    pub fn bindings_for(&self, instance_package: &str) -> Vec<(String, String)> {
        let instance = object_path(instance_package);
        self.bindings
            .iter()
            .filter(|(i, _, _)| *i == instance)
            .map(|(_, param, texture)| (param.clone(), texture.clone()))
            .collect()
    }
}

impl AssetRegistry for FakeRegistry {
    fn find_asset(&self, package: &str, kind: AssetKind) -> Option<AssetRef> {
        self.assets.get(&(package.to_string(), kind)).cloned()
    }

    fn is_valid_material(&self, asset: &AssetRef) -> bool {
        self.valid_materials.contains(&asset.path)
    }

    fn import_texture(&mut self, request: &TextureImportRequest) -> Result<AssetRef> {
        let file = request.source_file.display().to_string();
        if self.failing_textures.contains(&file) {
            return Err(Error::external("texture factory", vec![format!("cannot import {file}")]));
        }
        self.texture_imports.push(request.clone());
        let texture = AssetRef::texture(object_path(&request.package));
        self.assets
            .insert((request.package.clone(), AssetKind::Texture), texture.clone());
        Ok(texture)
    }

    fn create_material_instance(&mut self, package: &str, parent: &AssetRef) -> Result<AssetRef> {
        let instance = AssetRef::material(object_path(package));
        self.assets
            .insert((package.to_string(), AssetKind::Material), instance.clone());
        self.instances_created.push((package.to_string(), parent.clone()));
        Ok(instance)
    }

    fn set_texture_parameter(&mut self, instance: &AssetRef, parameter: &str, texture: &AssetRef) -> Result<()> {
        self.bindings
            .push((instance.path.clone(), parameter.to_string(), texture.path.clone()));
        Ok(())
    }

    fn load_mesh(&self, object_path: &str) -> Option<MeshObject> {
        self.meshes.get(object_path).cloned()
    }

    fn save_mesh(&mut self, mesh: &MeshObject) -> Result<()> {
        self.meshes.insert(mesh.object_path().to_string(), mesh.clone());
        self.saved.push(mesh.clone());
        Ok(())
    }
}

/// Skeletal hero mesh with Skin, Cloth and Eyes slots
pub fn hero_mesh() -> MeshObject {
    MeshObject::Skeletal(ImportedMesh {
        object_path: HERO_OBJECT.to_string(),
        slots: vec![
            MaterialSlot::new(0, "Skin", None),
            MaterialSlot::new(1, "Cloth", None),
            MaterialSlot::new(2, "Eyes", None),
        ],
    })
}

pub const SIDECAR: &str = r#"{
    "Skin": { "Classified": {
        "Diffuse": "/src/Textures/T_Skin_D.png",
        "Normal": "/src/Textures/T_Skin_N.png"
    } },
    "Cloth": { "Classified": {
        "Roughness": "/src/T_Cloth_R.png",
        "Metallic": "/elsewhere/T_Metal.png"
    } },
    "Cape": { "Classified": { "Diffuse": "/src/T_Cape_D.png" } }
}"#;

/// Bundle at `/src` with the mesh, its sidecar and every texture it names
pub fn bundle() -> MemoryStorage {
    let storage = MemoryStorage::new();
    for dir in ["/src/Textures", "/elsewhere"] {
        storage.create_dir_all(Path::new(dir)).unwrap();
    }
    storage.write(Path::new("/src/Hero.fbx"), b"FBX").unwrap();
    storage.write(Path::new("/src/Hero.json"), SIDECAR.as_bytes()).unwrap();
    for file in [
        "/src/Textures/T_Skin_D.png",
        "/src/Textures/T_Skin_N.png",
        "/src/T_Cloth_R.png",
        "/elsewhere/T_Metal.png",
        "/src/T_Cape_D.png",
    ] {
        storage.write(Path::new(file), b"PNG").unwrap();
    }
    storage
}

pub fn options() -> meshbundle_import::ImportOptions {
    meshbundle_import::ImportOptions {
        parent_material: Some(PARENT.to_string()),
        ..meshbundle_import::ImportOptions::default()
    }
}
