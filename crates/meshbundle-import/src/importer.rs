//! Mesh bundle importer
//!
//! Import runs in two phases. The geometry importer first creates the mesh
//! objects; then, if requested, the slot sidecar next to the mesh file is
//! read and every matching slot receives a material instance with its
//! role textures bound.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use meshbundle_core::{
    log_operation_complete, log_operation_start, AssetKind, AssetRef, AssetRegistry, Error,
    GeometryImportOptions, GeometryImporter, MeshImportType, MeshObject, Result,
    TextureImportRequest,
};
use meshbundle_storage::path::{filename, join_paths, relative_to, strip_extension};
use meshbundle_storage::Storage;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::roles::TextureRole;
use crate::sidecar::{ClassifiedTextures, Sidecar, SlotEntry};

/// Extension the geometry importer accepts
pub const MESH_EXTENSION: &str = "fbx";

/// Prefix of material instance names
pub const INSTANCE_PREFIX: &str = "MI_";

/// Import options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Build material instances from the slot sidecar
    pub import_material: bool,

    /// Import as a skeletal mesh instead of a static one
    pub import_skeleton: bool,

    /// Parent of every created material instance
    pub parent_material: Option<String>,

    pub uniform_scale: f32,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            import_material: true,
            import_skeleton: true,
            parent_material: None,
            uniform_scale: 1.0,
        }
    }
}

/// What an import call did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Object paths reported by the geometry importer
    pub created_objects: Vec<String>,
    /// Sidecar that drove the material pass, if one was loaded
    pub sidecar: Option<PathBuf>,
    pub instances_created: usize,
    pub instances_reused: usize,
    pub textures_imported: usize,
    pub textures_reused: usize,
    /// Sidecar entries naming a file that does not exist
    pub textures_missing: usize,
    pub slots_bound: usize,
    pub slots_failed: usize,
}

/// Package name of a texture file once imported under `target_path`
///
/// The file's location below `source_dir` is kept, minus its extension.
/// Files outside `source_dir` land directly under `target_path`.
pub fn remap_texture_package(texture_file: &str, source_dir: &str, target_path: &str) -> String {
    match relative_to(texture_file, source_dir) {
        Some(rest) => join_paths(target_path, strip_extension(&rest)),
        None => join_paths(target_path, strip_extension(filename(texture_file))),
    }
}

/// Package name of the material instance for `slot_name`
///
/// The name carries no mesh qualifier: meshes imported into the same
/// `target_path` share the instance of a common slot name, and the last
/// import's texture bindings win. Import meshes with clashing slot names
/// into separate targets.
pub fn instance_package(target_path: &str, slot_name: &str) -> String {
    join_paths(target_path, &format!("{INSTANCE_PREFIX}{slot_name}"))
}

/// State of one material pass
struct MaterialPass<'p> {
    target_path: &'p str,
    source_dir: &'p str,
    parent: AssetRef,
    sidecar: Sidecar,
    /// Texture file -> imported texture, so each file is imported once
    textures: HashMap<String, AssetRef>,
}

/// Imports mesh files and rebinds their materials
pub struct MeshImporter<'a> {
    geometry: &'a dyn GeometryImporter,
    registry: &'a mut dyn AssetRegistry,
    storage: &'a dyn Storage,
}

impl<'a> MeshImporter<'a> {
    pub fn new(
        geometry: &'a dyn GeometryImporter,
        registry: &'a mut dyn AssetRegistry,
        storage: &'a dyn Storage,
    ) -> Self {
        Self {
            geometry,
            registry,
            storage,
        }
    }

    /// Import `source_dir/mesh_file_name` into `target_path`
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty target path
    /// - `NotFound` when the mesh file does not exist
    /// - `UnsupportedFormat` when it is not an `.fbx` file
    /// - `ExternalToolFailure` when the geometry importer creates nothing
    ///
    /// Sidecar, parent material and per-slot problems are logged and
    /// leave the affected slots unchanged.
    pub fn import_mesh(
        &mut self,
        target_path: &str,
        source_dir: impl AsRef<Path>,
        mesh_file_name: &str,
        options: &ImportOptions,
    ) -> Result<ImportReport> {
        if target_path.trim().is_empty() {
            return Err(Error::invalid_argument("target path is empty"));
        }

        let source_dir = source_dir.as_ref();
        let source_file = source_dir.join(mesh_file_name);

        if !self.storage.exists(&source_file) {
            return Err(Error::NotFound(source_file));
        }
        let is_mesh = source_file
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(MESH_EXTENSION));
        if !is_mesh {
            return Err(Error::UnsupportedFormat {
                path: source_file,
                expected: MESH_EXTENSION.to_string(),
            });
        }

        let start = Instant::now();
        log_operation_start!("import", target_path);

        let mut report = ImportReport {
            created_objects: self.import_geometry(&source_file, target_path, options)?,
            ..ImportReport::default()
        };

        if options.import_material {
            let source_dir = source_dir.to_string_lossy();
            if let Some(mut pass) = self.prepare_material_pass(&source_file, &source_dir, target_path, options, &mut report) {
                let objects = report.created_objects.clone();
                for object_path in &objects {
                    self.bind_object(object_path, &mut pass, &mut report);
                }
            }
        } else {
            debug!("Material import disabled");
        }

        log_operation_complete!(
            "import",
            start.elapsed(),
            objects = report.created_objects.len(),
            instances = report.instances_created + report.instances_reused,
            textures = report.textures_imported,
            slots_failed = report.slots_failed,
        );

        Ok(report)
    }

    fn import_geometry(
        &self,
        source_file: &Path,
        target_path: &str,
        options: &ImportOptions,
    ) -> Result<Vec<String>> {
        let mesh_type = if options.import_skeleton {
            MeshImportType::Skeletal
        } else {
            MeshImportType::Static
        };
        let geometry_options = GeometryImportOptions::geometry_only(mesh_type, options.uniform_scale);

        let outcome = self.geometry.import(source_file, target_path, &geometry_options);
        if outcome.created_object_paths.is_empty() {
            return Err(Error::external(
                "geometry importer",
                vec![format!("no objects created from {}", source_file.display())],
            ));
        }

        for object_path in &outcome.created_object_paths {
            info!(object = %object_path, mesh_type = ?mesh_type, "Imported object");
        }
        Ok(outcome.created_object_paths)
    }

    /// Load the sidecar and resolve the parent; `None` skips the pass
    fn prepare_material_pass<'p>(
        &self,
        source_file: &Path,
        source_dir: &'p str,
        target_path: &'p str,
        options: &ImportOptions,
        report: &mut ImportReport,
    ) -> Option<MaterialPass<'p>> {
        let sidecar_path = Sidecar::path_for(source_file);
        let sidecar = match Sidecar::load(self.storage, &sidecar_path) {
            Ok(Some(sidecar)) => sidecar,
            Ok(None) => {
                debug!(sidecar = %sidecar_path.display(), "No sidecar, skipping materials");
                return None;
            }
            Err(e) => {
                warn!(sidecar = %sidecar_path.display(), error = %e, "Unreadable sidecar, skipping materials");
                return None;
            }
        };

        let parent = options
            .parent_material
            .as_deref()
            .map(AssetRef::material)
            .filter(|parent| self.registry.is_valid_material(parent));
        let Some(parent) = parent else {
            warn!(parent = ?options.parent_material, "Parent material is not a valid material, skipping materials");
            return None;
        };

        report.sidecar = Some(sidecar_path);
        Some(MaterialPass {
            target_path,
            source_dir,
            parent,
            sidecar,
            textures: HashMap::new(),
        })
    }

    fn bind_object(&mut self, object_path: &str, pass: &mut MaterialPass<'_>, report: &mut ImportReport) {
        let Some(mut mesh) = self.registry.load_mesh(object_path) else {
            warn!(object = %object_path, "Created object is not a mesh");
            return;
        };

        let slots: Vec<(usize, String)> = mesh
            .material_slots()
            .iter()
            .map(|slot| (slot.index, slot.name.clone()))
            .collect();

        let mut changed = false;
        for (index, name) in slots {
            let classified = match pass.sidecar.slot(&name) {
                Some(SlotEntry::Classified(classified)) => classified.clone(),
                Some(SlotEntry::Malformed { reason }) => {
                    warn!(slot = %name, reason = %reason, "Malformed sidecar entry");
                    report.slots_failed += 1;
                    continue;
                }
                None => {
                    debug!(slot = %name, "Slot not in sidecar");
                    continue;
                }
            };

            match self.bind_slot(&mut mesh, index, &name, &classified, pass, report) {
                Ok(()) => {
                    changed = true;
                    report.slots_bound += 1;
                }
                Err(e) => {
                    error!(object = %object_path, slot = %name, error = %e, "Failed to bind slot");
                    report.slots_failed += 1;
                }
            }
        }

        if changed {
            if let Err(e) = self.registry.save_mesh(&mesh) {
                error!(object = %object_path, error = %e, "Failed to save mesh");
            }
        }
    }

    fn bind_slot(
        &mut self,
        mesh: &mut MeshObject,
        index: usize,
        slot_name: &str,
        classified: &ClassifiedTextures,
        pass: &mut MaterialPass<'_>,
        report: &mut ImportReport,
    ) -> Result<()> {
        let package = instance_package(pass.target_path, slot_name);
        let instance = match self.registry.find_asset(&package, AssetKind::Material) {
            Some(existing) => {
                debug!(instance = %existing.path, "Reusing material instance");
                report.instances_reused += 1;
                existing
            }
            None => {
                let created = self.registry.create_material_instance(&package, &pass.parent)?;
                info!(instance = %created.path, parent = %pass.parent.path, "Created material instance");
                report.instances_created += 1;
                created
            }
        };

        for (role, file) in classified.iter() {
            let Some(texture) = self.texture_for(file, role, pass, report) else {
                continue;
            };
            if let Err(e) = self
                .registry
                .set_texture_parameter(&instance, role.parameter_name(), &texture)
            {
                warn!(instance = %instance.path, role = %role, error = %e, "Failed to bind texture");
            }
        }

        mesh.set_slot_material(index, instance)
    }

    /// Imported texture for `file`, importing it on first use
    fn texture_for(
        &mut self,
        file: &str,
        role: TextureRole,
        pass: &mut MaterialPass<'_>,
        report: &mut ImportReport,
    ) -> Option<AssetRef> {
        if let Some(texture) = pass.textures.get(file) {
            return Some(texture.clone());
        }

        if !self.storage.exists(Path::new(file)) {
            warn!(file = %file, role = %role, "Texture file missing");
            report.textures_missing += 1;
            return None;
        }

        let package = remap_texture_package(file, pass.source_dir, pass.target_path);
        let texture = match self.registry.find_asset(&package, AssetKind::Texture) {
            Some(existing) => {
                debug!(texture = %existing.path, "Reusing texture");
                report.textures_reused += 1;
                existing
            }
            None => {
                let request = TextureImportRequest {
                    source_file: PathBuf::from(file),
                    package,
                    settings: role.import_settings(),
                };
                match self.registry.import_texture(&request) {
                    Ok(texture) => {
                        info!(file = %file, texture = %texture.path, role = %role, "Imported texture");
                        report.textures_imported += 1;
                        texture
                    }
                    Err(e) => {
                        warn!(file = %file, role = %role, error = %e, "Texture import failed");
                        return None;
                    }
                }
            }
        };

        pass.textures.insert(file.to_string(), texture.clone());
        Some(texture)
    }
}
