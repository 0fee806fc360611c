//! Actor walk for the manifest layout
//!
//! actor -> mesh components -> unique meshes -> material slots -> textures.
//! Every unique leaf is exported once per call and recorded in the actor
//! manifest by its bundle-relative path.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Instant;

use meshbundle_core::{
    log_operation_complete, log_operation_start, ActorRef, AssetRef, Error, RelativeKey, Result,
    ResultExt,
};
use tracing::{debug, info, warn};

use crate::assets::export_mesh;
use crate::context::ExportContext;
use crate::flat::export_flat;
use crate::manifest::{write_json, ExportManifest, MaterialRef, MeshEntry, MESH_EXTENSION};
use crate::material::{describe_material, material_manifest_path};
use crate::options::ExportLayout;
use crate::report::ExportReport;

/// Export the skeletal meshes of `actor` into `export_path`
///
/// Dispatches on the configured layout. The manifest layout writes
/// `<export_path>/<export_name>.json`; the flat layout writes no actor
/// manifest.
///
/// # Errors
///
/// - `InvalidArgument` for a null actor, an empty path, an empty name or a
///   zero texture size limit
/// - `CreateDirectory` when the export directory cannot be created
/// - `NoContent` when the actor has no skeletal mesh components
/// - `WriteFailed` when the actor manifest cannot be written
///
/// Failures of individual meshes, materials and textures are logged and
/// counted in the report instead.
pub fn export_skel_meshes(
    ctx: &ExportContext<'_>,
    actor: &ActorRef,
    export_name: &str,
    export_path: impl AsRef<Path>,
) -> Result<ExportReport> {
    let export_path = export_path.as_ref();

    match ctx.options.layout {
        ExportLayout::Manifest => export_manifest_layout(ctx, actor, export_name, export_path),
        ExportLayout::Flat { texture_size_limit } => {
            export_flat(ctx, actor, export_path, texture_size_limit)
        }
    }
}

fn export_manifest_layout(
    ctx: &ExportContext<'_>,
    actor: &ActorRef,
    export_name: &str,
    export_path: &Path,
) -> Result<ExportReport> {
    if export_name.trim().is_empty() {
        return Err(Error::invalid_argument("export name is empty"));
    }
    if ctx.options.texture_size_limit == Some(0) {
        return Err(Error::invalid_argument("texture size limit must be greater than zero"));
    }
    let meshes = collect_unique_meshes(ctx, actor, export_path)?;

    let start = Instant::now();
    log_operation_start!("export", export_path.display());

    let mut report = ExportReport::default();
    let mut walk = MaterialWalk::default();
    let mut entries = Vec::with_capacity(meshes.len());

    for mesh in &meshes {
        if let Some(entry) = export_mesh_entry(ctx, mesh, export_path, &mut walk, &mut report) {
            entries.push(entry);
        }
    }

    let manifest = ExportManifest {
        actor_name: actor.name.clone(),
        skeletal_meshes: entries,
    };
    let manifest_path = export_path.join(format!("{export_name}.json"));
    write_json(ctx.storage, &manifest_path, &manifest, ctx.options.pretty_json)
        .context("writing actor manifest")?;
    report.manifest_path = Some(manifest_path);

    log_operation_complete!(
        "export",
        start.elapsed(),
        meshes = report.meshes.total(),
        materials = report.materials.total(),
        textures = report.textures.total(),
        failed = report.meshes.failed + report.materials.failed + report.textures.failed,
    );

    Ok(report)
}

/// Export one mesh and describe its slots; `None` if the geometry failed
fn export_mesh_entry(
    ctx: &ExportContext<'_>,
    mesh: &AssetRef,
    export_path: &Path,
    walk: &mut MaterialWalk,
    report: &mut ExportReport,
) -> Option<MeshEntry> {
    let fbx_path = mesh.relative_key().with_suffix(&format!(".{MESH_EXTENSION}"));

    let status = export_mesh(ctx, mesh, &export_path.join(&fbx_path));
    report.meshes.record(status);
    if !status.succeeded() {
        warn!(mesh = %mesh.path, "Dropping mesh from manifest");
        return None;
    }

    let mut slots = match ctx.scene.material_slots(mesh) {
        Ok(slots) => slots,
        Err(e) => {
            warn!(mesh = %mesh.path, error = %e, "Cannot enumerate material slots");
            Vec::new()
        }
    };
    slots.sort_by_key(|slot| slot.index);

    let materials = slots
        .into_iter()
        .map(|slot| {
            let material_json_path = slot.material.as_ref().and_then(|material| {
                walk.describe(ctx, material, export_path, report)
                    .map(material_manifest_path)
            });
            MaterialRef {
                material_slot_index: slot.index,
                material_slot_name: slot.name,
                material_json_path,
            }
        })
        .collect();

    Some(MeshEntry {
        mesh_name: mesh.name().to_string(),
        mesh_asset_path: mesh.path.clone(),
        exported_fbx_path: Some(fbx_path),
        materials,
    })
}

/// Dedup state threaded through the slots of every mesh
///
/// Each unique material is described once per call; later slots reuse the
/// outcome, so report counts are per material rather than per slot.
#[derive(Default)]
struct MaterialWalk {
    processed_textures: HashSet<AssetRef>,
    described: HashMap<AssetRef, Option<RelativeKey>>,
}

impl MaterialWalk {
    fn describe(
        &mut self,
        ctx: &ExportContext<'_>,
        material: &AssetRef,
        export_path: &Path,
        report: &mut ExportReport,
    ) -> Option<&RelativeKey> {
        if !self.described.contains_key(material) {
            let key = describe_material(ctx, material, export_path, &mut self.processed_textures, report);
            self.described.insert(material.clone(), key);
        }
        self.described.get(material).and_then(Option::as_ref)
    }
}

/// Check the call preconditions, create the export directory and return
/// the actor's meshes in first-seen order
pub(crate) fn collect_unique_meshes(
    ctx: &ExportContext<'_>,
    actor: &ActorRef,
    export_path: &Path,
) -> Result<Vec<AssetRef>> {
    if actor.is_null() {
        return Err(Error::invalid_argument("actor is null"));
    }
    if export_path.as_os_str().is_empty() {
        return Err(Error::invalid_argument("export path is empty"));
    }

    if !ctx.storage.is_dir(export_path) {
        ctx.storage
            .create_dir_all(export_path)
            .map_err(|_| Error::CreateDirectory(export_path.to_path_buf()))?;
    }

    let components = ctx
        .scene
        .mesh_components(actor)
        .with_context(|| format!("enumerating components of {}", actor.name))?;
    if components.is_empty() {
        return Err(Error::no_content(format!(
            "{} has no skeletal mesh components",
            actor.name
        )));
    }

    let mut seen = HashSet::new();
    let mut meshes = Vec::new();
    for component in components {
        match component.mesh {
            Some(mesh) if seen.insert(mesh.clone()) => meshes.push(mesh),
            Some(mesh) => debug!(component = %component.name, mesh = %mesh.path, "Mesh already collected"),
            None => debug!(component = %component.name, "Component has no mesh"),
        }
    }

    info!(actor = %actor.name, meshes = meshes.len(), "Collected unique meshes");
    Ok(meshes)
}
