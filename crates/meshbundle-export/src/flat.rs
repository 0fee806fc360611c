//! Flat export layout
//!
//! All files land directly in the export directory:
//! `<MeshName>_<index>.fbx`, `<TextureName>.png`, `<MaterialName>.json`.
//! There is no actor manifest; each material file lists the textures that
//! were exported for it.

use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use meshbundle_core::{log_operation_complete, log_operation_start, ActorRef, AssetRef, Error, Result};
use tracing::{error, info, warn};

use crate::assets::{export_mesh, export_texture, limit_texture_size, ExportStatus};
use crate::context::ExportContext;
use crate::manifest::{write_json, FlatMaterialManifest, FlatTextureEntry, MESH_EXTENSION};
use crate::report::ExportReport;
use crate::walker::collect_unique_meshes;

/// Export `actor` in the flat layout, clamping textures to `texture_size_limit`
///
/// Materials and textures are deduplicated across the whole call. Within a
/// material only the first parameter naming a texture is kept, and a
/// texture already written for an earlier material is not listed again.
/// A mesh whose geometry fails still has its materials exported.
pub fn export_flat(
    ctx: &ExportContext<'_>,
    actor: &ActorRef,
    export_path: &Path,
    texture_size_limit: u32,
) -> Result<ExportReport> {
    if texture_size_limit == 0 {
        return Err(Error::invalid_argument("texture size limit must be greater than zero"));
    }
    let meshes = collect_unique_meshes(ctx, actor, export_path)?;

    let start = Instant::now();
    log_operation_start!("flat export", export_path.display());

    let mut report = ExportReport::default();
    let mut processed_materials = HashSet::new();
    let mut processed_textures = HashSet::new();

    for (index, mesh) in meshes.iter().enumerate() {
        let dest = export_path.join(format!("{}_{index}.{MESH_EXTENSION}", mesh.name()));
        let status = export_mesh(ctx, mesh, &dest);
        report.meshes.record(status);
        if !status.succeeded() {
            warn!(mesh = %mesh.path, "Mesh export failed, continuing with its materials");
        }

        let slots = match ctx.scene.material_slots(mesh) {
            Ok(slots) => slots,
            Err(e) => {
                warn!(mesh = %mesh.path, error = %e, "Cannot enumerate material slots");
                continue;
            }
        };

        for material in slots.into_iter().filter_map(|slot| slot.material) {
            if !processed_materials.insert(material.clone()) {
                continue;
            }
            export_flat_material(
                ctx,
                &material,
                export_path,
                texture_size_limit,
                &mut processed_textures,
                &mut report,
            );
        }
    }

    log_operation_complete!(
        "flat export",
        start.elapsed(),
        meshes = report.meshes.total(),
        materials = processed_materials.len(),
        textures = processed_textures.len(),
    );

    Ok(report)
}

fn export_flat_material(
    ctx: &ExportContext<'_>,
    material: &AssetRef,
    export_path: &Path,
    texture_size_limit: u32,
    processed_textures: &mut HashSet<AssetRef>,
    report: &mut ExportReport,
) {
    let parameters = match ctx.scene.texture_parameters(material) {
        Ok(parameters) => parameters,
        Err(e) => {
            warn!(material = %material.path, error = %e, "Cannot enumerate texture parameters");
            Vec::new()
        }
    };

    // First parameter naming a texture wins
    let mut by_texture: Vec<(AssetRef, String)> = Vec::new();
    for parameter in parameters {
        if let Some(texture) = parameter.texture {
            if !by_texture.iter().any(|(seen, _)| *seen == texture) {
                by_texture.push((texture, parameter.name));
            }
        }
    }

    let mut textures = Vec::new();
    for (texture, parameter_name) in by_texture {
        if !processed_textures.insert(texture.clone()) {
            continue;
        }

        let dest = export_path.join(format!("{}{}", texture.name(), ctx.texture_suffix()));
        let status = export_texture(ctx, &texture, &dest);
        report.textures.record(status);

        match status {
            ExportStatus::Failed => continue,
            ExportStatus::Exported => {
                if limit_texture_size(ctx, &dest, texture_size_limit) {
                    report.resized_textures += 1;
                }
            }
            ExportStatus::AlreadyPresent => {}
        }

        textures.push(FlatTextureEntry {
            parameter_name,
            texture_name: texture.name().to_string(),
            texture_path: texture.path.clone(),
            exported_file: dest.to_string_lossy().into_owned(),
        });
    }

    let manifest = FlatMaterialManifest {
        material_name: material.name().to_string(),
        material_path: material.path.clone(),
        textures,
    };
    let manifest_path = export_path.join(format!("{}.json", material.name()));

    match write_json(ctx.storage, &manifest_path, &manifest, ctx.options.pretty_json) {
        Ok(()) => {
            info!(material = %material.path, manifest = %manifest_path.display(), "Wrote material JSON");
            report.materials.record(ExportStatus::Exported);
        }
        Err(e) => {
            error!(material = %material.path, error = %e, "Failed to write material JSON");
            report.materials.record(ExportStatus::Failed);
        }
    }
}
