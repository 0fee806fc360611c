//! Material manifests
//!
//! Each unique material becomes one `<key>_material.json` next to the
//! textures it references. The texture files are exported on the way,
//! at most once per run.

use std::collections::HashSet;
use std::path::Path;

use meshbundle_core::{AssetRef, RelativeKey, Result, ResultExt, TextureParameter};
use tracing::{debug, error, info, warn};

use crate::assets::{export_texture, limit_texture_size, ExportStatus};
use crate::context::ExportContext;
use crate::manifest::{
    write_json, MaterialManifest, ScalarEntry, TextureEntry, VectorEntry,
    MATERIAL_MANIFEST_SUFFIX,
};
use crate::report::ExportReport;

/// Bundle-relative path of a material's manifest
pub fn material_manifest_path(key: &RelativeKey) -> String {
    key.with_suffix(MATERIAL_MANIFEST_SUFFIX)
}

/// Write the manifest of `material` under `export_base`, exporting its
/// textures, and return the material's key
///
/// An existing manifest is trusted as is. Textures already in
/// `processed_textures` are referenced without being exported again.
/// Returns `None` when the parameters cannot be enumerated or the
/// manifest cannot be written.
pub fn describe_material(
    ctx: &ExportContext<'_>,
    material: &AssetRef,
    export_base: &Path,
    processed_textures: &mut HashSet<AssetRef>,
    report: &mut ExportReport,
) -> Option<RelativeKey> {
    let key = material.relative_key();
    let manifest_path = export_base.join(material_manifest_path(&key));

    if ctx.storage.exists(&manifest_path) {
        debug!(material = %material.path, "Material manifest exists, skipping");
        report.materials.record(ExportStatus::AlreadyPresent);
        return Some(key);
    }

    let result = build_manifest(ctx, material, export_base, processed_textures, report)
        .and_then(|manifest| {
            ctx.storage.ensure_parent(&manifest_path)?;
            write_json(ctx.storage, &manifest_path, &manifest, ctx.options.pretty_json)
        });

    match result {
        Ok(()) => {
            info!(material = %material.path, manifest = %manifest_path.display(), "Wrote material manifest");
            report.materials.record(ExportStatus::Exported);
            Some(key)
        }
        Err(e) => {
            error!(material = %material.path, error = %e, "Failed to describe material");
            report.materials.record(ExportStatus::Failed);
            None
        }
    }
}

fn build_manifest(
    ctx: &ExportContext<'_>,
    material: &AssetRef,
    export_base: &Path,
    processed_textures: &mut HashSet<AssetRef>,
    report: &mut ExportReport,
) -> Result<MaterialManifest> {
    let scalars = ctx
        .scene
        .scalar_parameters(material)
        .context("enumerating scalar parameters")?;
    let vectors = ctx
        .scene
        .vector_parameters(material)
        .context("enumerating vector parameters")?;
    let textures = ctx
        .scene
        .texture_parameters(material)
        .context("enumerating texture parameters")?;

    let mut texture_parameters = Vec::with_capacity(textures.len());
    for parameter in textures {
        if let Some(entry) = export_parameter_texture(ctx, parameter, export_base, processed_textures, report) {
            texture_parameters.push(entry);
        }
    }

    Ok(MaterialManifest {
        material_name: material.name().to_string(),
        material_asset_path: material.path.clone(),
        scalar_parameters: scalars
            .into_iter()
            .map(|p| ScalarEntry { name: p.name, value: p.value })
            .collect(),
        vector_parameters: vectors
            .into_iter()
            .map(|p| VectorEntry { name: p.name, value: p.value })
            .collect(),
        texture_parameters,
    })
}

/// Export the texture behind one parameter and build its entry
///
/// The entry is recorded even when the export fails so that the material
/// still names every texture it uses.
fn export_parameter_texture(
    ctx: &ExportContext<'_>,
    parameter: TextureParameter,
    export_base: &Path,
    processed_textures: &mut HashSet<AssetRef>,
    report: &mut ExportReport,
) -> Option<TextureEntry> {
    let Some(texture) = parameter.texture else {
        debug!(parameter = %parameter.name, "Texture parameter is unset");
        return None;
    };

    let exported_png_path = texture.relative_key().with_suffix(&ctx.texture_suffix());
    let dest = export_base.join(&exported_png_path);

    if processed_textures.insert(texture.clone()) {
        let status = match ctx.storage.ensure_parent(&dest) {
            Ok(()) => export_texture(ctx, &texture, &dest),
            Err(e) => {
                warn!(texture = %texture.path, error = %e, "Cannot create texture directory");
                ExportStatus::Failed
            }
        };
        report.textures.record(status);

        if status == ExportStatus::Exported {
            if let Some(limit) = ctx.options.effective_texture_limit() {
                if limit_texture_size(ctx, &dest, limit) {
                    report.resized_textures += 1;
                }
            }
        }
    } else {
        debug!(texture = %texture.path, "Texture already processed");
    }

    Some(TextureEntry {
        parameter_name: parameter.name,
        texture_asset_path: texture.path,
        exported_png_path,
    })
}
