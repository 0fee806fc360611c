//! Single-asset export with skip-if-exists semantics

use std::path::Path;

use meshbundle_core::AssetRef;
use tracing::{debug, error, info, warn};

use crate::context::ExportContext;
use crate::textures::{resize_file, ResizeOutcome};

/// Result of exporting one asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStatus {
    /// The exporter wrote the file during this call
    Exported,
    /// The destination already existed, nothing was written
    AlreadyPresent,
    /// The exporter reported errors, or the destination was unusable
    Failed,
}

impl ExportStatus {
    /// The destination file can be referenced
    pub fn succeeded(self) -> bool {
        !matches!(self, ExportStatus::Failed)
    }
}

fn export_asset(ctx: &ExportContext<'_>, asset: &AssetRef, dest: &Path) -> ExportStatus {
    if ctx.storage.exists(dest) {
        debug!(asset = %asset.path, dest = %dest.display(), "Destination exists, skipping export");
        return ExportStatus::AlreadyPresent;
    }

    let outcome = ctx.exporter.export(asset, dest, &ctx.options.asset);
    if outcome.is_success() {
        info!(kind = %asset.kind, asset = %asset.path, dest = %dest.display(), "Exported");
        ExportStatus::Exported
    } else {
        error!(
            kind = %asset.kind,
            asset = %asset.path,
            dest = %dest.display(),
            errors = ?outcome.errors,
            "Export failed"
        );
        ExportStatus::Failed
    }
}

/// Export a texture to `dest` unless the file is already there
pub fn export_texture(ctx: &ExportContext<'_>, texture: &AssetRef, dest: &Path) -> ExportStatus {
    export_asset(ctx, texture, dest)
}

/// Export mesh geometry to `dest` unless the file is already there
///
/// The parent directory is created first.
pub fn export_mesh(ctx: &ExportContext<'_>, mesh: &AssetRef, dest: &Path) -> ExportStatus {
    if let Err(e) = ctx.storage.ensure_parent(dest) {
        error!(asset = %mesh.path, dest = %dest.display(), error = %e, "Cannot create mesh directory");
        return ExportStatus::Failed;
    }
    export_asset(ctx, mesh, dest)
}

/// Clamp a freshly exported texture to `limit`; returns true if it was resized
///
/// Failures are logged, the exported file stays as the exporter wrote it.
pub fn limit_texture_size(ctx: &ExportContext<'_>, dest: &Path, limit: u32) -> bool {
    match resize_file(ctx.storage, ctx.transcoder, dest, limit) {
        Ok(ResizeOutcome::Resized { from, to }) => {
            info!(
                file = %dest.display(),
                from = %format!("{}x{}", from.0, from.1),
                to = %format!("{}x{}", to.0, to.1),
                limit,
                "Resized texture"
            );
            true
        }
        Ok(ResizeOutcome::Unchanged { .. }) => false,
        Err(e) => {
            warn!(file = %dest.display(), error = %e, "Texture resize failed");
            false
        }
    }
}
