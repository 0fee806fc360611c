//! Summary of an export run

use std::path::PathBuf;

use serde::Serialize;

use crate::assets::ExportStatus;

/// Per-kind unit counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UnitCounts {
    /// Written during this run
    pub exported: usize,
    /// Already present on disk
    pub skipped: usize,
    pub failed: usize,
}

impl UnitCounts {
    pub fn record(&mut self, status: ExportStatus) {
        match status {
            ExportStatus::Exported => self.exported += 1,
            ExportStatus::AlreadyPresent => self.skipped += 1,
            ExportStatus::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.exported + self.skipped + self.failed
    }
}

/// What an export call did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    /// Actor manifest, `None` for the flat layout
    pub manifest_path: Option<PathBuf>,
    pub meshes: UnitCounts,
    pub materials: UnitCounts,
    pub textures: UnitCounts,
    /// Textures downscaled after export
    pub resized_textures: usize,
}

impl ExportReport {
    /// True when at least one unit failed
    pub fn has_failures(&self) -> bool {
        self.meshes.failed + self.materials.failed + self.textures.failed > 0
    }

    /// Units written during this run, all kinds
    pub fn exported_total(&self) -> usize {
        self.meshes.exported + self.materials.exported + self.textures.exported
    }
}
