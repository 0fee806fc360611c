//! Export configuration

use meshbundle_core::AssetExportOptions;
use serde::{Deserialize, Serialize};

/// On-disk layout of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExportLayout {
    /// Files mirror the asset tree (`<key>.fbx`, `<key>.png`,
    /// `<key>_material.json`) and an actor manifest ties them together
    #[default]
    Manifest,

    /// Every file directly in the export directory, one JSON per material,
    /// no actor manifest. Exported textures are always clamped to
    /// `texture_size_limit`.
    Flat { texture_size_limit: u32 },
}

/// Export options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// File layout
    pub layout: ExportLayout,

    /// Downscale freshly exported textures to fit this size
    /// (manifest layout only; the flat layout carries its own limit)
    pub texture_size_limit: Option<u32>,

    /// Use pretty-print formatting for JSON files
    pub pretty_json: bool,

    /// Options handed to the asset exporter for every task
    pub asset: AssetExportOptions,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            layout: ExportLayout::Manifest,
            texture_size_limit: None,
            pretty_json: true,
            asset: AssetExportOptions::default(),
        }
    }
}

impl ExportOptions {
    /// Flat layout with the given texture limit
    pub fn flat(texture_size_limit: u32) -> Self {
        Self {
            layout: ExportLayout::Flat { texture_size_limit },
            ..Self::default()
        }
    }

    /// Limit applied to freshly exported textures, if any
    pub fn effective_texture_limit(&self) -> Option<u32> {
        match self.layout {
            ExportLayout::Flat { texture_size_limit } => Some(texture_size_limit),
            ExportLayout::Manifest => self.texture_size_limit,
        }
    }
}
