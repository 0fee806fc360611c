//! Texture roles understood by the importer

use std::fmt;

use meshbundle_core::{TextureCompression, TextureImportSettings};
use serde::{Deserialize, Serialize};

/// Role of a classified texture within a material slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TextureRole {
    Diffuse,
    Normal,
    Roughness,
    Metallic,
}

impl TextureRole {
    /// Every role, in binding order
    pub const ALL: [TextureRole; 4] = [
        TextureRole::Diffuse,
        TextureRole::Normal,
        TextureRole::Roughness,
        TextureRole::Metallic,
    ];

    /// Key under `Classified` in the sidecar
    pub fn json_key(self) -> &'static str {
        match self {
            TextureRole::Diffuse => "Diffuse",
            TextureRole::Normal => "Normal",
            TextureRole::Roughness => "Roughness",
            TextureRole::Metallic => "Metallic",
        }
    }

    /// Texture parameter of the parent material
    pub fn parameter_name(self) -> &'static str {
        match self {
            TextureRole::Diffuse => "BaseColorTexture",
            TextureRole::Normal => "NormalTexture",
            TextureRole::Roughness => "RoughnessTexture",
            TextureRole::Metallic => "MetallicTexture",
        }
    }

    /// Color space and compression for the imported texture
    pub fn import_settings(self) -> TextureImportSettings {
        match self {
            TextureRole::Diffuse => TextureImportSettings {
                srgb: true,
                compression: TextureCompression::Default,
            },
            TextureRole::Normal => TextureImportSettings {
                srgb: false,
                compression: TextureCompression::NormalMap,
            },
            TextureRole::Roughness | TextureRole::Metallic => TextureImportSettings {
                srgb: false,
                compression: TextureCompression::Masks,
            },
        }
    }
}

impl fmt::Display for TextureRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.json_key())
    }
}
