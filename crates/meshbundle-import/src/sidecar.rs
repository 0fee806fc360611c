//! Slot sidecar: `<mesh>.json` next to the mesh file
//!
//! ```json
//! {
//!   "Skin": { "Classified": { "Diffuse": "C:/Export/T_Skin_D.png", "Normal": "..." } },
//!   "Cloth": { "Classified": { "Roughness": "..." } }
//! }
//! ```
//!
//! Top-level keys are material slot names. Unknown roles are ignored;
//! a slot whose `Classified` object is missing or not an object is kept
//! as [`SlotEntry::Malformed`] so the importer can report it.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use meshbundle_core::{Error, Result};
use meshbundle_storage::Storage;
use serde_json::Value;

use crate::roles::TextureRole;

const CLASSIFIED_KEY: &str = "Classified";

/// Texture files of one slot, by role
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedTextures {
    files: BTreeMap<TextureRole, String>,
}

impl ClassifiedTextures {
    pub fn get(&self, role: TextureRole) -> Option<&str> {
        self.files.get(&role).map(String::as_str)
    }

    /// Roles present, in binding order
    pub fn iter(&self) -> impl Iterator<Item = (TextureRole, &str)> {
        self.files.iter().map(|(role, file)| (*role, file.as_str()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Sidecar entry for one slot name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotEntry {
    Classified(ClassifiedTextures),
    Malformed { reason: String },
}

/// Parsed sidecar
#[derive(Debug, Clone, Default)]
pub struct Sidecar {
    slots: HashMap<String, SlotEntry>,
}

impl Sidecar {
    /// Path of the sidecar belonging to a mesh file
    pub fn path_for(mesh_file: &Path) -> std::path::PathBuf {
        mesh_file.with_extension("json")
    }

    /// Parse sidecar text; `path` is only used in error messages
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(text).map_err(|e| Error::parse(path, e))?;
        let Value::Object(entries) = root else {
            return Err(Error::parse(path, "sidecar root is not an object"));
        };

        let slots = entries
            .into_iter()
            .map(|(slot, value)| (slot, Self::parse_slot(&value)))
            .collect();

        Ok(Self { slots })
    }

    fn parse_slot(value: &Value) -> SlotEntry {
        match value.get(CLASSIFIED_KEY) {
            Some(Value::Object(classified)) => {
                let files = TextureRole::ALL
                    .into_iter()
                    .filter_map(|role| match classified.get(role.json_key()) {
                        Some(Value::String(file)) if !file.trim().is_empty() => {
                            Some((role, file.clone()))
                        }
                        _ => None,
                    })
                    .collect();
                SlotEntry::Classified(ClassifiedTextures { files })
            }
            Some(_) => SlotEntry::Malformed {
                reason: format!("{CLASSIFIED_KEY} is not an object"),
            },
            None => SlotEntry::Malformed {
                reason: format!("missing {CLASSIFIED_KEY}"),
            },
        }
    }

    /// Load the sidecar at `path`; `Ok(None)` when there is none
    pub fn load(storage: &dyn Storage, path: &Path) -> Result<Option<Self>> {
        if !storage.exists(path) {
            return Ok(None);
        }
        let text = storage
            .read_to_string(path)
            .map_err(|e| Error::parse(path, e))?;
        Self::parse(path, &text).map(Some)
    }

    pub fn slot(&self, name: &str) -> Option<&SlotEntry> {
        self.slots.get(name)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "Skin": { "Classified": { "Diffuse": "/src/T_Skin_D.png", "Normal": "/src/T_Skin_N.png", "Emissive": "/src/x.png" } },
        "Cloth": { "Classified": { "Roughness": "/src/T_Cloth_R.png", "Metallic": 3 } },
        "Eyes": { "Raw": [] },
        "Hair": { "Classified": "T_Hair.png" }
    }"#;

    #[test]
    fn test_parse_roles() {
        let sidecar = Sidecar::parse(Path::new("Hero.json"), SAMPLE).unwrap();
        assert_eq!(sidecar.len(), 4);

        let Some(SlotEntry::Classified(skin)) = sidecar.slot("Skin") else {
            panic!("Skin should be classified");
        };
        assert_eq!(skin.get(TextureRole::Diffuse), Some("/src/T_Skin_D.png"));
        assert_eq!(skin.get(TextureRole::Normal), Some("/src/T_Skin_N.png"));
        assert_eq!(skin.len(), 2);

        let Some(SlotEntry::Classified(cloth)) = sidecar.slot("Cloth") else {
            panic!("Cloth should be classified");
        };
        let roles: Vec<_> = cloth.iter().map(|(role, _)| role).collect();
        assert_eq!(roles, vec![TextureRole::Roughness]);
    }

    #[test]
    fn test_malformed_slots() {
        let sidecar = Sidecar::parse(Path::new("Hero.json"), SAMPLE).unwrap();
        assert!(matches!(sidecar.slot("Eyes"), Some(SlotEntry::Malformed { .. })));
        assert!(matches!(sidecar.slot("Hair"), Some(SlotEntry::Malformed { .. })));
        assert!(sidecar.slot("Missing").is_none());
    }

    #[test]
    fn test_parse_errors() {
        let err = Sidecar::parse(Path::new("Hero.json"), "{ broken").unwrap_err();
        assert!(err.is_parse_error());

        let err = Sidecar::parse(Path::new("Hero.json"), "[1, 2]").unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_path_for() {
        assert_eq!(
            Sidecar::path_for(Path::new("/src/Hero.fbx")),
            Path::new("/src/Hero.json")
        );
    }
}
