//! Common types used across meshbundle
//!
//! Asset handles, relative keys, material parameters, imported mesh
//! objects and the raw raster buffer passed between codec and resampler.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Prefix of every project-local asset identifier
pub const VIRTUAL_ROOT: &str = "/Game/";

/// Separates a package path from its redundant object name
/// (`/Game/Hero/SK_Hero.SK_Hero`)
pub const OBJECT_DELIMITER: char = '.';

/// Kind tag of an asset handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    Mesh,
    Material,
    Texture,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetKind::Mesh => "mesh",
            AssetKind::Material => "material",
            AssetKind::Texture => "texture",
        };
        f.write_str(name)
    }
}

/// Reference to an asset owned by the scene-graph runtime
///
/// Identity is the fully-qualified identifier plus the kind tag. The
/// pipeline never owns the asset, it only reads from it and writes
/// derived files that point back to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef {
    pub path: String,
    pub kind: AssetKind,
}

impl AssetRef {
    pub fn new(path: impl Into<String>, kind: AssetKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn mesh(path: impl Into<String>) -> Self {
        Self::new(path, AssetKind::Mesh)
    }

    pub fn material(path: impl Into<String>) -> Self {
        Self::new(path, AssetKind::Material)
    }

    pub fn texture(path: impl Into<String>) -> Self {
        Self::new(path, AssetKind::Texture)
    }

    /// Short object name (`SK_Hero` for `/Game/Hero/SK_Hero.SK_Hero`)
    pub fn name(&self) -> &str {
        let leaf = self.path.rsplit(['/', '\\']).next().unwrap_or(&self.path);
        match leaf.rfind(OBJECT_DELIMITER) {
            Some(pos) if pos + 1 < leaf.len() => &leaf[pos + 1..],
            Some(pos) => &leaf[..pos],
            None => leaf,
        }
    }

    /// Relative key derived from the identifier
    pub fn relative_key(&self) -> RelativeKey {
        RelativeKey::from_identifier(&self.path)
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.path)
    }
}

/// Normalized, path-safe key derived from an asset identifier
///
/// Used both as the sub-path of exported files and as the cross-reference
/// string stored in manifests. Always uses `/` separators and never
/// starts with one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelativeKey(String);

impl RelativeKey {
    /// Derive the key for a fully-qualified identifier
    ///
    /// Drops the object-name suffix after the last delimiter of the final
    /// segment, strips [`VIRTUAL_ROOT`] and discards empty, `.` and `..`
    /// segments.
    pub fn from_identifier(identifier: &str) -> Self {
        let unified = identifier.trim().replace('\\', "/");

        let truncated = match unified.rfind('/') {
            Some(slash) => match unified[slash..].rfind(OBJECT_DELIMITER) {
                Some(dot) => &unified[..slash + dot],
                None => unified.as_str(),
            },
            None => match unified.rfind(OBJECT_DELIMITER) {
                Some(dot) => &unified[..dot],
                None => unified.as_str(),
            },
        };

        let stripped = truncated.strip_prefix(VIRTUAL_ROOT).unwrap_or(truncated);

        let segments: Vec<&str> = stripped
            .split('/')
            .filter(|s| !s.is_empty() && *s != "." && *s != "..")
            .collect();

        Self(segments.join("/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Key with a file suffix appended (`Hero/SK_Hero` + `.fbx`)
    pub fn with_suffix(&self, suffix: &str) -> String {
        format!("{}{}", self.0, suffix)
    }

    /// Directory part of the key, empty for top-level keys
    pub fn parent(&self) -> &str {
        match self.0.rfind('/') {
            Some(pos) => &self.0[..pos],
            None => "",
        }
    }
}

impl fmt::Display for RelativeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RelativeKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Handle of the actor whose components are exported
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorRef {
    pub name: String,
    pub path: String,
}

impl ActorRef {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// An actor handle with no identifier stands in for a null actor
    pub fn is_null(&self) -> bool {
        self.path.trim().is_empty()
    }
}

/// Skeletal mesh component attached to an actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshComponent {
    pub name: String,
    pub mesh: Option<AssetRef>,
}

impl MeshComponent {
    pub fn new(name: impl Into<String>, mesh: Option<AssetRef>) -> Self {
        Self {
            name: name.into(),
            mesh,
        }
    }
}

/// One material slot of a mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSlot {
    pub index: usize,
    pub name: String,
    pub material: Option<AssetRef>,
}

impl MaterialSlot {
    pub fn new(index: usize, name: impl Into<String>, material: Option<AssetRef>) -> Self {
        Self {
            index,
            name: name.into(),
            material,
        }
    }
}

/// Named float parameter of a material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarParameter {
    pub name: String,
    pub value: f32,
}

/// Linear RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LinearColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl LinearColor {
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for LinearColor {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Named color parameter of a material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorParameter {
    pub name: String,
    pub value: LinearColor,
}

/// Named texture parameter of a material; the texture may be unset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureParameter {
    pub name: String,
    pub texture: Option<AssetRef>,
}

/// Mesh object produced by a geometry import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedMesh {
    pub object_path: String,
    pub slots: Vec<MaterialSlot>,
}

/// Imported mesh, static or skeletal
///
/// Both kinds expose the same ordered slot list so the importer never has
/// to branch on the mesh type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MeshObject {
    Static(ImportedMesh),
    Skeletal(ImportedMesh),
}

impl MeshObject {
    fn inner(&self) -> &ImportedMesh {
        match self {
            MeshObject::Static(mesh) | MeshObject::Skeletal(mesh) => mesh,
        }
    }

    fn inner_mut(&mut self) -> &mut ImportedMesh {
        match self {
            MeshObject::Static(mesh) | MeshObject::Skeletal(mesh) => mesh,
        }
    }

    pub fn object_path(&self) -> &str {
        &self.inner().object_path
    }

    pub fn is_skeletal(&self) -> bool {
        matches!(self, MeshObject::Skeletal(_))
    }

    /// Material slots in slot-index order
    pub fn material_slots(&self) -> &[MaterialSlot] {
        &self.inner().slots
    }

    /// Assign a material to the slot at `index`
    pub fn set_slot_material(&mut self, index: usize, material: AssetRef) -> Result<()> {
        let object_path = self.object_path().to_string();
        let slot = self
            .inner_mut()
            .slots
            .iter_mut()
            .find(|slot| slot.index == index)
            .ok_or_else(|| {
                Error::invalid_argument(format!("{object_path} has no material slot {index}"))
            })?;
        slot.material = Some(material);
        Ok(())
    }
}

/// Raw RGBA8 raster, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RasterImage {
    /// Bytes per pixel
    pub const CHANNELS: usize = 4;

    /// Wrap an RGBA8 buffer, checking its length against the dimensions
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * Self::CHANNELS;
        if pixels.len() != expected {
            return Err(Error::invalid_argument(format!(
                "raster {width}x{height} needs {expected} bytes, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build an image by evaluating `f(x, y)` for every pixel
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * Self::CHANNELS);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = (y as usize * self.width as usize + x as usize) * Self::CHANNELS;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    pub fn fits_within(&self, max_dim: u32) -> bool {
        self.width <= max_dim && self.height <= max_dim
    }
}
