//! In-memory collaborators for export tests
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use meshbundle_core::{
    ActorRef, AssetExportOptions, AssetExporter, AssetKind, AssetRef, Error, ExportTaskOutcome,
    ImageTranscoder, LinearColor, MaterialSlot, MeshComponent, RasterImage, Result,
    ScalarParameter, SceneGraph, TextureParameter, VectorParameter,
};
use meshbundle_export::PngTranscoder;
use meshbundle_storage::{MemoryStorage, Storage};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

pub const BODY: &str = "/Game/Characters/Hero/SK_Body.SK_Body";
pub const HEAD: &str = "/Game/Characters/Hero/SK_Head.SK_Head";
pub const SKIN: &str = "/Game/Characters/Hero/M_Skin.M_Skin";
pub const CLOTH: &str = "/Game/Characters/Hero/M_Cloth.M_Cloth";
pub const T_SKIN: &str = "/Game/Characters/Hero/Textures/T_Skin.T_Skin";
pub const T_CLOTH: &str = "/Game/Characters/Hero/Textures/T_Cloth.T_Cloth";
pub const T_SHARED: &str = "/Game/Shared/T_Noise.T_Noise";

pub fn hero() -> ActorRef {
    ActorRef::new("Hero", "/Game/Maps/Arena.Arena:PersistentLevel.Hero_1")
}

/// Scene graph backed by plain maps
#[derive(Debug, Default)]
pub struct FakeScene {
    components: Vec<MeshComponent>,
    slots: HashMap<AssetRef, Vec<MaterialSlot>>,
    scalars: HashMap<AssetRef, Vec<ScalarParameter>>,
    vectors: HashMap<AssetRef, Vec<VectorParameter>>,
    textures: HashMap<AssetRef, Vec<TextureParameter>>,
    broken_materials: HashSet<AssetRef>,
}

impl FakeScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two meshes, three components on SK_Body, two materials sharing a texture
    pub fn hero() -> Self {
        Self::new()
            .with_component("Body", Some(BODY))
            .with_component("Head", Some(HEAD))
            .with_component("BodyOverlay", Some(BODY))
            .with_component("Attachment", None)
            .with_slot(BODY, 0, "Skin", Some(SKIN))
            .with_slot(BODY, 1, "Cloth", Some(CLOTH))
            .with_slot(BODY, 2, "Unused", None)
            .with_slot(HEAD, 0, "Skin", Some(SKIN))
            .with_scalar(SKIN, "Roughness", 0.4)
            .with_vector(SKIN, "Tint", LinearColor::new(1.0, 0.8, 0.7, 1.0))
            .with_texture(SKIN, "BaseColor", Some(T_SKIN))
            .with_texture(SKIN, "Detail", Some(T_SHARED))
            .with_texture(SKIN, "Mask", None)
            .with_texture(CLOTH, "BaseColor", Some(T_CLOTH))
            .with_texture(CLOTH, "Detail", Some(T_SHARED))
    }

    pub fn with_component(mut self, name: &str, mesh: Option<&str>) -> Self {
        self.components.push(MeshComponent::new(name, mesh.map(AssetRef::mesh)));
        self
    }

    pub fn with_slot(mut self, mesh: &str, index: usize, name: &str, material: Option<&str>) -> Self {
        self.slots
            .entry(AssetRef::mesh(mesh))
            .or_default()
            .push(MaterialSlot::new(index, name, material.map(AssetRef::material)));
        self
    }

    pub fn with_scalar(mut self, material: &str, name: &str, value: f32) -> Self {
        self.scalars
            .entry(AssetRef::material(material))
            .or_default()
            .push(ScalarParameter { name: name.into(), value });
        self
    }

    pub fn with_vector(mut self, material: &str, name: &str, value: LinearColor) -> Self {
        self.vectors
            .entry(AssetRef::material(material))
            .or_default()
            .push(VectorParameter { name: name.into(), value });
        self
    }

    pub fn with_texture(mut self, material: &str, name: &str, texture: Option<&str>) -> Self {
        self.textures
            .entry(AssetRef::material(material))
            .or_default()
            .push(TextureParameter {
                name: name.into(),
                texture: texture.map(AssetRef::texture),
            });
        self
    }

    /// Parameter enumeration fails for `material`
    pub fn with_broken_material(mut self, material: &str) -> Self {
        self.broken_materials.insert(AssetRef::material(material));
        self
    }

    fn check(&self, material: &AssetRef) -> Result<()> {
        if self.broken_materials.contains(material) {
            Err(Error::external("scene graph", vec![format!("{} is not loaded", material.path)]))
        } else {
            Ok(())
        }
    }
}

impl SceneGraph for FakeScene {
    fn mesh_components(&self, _actor: &ActorRef) -> Result<Vec<MeshComponent>> {
        Ok(self.components.clone())
    }

    fn material_slots(&self, mesh: &AssetRef) -> Result<Vec<MaterialSlot>> {
        Ok(self.slots.get(mesh).cloned().unwrap_or_default())
    }

    fn scalar_parameters(&self, material: &AssetRef) -> Result<Vec<ScalarParameter>> {
        self.check(material)?;
        Ok(self.scalars.get(material).cloned().unwrap_or_default())
    }

    fn vector_parameters(&self, material: &AssetRef) -> Result<Vec<VectorParameter>> {
        self.check(material)?;
        Ok(self.vectors.get(material).cloned().unwrap_or_default())
    }

    fn texture_parameters(&self, material: &AssetRef) -> Result<Vec<TextureParameter>> {
        self.check(material)?;
        Ok(self.textures.get(material).cloned().unwrap_or_default())
    }
}

/// Asset exporter that writes placeholder files into a `MemoryStorage`
/// and records every call
pub struct RecordingExporter<'a> {
    storage: &'a MemoryStorage,
    calls: RefCell<Vec<(AssetRef, PathBuf)>>,
    failing: HashSet<String>,
    texture_sizes: HashMap<String, (u32, u32)>,
}

impl<'a> RecordingExporter<'a> {
    pub fn new(storage: &'a MemoryStorage) -> Self {
        Self {
            storage,
            calls: RefCell::new(Vec::new()),
            failing: HashSet::new(),
            texture_sizes: HashMap::new(),
        }
    }

    /// Exports of `asset_path` report an error
    pub fn failing(mut self, asset_path: &str) -> Self {
        self.failing.insert(asset_path.to_string());
        self
    }

    /// Exported PNG dimensions for `texture_path` (default 8x8)
    pub fn with_texture_size(mut self, texture_path: &str, width: u32, height: u32) -> Self {
        self.texture_sizes.insert(texture_path.to_string(), (width, height));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn calls_for(&self, asset_path: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|(asset, _)| asset.path == asset_path)
            .count()
    }

    pub fn destinations(&self) -> Vec<PathBuf> {
        self.calls.borrow().iter().map(|(_, dest)| dest.clone()).collect()
    }

    fn payload(&self, asset: &AssetRef) -> Result<Vec<u8>> {
        match asset.kind {
            AssetKind::Texture => {
                let (width, height) = self.texture_sizes.get(&asset.path).copied().unwrap_or((8, 8));
                let image = RasterImage::from_fn(width, height, |x, y| [(x % 256) as u8, (y % 256) as u8, 128, 255]);
                PngTranscoder.encode(&image)
            }
            AssetKind::Mesh => Ok(format!("FBX {}", asset.path).into_bytes()),
            AssetKind::Material => Err(Error::invalid_argument("materials are not exported as files")),
        }
    }
}

impl AssetExporter for RecordingExporter<'_> {
    fn export(&self, asset: &AssetRef, destination: &Path, _options: &AssetExportOptions) -> ExportTaskOutcome {
        self.calls
            .borrow_mut()
            .push((asset.clone(), destination.to_path_buf()));

        if self.failing.contains(&asset.path) {
            return ExportTaskOutcome::failed(format!("cannot export {}", asset.path));
        }

        let written = self
            .payload(asset)
            .and_then(|bytes| Ok(self.storage.write(destination, &bytes)?));
        match written {
            Ok(()) => ExportTaskOutcome::success(),
            Err(e) => ExportTaskOutcome::failed(e.to_string()),
        }
    }
}

/// Captured `(level, message)` pairs
#[derive(Clone, Default)]
pub struct CapturedEvents(Arc<Mutex<Vec<(Level, String)>>>);

impl CapturedEvents {
    pub fn contains(&self, level: Level, message: &str) -> bool {
        self.0
            .lock()
            .unwrap()
            .iter()
            .any(|(l, m)| *l == level && m.contains(message))
    }

    pub fn count(&self, level: Level) -> usize {
        self.0.lock().unwrap().iter().filter(|(l, _)| *l == level).count()
    }
}

/// Layer pushing every event into a `CapturedEvents`
pub struct CaptureLayer(pub CapturedEvents);

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.0 .0.lock().unwrap().push((*event.metadata().level(), visitor.0));
    }
}

/// Run `f` with a capturing subscriber installed on this thread
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, CapturedEvents) {
    use tracing_subscriber::prelude::*;

    let events = CapturedEvents::default();
    let subscriber = tracing_subscriber::registry().with(CaptureLayer(events.clone()));
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, events)
}

/// Decoded dimensions of a PNG stored at `path`
pub fn png_dimensions(storage: &MemoryStorage, path: &str) -> (u32, u32) {
    let image = PngTranscoder.decode(&storage.read(Path::new(path)).unwrap()).unwrap();
    (image.width, image.height)
}

/// Transcoder whose decoded rasters claim more pixels than they carry
pub struct TruncatingTranscoder;

impl ImageTranscoder for TruncatingTranscoder {
    fn extension(&self) -> &'static str {
        "png"
    }

    fn decode(&self, _bytes: &[u8]) -> Result<RasterImage> {
        Ok(RasterImage {
            width: 64,
            height: 64,
            pixels: vec![0; 16],
        })
    }

    fn encode(&self, image: &RasterImage) -> Result<Vec<u8>> {
        PngTranscoder.encode(image)
    }
}
