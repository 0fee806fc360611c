//! Collaborators and options shared by every export step

use meshbundle_core::{AssetExporter, ImageTranscoder, SceneGraph};
use meshbundle_storage::Storage;

use crate::options::ExportOptions;
use crate::textures::PngTranscoder;

/// Everything an export needs from the outside world
pub struct ExportContext<'a> {
    pub scene: &'a dyn SceneGraph,
    pub exporter: &'a dyn AssetExporter,
    pub storage: &'a dyn Storage,
    pub transcoder: &'a dyn ImageTranscoder,
    pub options: ExportOptions,
}

impl<'a> ExportContext<'a> {
    /// Context with default options and the PNG transcoder
    pub fn new(
        scene: &'a dyn SceneGraph,
        exporter: &'a dyn AssetExporter,
        storage: &'a dyn Storage,
    ) -> Self {
        Self {
            scene,
            exporter,
            storage,
            transcoder: &PngTranscoder,
            options: ExportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_transcoder(mut self, transcoder: &'a dyn ImageTranscoder) -> Self {
        self.transcoder = transcoder;
        self
    }

    /// File extension of exported textures, with the leading dot
    pub(crate) fn texture_suffix(&self) -> String {
        format!(".{}", self.transcoder.extension())
    }
}
