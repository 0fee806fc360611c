//! PNG codec backed by the `image` crate

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat};
use meshbundle_core::{ImageTranscoder, RasterImage, Result};

use crate::textures::{TextureError, TextureResult};

/// Decodes and encodes PNG files as RGBA8 rasters
#[derive(Debug, Clone, Copy, Default)]
pub struct PngTranscoder;

impl PngTranscoder {
    fn decode_png(bytes: &[u8]) -> TextureResult<RasterImage> {
        let decoded = image::load(Cursor::new(bytes), ImageFormat::Png)?.to_rgba8();
        let (width, height) = decoded.dimensions();

        if width == 0 || height == 0 {
            return Err(TextureError::InvalidDimensions { width, height });
        }

        Ok(RasterImage {
            width,
            height,
            pixels: decoded.into_raw(),
        })
    }

    fn encode_png(image: &RasterImage) -> TextureResult<Vec<u8>> {
        let expected = image.width as usize * image.height as usize * RasterImage::CHANNELS;
        if image.width == 0 || image.height == 0 || image.pixels.len() != expected {
            return Err(TextureError::InvalidDimensions {
                width: image.width,
                height: image.height,
            });
        }

        let mut encoded = Vec::new();
        PngEncoder::new(&mut encoded).write_image(
            &image.pixels,
            image.width,
            image.height,
            ExtendedColorType::Rgba8,
        )?;
        Ok(encoded)
    }
}

impl ImageTranscoder for PngTranscoder {
    fn extension(&self) -> &'static str {
        "png"
    }

    fn decode(&self, bytes: &[u8]) -> Result<RasterImage> {
        Ok(Self::decode_png(bytes)?)
    }

    fn encode(&self, image: &RasterImage) -> Result<Vec<u8>> {
        Ok(Self::encode_png(image)?)
    }
}
