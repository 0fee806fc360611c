//! Bilinear downscaling of RGBA8 rasters

use std::path::Path;

use meshbundle_core::{ImageTranscoder, RasterImage, Result};
use meshbundle_storage::Storage;

use crate::textures::{TextureError, TextureResult};

/// What `resize_file` did to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeOutcome {
    /// Already within the limit, file untouched
    Unchanged { width: u32, height: u32 },
    /// Downscaled and written back
    Resized { from: (u32, u32), to: (u32, u32) },
}

/// Downscale `image` so that neither side exceeds `max_dim`
///
/// Images already within the limit are returned as is. Otherwise the
/// aspect ratio is kept (`scale = min(max/w, max/h)`) and every destination
/// pixel is a bilinear blend of the four source pixels around its centre.
/// No prefiltering is done, so large reductions alias.
pub fn resize(image: RasterImage, max_dim: u32) -> TextureResult<RasterImage> {
    if max_dim == 0 {
        return Err(TextureError::ZeroMaxDimension);
    }
    if image.width == 0 || image.height == 0 {
        return Err(TextureError::InvalidDimensions {
            width: image.width,
            height: image.height,
        });
    }
    let expected = image.width as usize * image.height as usize * RasterImage::CHANNELS;
    if image.pixels.len() != expected {
        return Err(TextureError::BufferSize {
            width: image.width,
            height: image.height,
            expected,
            actual: image.pixels.len(),
        });
    }
    if image.fits_within(max_dim) {
        return Ok(image);
    }

    let (width, height) = (image.width, image.height);
    let scale = f32::min(max_dim as f32 / width as f32, max_dim as f32 / height as f32);
    let new_width = ((width as f32 * scale).round() as u32).clamp(1, max_dim);
    let new_height = ((height as f32 * scale).round() as u32).clamp(1, max_dim);

    let max_x = width as i64 - 1;
    let max_y = height as i64 - 1;
    let stride = width as usize;

    Ok(RasterImage::from_fn(new_width, new_height, |x, y| {
        let src_x = (x as f32 + 0.5) / scale - 0.5;
        let src_y = (y as f32 + 0.5) / scale - 0.5;

        let x0 = (src_x.floor() as i64).clamp(0, max_x);
        let y0 = (src_y.floor() as i64).clamp(0, max_y);
        let x1 = (x0 + 1).clamp(0, max_x);
        let y1 = (y0 + 1).clamp(0, max_y);

        let fx = (src_x - x0 as f32).clamp(0.0, 1.0);
        let fy = (src_y - y0 as f32).clamp(0.0, 1.0);

        let at = |px: i64, py: i64| {
            let idx = (py as usize * stride + px as usize) * RasterImage::CHANNELS;
            &image.pixels[idx..idx + RasterImage::CHANNELS]
        };
        let (c00, c10, c01, c11) = (at(x0, y0), at(x1, y0), at(x0, y1), at(x1, y1));

        let mut out = [0u8; 4];
        for (channel, value) in out.iter_mut().enumerate() {
            let blended = f32::from(c00[channel]) * (1.0 - fx) * (1.0 - fy)
                + f32::from(c10[channel]) * fx * (1.0 - fy)
                + f32::from(c01[channel]) * (1.0 - fx) * fy
                + f32::from(c11[channel]) * fx * fy;
            *value = blended.round().clamp(0.0, 255.0) as u8;
        }
        out
    }))
}

/// Decode `path`, downscale it to `max_dim` and overwrite it in place
pub fn resize_file(
    storage: &dyn Storage,
    transcoder: &dyn ImageTranscoder,
    path: &Path,
    max_dim: u32,
) -> Result<ResizeOutcome> {
    if max_dim == 0 {
        return Err(TextureError::ZeroMaxDimension.into());
    }

    let bytes = storage.read(path)?;
    let image = transcoder.decode(&bytes)?;
    let from = (image.width, image.height);

    if image.fits_within(max_dim) {
        return Ok(ResizeOutcome::Unchanged {
            width: from.0,
            height: from.1,
        });
    }

    let resized = resize(image, max_dim)?;
    let encoded = transcoder.encode(&resized)?;
    storage.write(path, &encoded)?;

    Ok(ResizeOutcome::Resized {
        from,
        to: (resized.width, resized.height),
    })
}
