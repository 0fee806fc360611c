//! Texture post-processing for exported bundles
//!
//! Decodes exported PNG files to raw RGBA8, downscales them with a bilinear
//! filter and writes them back in place.

mod resample;
mod transcoder;

pub use resample::{resize, resize_file, ResizeOutcome};
pub use transcoder::PngTranscoder;

use meshbundle_storage::StorageError;
use thiserror::Error;

/// Texture processing errors
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Maximum dimension must be greater than zero")]
    ZeroMaxDimension,

    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Pixel buffer for {width}x{height} holds {actual} bytes, expected {expected}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

pub type TextureResult<T> = Result<T, TextureError>;

impl From<TextureError> for meshbundle_core::Error {
    fn from(err: TextureError) -> Self {
        match err {
            TextureError::Io(e) => meshbundle_core::Error::Io(e),
            TextureError::Storage(e) => e.into(),
            TextureError::Image(e) => meshbundle_core::Error::external("image codec", vec![e.to_string()]),
            other @ (TextureError::ZeroMaxDimension
            | TextureError::InvalidDimensions { .. }
            | TextureError::BufferSize { .. }) => {
                meshbundle_core::Error::invalid_argument(other.to_string())
            }
        }
    }
}
