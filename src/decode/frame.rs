use std::path::Path;

use crate::{
    config::{ConvertConfig, DEFAULT_PALETTE_SIZE},
    decode::quantize::{QuantizedImage, quantize_median_cut},
    foundation::error::{ConvertError, ConvertResult},
};

/// Turns one input file into one quantized frame.
///
/// Called concurrently from every pool worker, so implementations must be stateless or
/// internally synchronized.
pub trait FrameDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> ConvertResult<QuantizedImage>;
}

impl<F> FrameDecoder for F
where
    F: Fn(&Path) -> ConvertResult<QuantizedImage> + Send + Sync,
{
    fn decode(&self, path: &Path) -> ConvertResult<QuantizedImage> {
        self(path)
    }
}

/// Decodes any raster format `image` understands and median-cut quantizes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaletteDecoder {
    palette_size: usize,
}

impl PaletteDecoder {
    pub fn new(palette_size: usize) -> ConvertResult<Self> {
        ConvertConfig::default()
            .with_palette_size(palette_size)
            .validate()?;
        Ok(Self { palette_size })
    }

    pub fn palette_size(&self) -> usize {
        self.palette_size
    }
}

impl Default for PaletteDecoder {
    fn default() -> Self {
        Self {
            palette_size: DEFAULT_PALETTE_SIZE,
        }
    }
}

impl FrameDecoder for PaletteDecoder {
    fn decode(&self, path: &Path) -> ConvertResult<QuantizedImage> {
        // The file is read whole and closed before decoding starts.
        let bytes = std::fs::read(path).map_err(|source| ConvertError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        decode_frame(&bytes, self.palette_size).map_err(|source| ConvertError::Format {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Decode encoded image bytes and quantize to `palette_size` colors.
pub fn decode_frame(bytes: &[u8], palette_size: usize) -> image::ImageResult<QuantizedImage> {
    let dyn_img = image::load_from_memory(bytes)?;
    let rgba = dyn_img.to_rgba8();
    Ok(quantize_median_cut(&rgba, palette_size))
}

#[cfg(test)]
#[path = "../../tests/unit/decode/frame.rs"]
mod tests;
