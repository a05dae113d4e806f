//! Host pixel buffer and TIFF encoding types

use crate::deconvolution::common::{CHANNEL_COUNT, DeconvolutionError, Dimensions, Result};

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    None,
    /// LZW compression (slow, good compression)
    Lzw,
    /// Deflate compression - fast level (good speed/size balance)
    DeflateFast,
    /// Deflate compression - balanced
    DeflateBalanced,
    /// Deflate compression - best compression (slower)
    DeflateBest,
}

/// Decoded RGB image with interleaved samples `[R, G, B, R, G, B, ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage<S> {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Interleaved pixel data, `3 * width * height` samples
    pub data: Vec<S>,
}

impl<S> RawImage<S> {
    pub fn new(width: usize, height: usize, data: Vec<S>) -> Result<Self> {
        if data.len() != CHANNEL_COUNT * width * height {
            return Err(DeconvolutionError::InvalidDimensions(width, height));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}
