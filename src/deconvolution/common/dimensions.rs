use std::fmt;

use crate::deconvolution::common::error::{DeconvolutionError, Result};

/// Width and height of an image plane, fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: usize,
    pub height: usize,
}

impl Dimensions {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Number of samples in one channel plane.
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The `[width, height]` pair as stored in device shape buffers.
    pub fn to_device_shape(&self) -> Result<[i32; 2]> {
        let width = i32::try_from(self.width)
            .map_err(|_| DeconvolutionError::InvalidDimensions(self.width, self.height))?;
        let height = i32::try_from(self.height)
            .map_err(|_| DeconvolutionError::InvalidDimensions(self.width, self.height))?;
        Ok([width, height])
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
