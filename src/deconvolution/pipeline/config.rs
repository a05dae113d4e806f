//! Deconvolution run configuration

use crate::deconvolution::engine::IterationPlan;
use crate::deconvolution::tiff::TiffCompression;

/// Passes requested when the caller does not choose a count.
pub const DEFAULT_ITERATIONS: u32 = 10;

/// Output file written when no output path is given.
pub const DEFAULT_OUTPUT_FILENAME: &str = "deconvoluted.tiff";

/// Configuration for a deconvolution run
#[derive(Debug, Clone)]
pub struct DeconvolutionConfig {
    /// Requested pass count; odd values are rounded up to the next even one
    pub iterations: u32,
    /// Compression method for the output TIFF
    pub compression: TiffCompression,
    /// Predictor value for compression (typically 2 for horizontal differencing)
    pub predictor: Option<u16>,
    /// Whether to validate image dimensions before acquiring the device
    pub validate_dimensions: bool,
    /// Largest accepted side of the image and of the PSF, if any
    pub max_dimension: Option<usize>,
}

impl Default for DeconvolutionConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            compression: TiffCompression::None,
            predictor: None,
            validate_dimensions: true,
            max_dimension: None,
        }
    }
}

impl DeconvolutionConfig {
    pub fn builder() -> DeconvolutionConfigBuilder {
        DeconvolutionConfigBuilder::default()
    }

    pub fn plan(&self) -> IterationPlan {
        IterationPlan::new(self.iterations)
    }
}

/// Builder for DeconvolutionConfig
#[derive(Default)]
pub struct DeconvolutionConfigBuilder {
    iterations: Option<u32>,
    compression: Option<TiffCompression>,
    predictor: Option<Option<u16>>,
    validate_dimensions: Option<bool>,
    max_dimension: Option<Option<usize>>,
}

impl DeconvolutionConfigBuilder {
    pub fn iterations(mut self, iterations: u32) -> Self {
        self.iterations = Some(iterations);
        self
    }

    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn predictor(mut self, predictor: Option<u16>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn max_dimension(mut self, max: Option<usize>) -> Self {
        self.max_dimension = Some(max);
        self
    }

    pub fn build(self) -> DeconvolutionConfig {
        let default = DeconvolutionConfig::default();
        DeconvolutionConfig {
            iterations: self.iterations.unwrap_or(default.iterations),
            compression: self.compression.unwrap_or(default.compression),
            predictor: self.predictor.unwrap_or(default.predictor),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            max_dimension: self.max_dimension.unwrap_or(default.max_dimension),
        }
    }
}
