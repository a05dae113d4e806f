//! Pipeline module
//!
//! Orchestrates a full run: decode and normalize, acquire the device, run the
//! passes, read back, release, and write the result.

mod config;
mod deconvolve;
mod session;
mod timing;

pub use config::{
    DEFAULT_ITERATIONS, DEFAULT_OUTPUT_FILENAME, DeconvolutionConfig, DeconvolutionConfigBuilder,
};
pub use deconvolve::{DeconvolutionPipeline, DeconvolutionReport};
pub use session::Session;
pub use timing::{PipelineTimings, StepTiming, Timer};
