//! PSF deconvolution module
//!
//! Iterative deconvolution of a 3-channel image against a point-spread
//! function, with the passes executed on a compute device. Split into the
//! image store, the device layer, the iteration engine and the pipeline that
//! ties them together.

pub mod common;
pub mod device;
pub mod engine;
pub mod image_store;
pub mod pipeline;
pub mod tiff;


pub use common::{Channel, Channels, DecodeFailure, DeconvolutionError, Dimensions, Result};

pub use device::{
    ComputeDevice, CpuDevice, CpuDeviceFactory, CudaDevice, CudaDeviceFactory, DeviceError,
    DeviceFactory, Kernel,
};

pub use engine::{BufferRole, IterationPlan, WorkBuffer};

pub use image_store::{ImageStore, NormalizedImage};

pub use pipeline::{
    DEFAULT_ITERATIONS, DEFAULT_OUTPUT_FILENAME, DeconvolutionConfig, DeconvolutionConfigBuilder,
    DeconvolutionPipeline, DeconvolutionReport, PipelineTimings,
};

pub use tiff::{RawImage, StandardTiffReader, StandardTiffWriter, TiffCompression, TiffReader, TiffWriter};
