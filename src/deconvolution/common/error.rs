use std::path::PathBuf;

use thiserror::Error;

use crate::deconvolution::common::channels::Channel;
use crate::deconvolution::device::{DeviceError, Kernel};

/// Reasons a TIFF file could not be turned into a [`RawImage`](crate::deconvolution::RawImage).
#[derive(Error, Debug)]
pub enum DecodeFailure {
    #[error("could not read file: {0}")]
    Unreadable(#[from] std::io::Error),

    #[error("malformed TIFF: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("expected {expected}, found {found}")]
    UnsupportedLayout { expected: &'static str, found: String },

    #[error("sample count {found} does not match {width}x{height}x3")]
    SampleCount {
        found: usize,
        width: usize,
        height: usize,
    },
}

#[derive(Error, Debug)]
pub enum DeconvolutionError {
    #[error("Failed to decode {path}: {source}", path = .path.display())]
    DecodeError {
        path: PathBuf,
        #[source]
        source: DecodeFailure,
    },

    #[error("PSF {channel} channel has zero total intensity and cannot be normalized")]
    DegeneratePsf { channel: Channel },

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Compute device unavailable: {0}")]
    DeviceUnavailable(#[source] DeviceError),

    #[error("Failed to allocate {resource}: {reason}")]
    AllocationError { resource: String, reason: String },

    #[error("Failed to build compute kernels: {0}")]
    KernelBuildError(#[source] DeviceError),

    #[error("{kernel} kernel failed on pass {pass}, {channel} channel: {source}")]
    KernelExecutionError {
        pass: usize,
        channel: Channel,
        kernel: Kernel,
        #[source]
        source: DeviceError,
    },

    #[error("Failed to transfer {resource} for {channel} channel: {source}")]
    TransferError {
        resource: &'static str,
        channel: Channel,
        #[source]
        source: DeviceError,
    },

    #[error("Failed to encode TIFF image: {0}")]
    EncodeError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DeconvolutionError>;
