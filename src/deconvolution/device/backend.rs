use std::fmt;

use thiserror::Error;

use crate::deconvolution::common::{Channel, Dimensions};

/// Failure reported by a compute device, before it is attributed to a
/// pipeline stage.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct DeviceError(pub String);

impl DeviceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// The two entry points every kernel bundle provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kernel {
    /// Blurs the current estimate with the PSF and stores the correction
    /// ratio against the original image in the scratch buffer.
    Convolution,
    /// Applies the correction ratio to the current estimate, writing the next
    /// estimate into the target buffer.
    Deconvolution,
}

impl Kernel {
    /// Name of the entry point inside the kernel source.
    pub fn entry_point(self) -> &'static str {
        match self {
            Kernel::Convolution => "convolute",
            Kernel::Deconvolution => "deconvolute",
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.entry_point())
    }
}

/// Host-to-device write visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// Returns once the data is visible to every later device operation.
    Blocking,
    /// Returns immediately; completion is tracked by the returned event.
    Async,
}

/// Buffers bound to one kernel invocation for one channel.
pub struct KernelArgs<'a, D: ComputeDevice + ?Sized> {
    pub source: &'a D::Buffer,
    pub target: &'a mut D::Buffer,
    pub original: &'a D::Buffer,
    pub psf: &'a D::Buffer,
    pub scratch: &'a mut D::Buffer,
    pub dims: &'a D::ShapeBuffer,
    pub psf_dims: &'a D::ShapeBuffer,
    /// Host copy of the image dimensions, used for launch geometry.
    pub extent: Dimensions,
}

/// An opened accelerator: a context plus one command queue per channel.
///
/// All operations are enqueued on the queue of the given channel. Events
/// returned by one operation can be handed to later operations as a
/// wait-list, on any channel.
pub trait ComputeDevice {
    type Buffer;
    type ShapeBuffer;
    type Kernels;
    type Event;

    fn name(&self) -> &str;

    /// Allocates a zeroed `f32` buffer of `len` samples.
    fn alloc(&self, channel: Channel, len: usize) -> Result<Self::Buffer, DeviceError>;

    /// Allocates a `[width, height]` shape descriptor.
    fn alloc_shape(&self, channel: Channel) -> Result<Self::ShapeBuffer, DeviceError>;

    /// Builds the `convolute`/`deconvolute` kernel pair.
    fn load_kernels(&self) -> Result<Self::Kernels, DeviceError>;

    fn write(
        &self,
        channel: Channel,
        dst: &mut Self::Buffer,
        src: &[f32],
        mode: TransferMode,
    ) -> Result<Self::Event, DeviceError>;

    /// Asynchronously writes a shape descriptor.
    fn write_shape(
        &self,
        channel: Channel,
        dst: &mut Self::ShapeBuffer,
        shape: [i32; 2],
    ) -> Result<Self::Event, DeviceError>;

    /// Enqueues one kernel once every event in `wait` has completed.
    fn launch(
        &self,
        kernels: &Self::Kernels,
        kernel: Kernel,
        channel: Channel,
        args: &mut KernelArgs<'_, Self>,
        wait: &[Self::Event],
    ) -> Result<Self::Event, DeviceError>;

    /// Blocking readback once every event in `wait` has completed.
    fn read(
        &self,
        channel: Channel,
        src: &Self::Buffer,
        dst: &mut [f32],
        wait: &[Self::Event],
    ) -> Result<(), DeviceError>;
}

/// Opens a [`ComputeDevice`] for a single run.
pub trait DeviceFactory {
    type Device: ComputeDevice;

    fn create(&self) -> Result<Self::Device, DeviceError>;
}
