use tracing::debug;

use crate::deconvolution::common::{Channel, Channels, DeconvolutionError, Dimensions, Result};
use crate::deconvolution::device::backend::{ComputeDevice, DeviceError, KernelArgs};
use crate::deconvolution::engine::{BufferRole, WorkBuffer};

/// Device-resident regions of one channel.
pub struct ChannelBuffers<D: ComputeDevice> {
    work_a: D::Buffer,
    work_b: D::Buffer,
    original: D::Buffer,
    psf: D::Buffer,
    scratch: D::Buffer,
    dims: D::ShapeBuffer,
    psf_dims: D::ShapeBuffer,
}

fn allocation_error(resource: &str, channel: Channel, e: DeviceError) -> DeconvolutionError {
    DeconvolutionError::AllocationError {
        resource: format!("device {resource} ({channel})"),
        reason: e.to_string(),
    }
}

impl<D: ComputeDevice> ChannelBuffers<D> {
    fn allocate(device: &D, channel: Channel, dims: Dimensions, psf_dims: Dimensions) -> Result<Self> {
        let image = |resource: &str| {
            device
                .alloc(channel, dims.pixel_count())
                .map_err(|e| allocation_error(resource, channel, e))
        };

        Ok(Self {
            work_a: image("work buffer A")?,
            work_b: image("work buffer B")?,
            original: image("original image")?,
            psf: device
                .alloc(channel, psf_dims.pixel_count())
                .map_err(|e| allocation_error("PSF", channel, e))?,
            scratch: image("scratch buffer")?,
            dims: device
                .alloc_shape(channel)
                .map_err(|e| allocation_error("image dimensions", channel, e))?,
            psf_dims: device
                .alloc_shape(channel)
                .map_err(|e| allocation_error("PSF dimensions", channel, e))?,
        })
    }

    pub fn work(&self, buffer: WorkBuffer) -> &D::Buffer {
        match buffer {
            WorkBuffer::A => &self.work_a,
            WorkBuffer::B => &self.work_b,
        }
    }

    pub fn work_mut(&mut self, buffer: WorkBuffer) -> &mut D::Buffer {
        match buffer {
            WorkBuffer::A => &mut self.work_a,
            WorkBuffer::B => &mut self.work_b,
        }
    }

    pub fn original_mut(&mut self) -> &mut D::Buffer {
        &mut self.original
    }

    pub fn psf_mut(&mut self) -> &mut D::Buffer {
        &mut self.psf
    }

    pub fn dims_mut(&mut self) -> &mut D::ShapeBuffer {
        &mut self.dims
    }

    pub fn psf_dims_mut(&mut self) -> &mut D::ShapeBuffer {
        &mut self.psf_dims
    }

    /// Binds the buffers of this channel for a pass with the given role.
    pub fn kernel_args(&mut self, role: BufferRole, extent: Dimensions) -> KernelArgs<'_, D> {
        let Self {
            work_a,
            work_b,
            original,
            psf,
            scratch,
            dims,
            psf_dims,
        } = self;

        let (source, target) = match role {
            BufferRole::ASource => (&*work_a, work_b),
            BufferRole::BSource => (&*work_b, work_a),
        };

        KernelArgs {
            source,
            target,
            original,
            psf,
            scratch,
            dims,
            psf_dims,
            extent,
        }
    }
}

/// All device buffers of a run, exclusively owned.
///
/// Dropping the set releases every buffer of every channel.
pub struct DeviceBufferSet<D: ComputeDevice> {
    dims: Dimensions,
    psf_dims: Dimensions,
    channels: Channels<ChannelBuffers<D>>,
}

impl<D: ComputeDevice> DeviceBufferSet<D> {
    /// Allocates every buffer for every channel.
    ///
    /// If any allocation fails, the buffers already allocated are released
    /// before the error is returned.
    pub fn allocate(device: &D, dims: Dimensions, psf_dims: Dimensions) -> Result<Self> {
        if dims.is_empty() {
            return Err(DeconvolutionError::InvalidDimensions(dims.width, dims.height));
        }
        if psf_dims.is_empty() {
            return Err(DeconvolutionError::InvalidDimensions(psf_dims.width, psf_dims.height));
        }

        let channels =
            Channels::try_from_fn(|channel| ChannelBuffers::allocate(device, channel, dims, psf_dims))?;
        debug!(image = %dims, psf = %psf_dims, device = device.name(), "Allocated device buffers");

        Ok(Self {
            dims,
            psf_dims,
            channels,
        })
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub fn psf_dimensions(&self) -> Dimensions {
        self.psf_dims
    }

    pub fn channel(&self, channel: Channel) -> &ChannelBuffers<D> {
        &self.channels[channel]
    }

    pub fn channel_mut(&mut self, channel: Channel) -> &mut ChannelBuffers<D> {
        &mut self.channels[channel]
    }
}
