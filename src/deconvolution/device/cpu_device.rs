//! Reference compute device running on the host.
//!
//! Buffers live in host memory and kernels execute synchronously inside
//! [`ComputeDevice::launch`], so every event is already complete when it is
//! returned. Used when no accelerator is available and as the baseline the
//! CUDA device is checked against.

use crate::deconvolution::common::{Channel, Dimensions};
use crate::deconvolution::device::backend::{
    ComputeDevice, DeviceError, DeviceFactory, Kernel, KernelArgs, TransferMode,
};
use crate::deconvolution::device::cpu_kernels;

#[derive(Debug, Clone, PartialEq)]
pub struct CpuBuffer(Vec<f32>);

impl CpuBuffer {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuShape([i32; 2]);

impl CpuShape {
    fn dimensions(&self) -> Result<Dimensions, DeviceError> {
        let [width, height] = self.0;
        if width <= 0 || height <= 0 {
            return Err(DeviceError::new(format!(
                "shape descriptor {width}x{height} was never written"
            )));
        }
        Ok(Dimensions::new(width as usize, height as usize))
    }
}

/// Completion marker; host work is finished before it is handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuEvent;

#[derive(Debug)]
pub struct CpuKernels;

#[derive(Debug, Default)]
pub struct CpuDevice;

impl CpuDevice {
    pub fn new() -> Self {
        Self
    }
}

fn check_len(what: &str, found: usize, expected: usize) -> Result<(), DeviceError> {
    if found != expected {
        return Err(DeviceError::new(format!(
            "{what} holds {found} samples, expected {expected}"
        )));
    }
    Ok(())
}

impl ComputeDevice for CpuDevice {
    type Buffer = CpuBuffer;
    type ShapeBuffer = CpuShape;
    type Kernels = CpuKernels;
    type Event = CpuEvent;

    fn name(&self) -> &str {
        "CPU/Rayon"
    }

    fn alloc(&self, _channel: Channel, len: usize) -> Result<CpuBuffer, DeviceError> {
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|e| DeviceError::new(e.to_string()))?;
        data.resize(len, 0.0);
        Ok(CpuBuffer(data))
    }

    fn alloc_shape(&self, _channel: Channel) -> Result<CpuShape, DeviceError> {
        Ok(CpuShape([0, 0]))
    }

    fn load_kernels(&self) -> Result<CpuKernels, DeviceError> {
        Ok(CpuKernels)
    }

    fn write(
        &self,
        _channel: Channel,
        dst: &mut CpuBuffer,
        src: &[f32],
        _mode: TransferMode,
    ) -> Result<CpuEvent, DeviceError> {
        check_len("destination buffer", dst.0.len(), src.len())?;
        dst.0.copy_from_slice(src);
        Ok(CpuEvent)
    }

    fn write_shape(
        &self,
        _channel: Channel,
        dst: &mut CpuShape,
        shape: [i32; 2],
    ) -> Result<CpuEvent, DeviceError> {
        dst.0 = shape;
        Ok(CpuEvent)
    }

    fn launch(
        &self,
        _kernels: &CpuKernels,
        kernel: Kernel,
        _channel: Channel,
        args: &mut KernelArgs<'_, Self>,
        _wait: &[CpuEvent],
    ) -> Result<CpuEvent, DeviceError> {
        let dims = args.dims.dimensions()?;
        let psf_dims = args.psf_dims.dimensions()?;
        if dims != args.extent {
            return Err(DeviceError::new(format!(
                "launch extent {} does not match device dimensions {}",
                args.extent, dims
            )));
        }

        let pixels = dims.pixel_count();
        check_len("source buffer", args.source.0.len(), pixels)?;
        check_len("target buffer", args.target.0.len(), pixels)?;
        check_len("original image", args.original.0.len(), pixels)?;
        check_len("scratch buffer", args.scratch.0.len(), pixels)?;
        check_len("PSF buffer", args.psf.0.len(), psf_dims.pixel_count())?;

        match kernel {
            Kernel::Convolution => cpu_kernels::convolute(
                &args.source.0,
                &mut args.scratch.0,
                &args.original.0,
                &args.psf.0,
                dims,
                psf_dims,
            ),
            Kernel::Deconvolution => cpu_kernels::deconvolute(
                &args.source.0,
                &mut args.target.0,
                &args.scratch.0,
                &args.psf.0,
                dims,
                psf_dims,
            ),
        }
        Ok(CpuEvent)
    }

    fn read(
        &self,
        _channel: Channel,
        src: &CpuBuffer,
        dst: &mut [f32],
        _wait: &[CpuEvent],
    ) -> Result<(), DeviceError> {
        check_len("host destination", dst.len(), src.0.len())?;
        dst.copy_from_slice(&src.0);
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CpuDeviceFactory;

impl DeviceFactory for CpuDeviceFactory {
    type Device = CpuDevice;

    fn create(&self) -> Result<CpuDevice, DeviceError> {
        Ok(CpuDevice::new())
    }
}
