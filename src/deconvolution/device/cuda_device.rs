use std::sync::Arc;

use cudarc::driver::{
    CudaContext, CudaEvent, CudaFunction, CudaModule, CudaSlice, CudaStream, DriverError,
    LaunchConfig, PushKernelArg,
};
use cudarc::nvrtc::{CompileError, compile_ptx};
use tracing::{debug, info};

use crate::deconvolution::common::{Channel, Channels};
use crate::deconvolution::device::backend::{
    ComputeDevice, DeviceError, DeviceFactory, Kernel, KernelArgs, TransferMode,
};

const KERNEL_SOURCE: &str = include_str!("kernels/deconvolute.cu");

/// Threads per block along each axis of the 2D launch grid.
const BLOCK_SIDE: u32 = 16;

impl From<DriverError> for DeviceError {
    fn from(e: DriverError) -> Self {
        DeviceError::new(format!("CUDA driver: {e:?}"))
    }
}

impl From<CompileError> for DeviceError {
    fn from(e: CompileError) -> Self {
        DeviceError::new(format!("NVRTC: {e:?}"))
    }
}

/// Compiled `convolute`/`deconvolute` functions.
///
/// The functions are declared before the module so they are released first.
pub struct CudaKernels {
    convolute: CudaFunction,
    deconvolute: CudaFunction,
    _module: Arc<CudaModule>,
}

/// CUDA context with one stream per channel.
///
/// Channels are enqueued on separate streams so their kernels can overlap;
/// cross-channel ordering only happens through events.
pub struct CudaDevice {
    streams: Channels<Arc<CudaStream>>,
    context: Arc<CudaContext>,
    name: String,
}

impl CudaDevice {
    pub fn new(ordinal: usize) -> Result<Self, DeviceError> {
        let context = CudaContext::new(ordinal)?;
        let streams = Channels::try_from_fn(|_| context.new_stream())?;
        let name = format!("CUDA device {ordinal}");
        info!("Opened {} with {} streams", name, Channel::ALL.len());

        Ok(Self {
            streams,
            context,
            name,
        })
    }

    fn stream(&self, channel: Channel) -> &Arc<CudaStream> {
        &self.streams[channel]
    }

    fn wait_all(stream: &CudaStream, events: &[CudaEvent]) -> Result<(), DeviceError> {
        for event in events {
            stream.wait(event)?;
        }
        Ok(())
    }

    fn launch_config(width: usize, height: usize) -> LaunchConfig {
        LaunchConfig {
            grid_dim: (
                (width as u32).div_ceil(BLOCK_SIDE),
                (height as u32).div_ceil(BLOCK_SIDE),
                1,
            ),
            block_dim: (BLOCK_SIDE, BLOCK_SIDE, 1),
            shared_mem_bytes: 0,
        }
    }
}

impl ComputeDevice for CudaDevice {
    type Buffer = CudaSlice<f32>;
    type ShapeBuffer = CudaSlice<i32>;
    type Kernels = CudaKernels;
    type Event = CudaEvent;

    fn name(&self) -> &str {
        &self.name
    }

    fn alloc(&self, channel: Channel, len: usize) -> Result<CudaSlice<f32>, DeviceError> {
        Ok(self.stream(channel).alloc_zeros::<f32>(len)?)
    }

    fn alloc_shape(&self, channel: Channel) -> Result<CudaSlice<i32>, DeviceError> {
        Ok(self.stream(channel).alloc_zeros::<i32>(2)?)
    }

    fn load_kernels(&self) -> Result<CudaKernels, DeviceError> {
        let ptx = compile_ptx(KERNEL_SOURCE)?;
        let module = self.context.load_module(ptx)?;
        let convolute = module.load_function(Kernel::Convolution.entry_point())?;
        let deconvolute = module.load_function(Kernel::Deconvolution.entry_point())?;
        debug!("Compiled deconvolution kernels");

        Ok(CudaKernels {
            convolute,
            deconvolute,
            _module: module,
        })
    }

    fn write(
        &self,
        channel: Channel,
        dst: &mut CudaSlice<f32>,
        src: &[f32],
        mode: TransferMode,
    ) -> Result<CudaEvent, DeviceError> {
        let stream = self.stream(channel);
        stream.memcpy_htod(src, dst)?;
        if mode == TransferMode::Blocking {
            stream.synchronize()?;
        }
        Ok(stream.record_event(None)?)
    }

    fn write_shape(
        &self,
        channel: Channel,
        dst: &mut CudaSlice<i32>,
        shape: [i32; 2],
    ) -> Result<CudaEvent, DeviceError> {
        let stream = self.stream(channel);
        stream.memcpy_htod(&shape[..], dst)?;
        Ok(stream.record_event(None)?)
    }

    fn launch(
        &self,
        kernels: &CudaKernels,
        kernel: Kernel,
        channel: Channel,
        args: &mut KernelArgs<'_, Self>,
        wait: &[CudaEvent],
    ) -> Result<CudaEvent, DeviceError> {
        let stream = self.stream(channel);
        Self::wait_all(stream, wait)?;

        let function = match kernel {
            Kernel::Convolution => &kernels.convolute,
            Kernel::Deconvolution => &kernels.deconvolute,
        };
        let cfg = Self::launch_config(args.extent.width, args.extent.height);

        let mut builder = stream.launch_builder(function);
        builder.arg(args.source);
        builder.arg(&mut *args.target);
        builder.arg(args.original);
        builder.arg(args.psf);
        builder.arg(&mut *args.scratch);
        builder.arg(args.dims);
        builder.arg(args.psf_dims);

        // SAFETY: argument order and types match the `convolute`/`deconvolute`
        // signatures in kernels/deconvolute.cu, and every buffer outlives the
        // launch because it is owned by the device buffer set.
        unsafe { builder.launch(cfg) }?;

        Ok(stream.record_event(None)?)
    }

    fn read(
        &self,
        channel: Channel,
        src: &CudaSlice<f32>,
        dst: &mut [f32],
        wait: &[CudaEvent],
    ) -> Result<(), DeviceError> {
        let stream = self.stream(channel);
        Self::wait_all(stream, wait)?;
        stream.memcpy_dtoh(src, dst)?;
        stream.synchronize()?;
        Ok(())
    }
}

/// Opens the CUDA device with the given ordinal.
#[derive(Debug, Clone, Copy, Default)]
pub struct CudaDeviceFactory {
    pub ordinal: usize,
}

impl DeviceFactory for CudaDeviceFactory {
    type Device = CudaDevice;

    fn create(&self) -> Result<CudaDevice, DeviceError> {
        CudaDevice::new(self.ordinal)
    }
}
