//! Compute device module
//!
//! Defines the accelerator boundary the engine drives: buffer allocation,
//! host/device copies with completion events, and the two kernel entry
//! points. Ships a host reference device and a CUDA device.

mod backend;
mod buffers;
pub mod cpu_device;
mod cpu_kernels;
pub mod cuda_device;

pub use backend::{ComputeDevice, DeviceError, DeviceFactory, Kernel, KernelArgs, TransferMode};
pub use buffers::{ChannelBuffers, DeviceBufferSet};
pub use cpu_device::{CpuDevice, CpuDeviceFactory};
pub use cpu_kernels::RATIO_EPSILON;
pub use cuda_device::{CudaDevice, CudaDeviceFactory};
