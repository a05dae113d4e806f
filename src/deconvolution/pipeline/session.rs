use std::time::Duration;

use tracing::{debug, instrument};

use crate::deconvolution::common::{DeconvolutionError, Result};
use crate::deconvolution::device::{ComputeDevice, DeviceBufferSet, DeviceFactory};
use crate::deconvolution::engine::{IterationPlan, download_result, run_passes, upload_inputs};
use crate::deconvolution::image_store::ImageStore;

/// Every resource of one run, host and device.
///
/// Resources are acquired host images → device → device buffers → kernels.
/// Fields are declared in the opposite order because Rust drops fields in
/// declaration order: on any exit path the kernels go first, then the device
/// buffers, then the device context and streams, then the host images.
pub struct Session<D: ComputeDevice> {
    kernels: D::Kernels,
    buffers: DeviceBufferSet<D>,
    device: D,
    host: ImageStore,
}

impl<D: ComputeDevice> Session<D> {
    /// Acquires the device side of a run around already-normalized host images.
    ///
    /// A failure part way through releases whatever was acquired so far, in
    /// reverse order, before returning.
    #[instrument(skip_all)]
    pub fn open<F>(factory: &F, host: ImageStore) -> Result<Self>
    where
        F: DeviceFactory<Device = D>,
    {
        let device = factory
            .create()
            .map_err(DeconvolutionError::DeviceUnavailable)?;
        let buffers = DeviceBufferSet::allocate(&device, host.dimensions(), host.psf_dimensions())?;
        let kernels = device
            .load_kernels()
            .map_err(DeconvolutionError::KernelBuildError)?;
        debug!(device = device.name(), "Session resources acquired");

        Ok(Self {
            kernels,
            buffers,
            device,
            host,
        })
    }

    /// Uploads the inputs, runs every pass of `plan` and reads the result
    /// back into the host output image. Returns per-pass durations.
    pub fn run(&mut self, plan: IterationPlan) -> Result<Vec<Duration>> {
        let uploads = {
            let _span = tracing::info_span!("upload").entered();
            upload_inputs(&self.device, &mut self.buffers, &self.host)?
        };

        let outcome = {
            let _span = tracing::info_span!("iterate").entered();
            run_passes(&self.device, &self.kernels, &mut self.buffers, uploads, plan)?
        };

        {
            let _span = tracing::info_span!("download").entered();
            download_result(
                &self.device,
                &self.buffers,
                outcome.result,
                &outcome.completion,
                &mut self.host,
            )?;
        }

        Ok(outcome.pass_durations)
    }

    pub fn device_name(&self) -> &str {
        self.device.name()
    }

    pub fn host(&self) -> &ImageStore {
        &self.host
    }

    /// Releases every device resource and hands back the host images.
    pub fn close(self) -> ImageStore {
        let Self {
            kernels,
            buffers,
            device,
            host,
        } = self;

        drop(kernels);
        drop(buffers);
        debug!(device = device.name(), "Released kernels and device buffers");
        drop(device);
        host
    }
}
