//! Host/device transfers at the start and end of a run.

use tracing::{debug, instrument};

use crate::deconvolution::common::{Channel, Channels, DeconvolutionError, Result};
use crate::deconvolution::device::{ComputeDevice, DeviceBufferSet, DeviceError, TransferMode};
use crate::deconvolution::engine::role::WorkBuffer;
use crate::deconvolution::image_store::ImageStore;

/// Completion events of the asynchronous uploads, per channel.
///
/// The first pass of a channel must wait on that channel's events.
pub struct PendingUploads<D: ComputeDevice> {
    events: Channels<Vec<D::Event>>,
}

impl<D: ComputeDevice> PendingUploads<D> {
    pub fn for_channel(&self, channel: Channel) -> &[D::Event] {
        &self.events[channel]
    }

    pub fn into_events(self) -> Vec<D::Event> {
        self.events.into_values().into_iter().flatten().collect()
    }
}

fn transfer_error(resource: &'static str, channel: Channel) -> impl FnOnce(DeviceError) -> DeconvolutionError {
    move |source| DeconvolutionError::TransferError {
        resource,
        channel,
        source,
    }
}

/// Copies the normalized inputs into the device buffer set.
///
/// Work buffer A is written with a blocking transfer so the first pass can
/// read it right away. The original image, PSF and both shape descriptors are
/// written asynchronously; their completion events are returned.
#[instrument(skip_all, fields(device = device.name()))]
pub fn upload_inputs<D: ComputeDevice>(
    device: &D,
    buffers: &mut DeviceBufferSet<D>,
    store: &ImageStore,
) -> Result<PendingUploads<D>> {
    let image_shape = buffers.dimensions().to_device_shape()?;
    let psf_shape = buffers.psf_dimensions().to_device_shape()?;

    let events = Channels::try_from_fn(|channel| -> Result<Vec<D::Event>> {
        let input = store.input().plane(channel);
        let psf = store.psf().plane(channel);
        let bufs = buffers.channel_mut(channel);

        device
            .write(channel, bufs.work_mut(WorkBuffer::A), input, TransferMode::Blocking)
            .map_err(transfer_error("work buffer A", channel))?;

        let original_done = device
            .write(channel, bufs.original_mut(), input, TransferMode::Async)
            .map_err(transfer_error("original image", channel))?;
        let psf_done = device
            .write(channel, bufs.psf_mut(), psf, TransferMode::Async)
            .map_err(transfer_error("PSF", channel))?;
        let dims_done = device
            .write_shape(channel, bufs.dims_mut(), image_shape)
            .map_err(transfer_error("image dimensions", channel))?;
        let psf_dims_done = device
            .write_shape(channel, bufs.psf_dims_mut(), psf_shape)
            .map_err(transfer_error("PSF dimensions", channel))?;

        debug!(%channel, "Uploaded channel");
        Ok(vec![original_done, psf_done, dims_done, psf_dims_done])
    })?;

    Ok(PendingUploads { events })
}

/// Reads the final estimate of every channel back into the store's output.
///
/// Blocks until every event in `wait` has completed and the copy is done.
#[instrument(skip_all, fields(device = device.name(), buffer = %result))]
pub fn download_result<D: ComputeDevice>(
    device: &D,
    buffers: &DeviceBufferSet<D>,
    result: WorkBuffer,
    wait: &[D::Event],
    store: &mut ImageStore,
) -> Result<()> {
    for channel in Channel::ALL {
        let src = buffers.channel(channel).work(result);
        device
            .read(channel, src, store.output_mut().plane_mut(channel), wait)
            .map_err(transfer_error(
                match result {
                    WorkBuffer::A => "work buffer A",
                    WorkBuffer::B => "work buffer B",
                },
                channel,
            ))?;
    }
    debug!("Readback complete");
    Ok(())
}
