use std::time::{Duration, Instant};

use tracing::{debug, info, info_span};

use crate::deconvolution::common::{Channel, DeconvolutionError, Result};
use crate::deconvolution::device::{ComputeDevice, DeviceBufferSet, DeviceError, Kernel};
use crate::deconvolution::engine::role::{BufferRole, IterationPlan, WorkBuffer};
use crate::deconvolution::engine::transfer::PendingUploads;

/// State left behind by a completed iteration run.
pub struct IterationOutcome<D: ComputeDevice> {
    /// Buffer holding the final estimate of every channel.
    pub result: WorkBuffer,
    /// Events the readback must wait on: the last pass's kernels, or the
    /// uploads when no pass ran.
    pub completion: Vec<D::Event>,
    pub pass_durations: Vec<Duration>,
}

/// Runs the passes of a plan over a populated buffer set.
///
/// Within a pass each channel gets a `convolute` then a `deconvolute`
/// invocation; channels do not depend on each other. Every invocation of pass
/// `k + 1` waits on the completion of all channels of pass `k`.
pub fn run_passes<D: ComputeDevice>(
    device: &D,
    kernels: &D::Kernels,
    buffers: &mut DeviceBufferSet<D>,
    uploads: PendingUploads<D>,
    plan: IterationPlan,
) -> Result<IterationOutcome<D>> {
    let extent = buffers.dimensions();
    let mut role = BufferRole::default();
    let mut barrier: Vec<D::Event> = Vec::new();
    let mut pass_durations = Vec::with_capacity(plan.passes());

    info!(
        requested = plan.requested(),
        passes = plan.passes(),
        device = device.name(),
        "Starting deconvolution passes"
    );

    for pass in 0..plan.passes() {
        let _span = info_span!("pass", pass, source = %role.source(), target = %role.target()).entered();
        let started = Instant::now();
        info!("Pass {}...", pass);

        let mut completed = Vec::with_capacity(Channel::ALL.len());
        for channel in Channel::ALL {
            let wait = if pass == 0 {
                uploads.for_channel(channel)
            } else {
                barrier.as_slice()
            };

            let mut args = buffers.channel_mut(channel).kernel_args(role, extent);
            let launch_error = |kernel: Kernel| {
                move |source: DeviceError| DeconvolutionError::KernelExecutionError {
                    pass,
                    channel,
                    kernel,
                    source,
                }
            };

            let convolved = device
                .launch(kernels, Kernel::Convolution, channel, &mut args, wait)
                .map_err(launch_error(Kernel::Convolution))?;
            let corrected = device
                .launch(
                    kernels,
                    Kernel::Deconvolution,
                    channel,
                    &mut args,
                    std::slice::from_ref(&convolved),
                )
                .map_err(launch_error(Kernel::Deconvolution))?;
            completed.push(corrected);
        }

        barrier = completed;
        role = role.toggle();

        let elapsed = started.elapsed();
        debug!(elapsed_ms = elapsed.as_secs_f64() * 1000.0, "Pass enqueued");
        pass_durations.push(elapsed);
    }

    debug_assert_eq!(role.source(), plan.result_buffer());

    let completion = if plan.passes() == 0 {
        uploads.into_events()
    } else {
        barrier
    };

    Ok(IterationOutcome {
        result: plan.result_buffer(),
        completion,
        pass_durations,
    })
}
