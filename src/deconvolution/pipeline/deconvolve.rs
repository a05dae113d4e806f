use std::path::Path;

use tracing::{info, instrument, warn};

use crate::deconvolution::common::{DeconvolutionError, Dimensions, Result};
use crate::deconvolution::device::{CpuDeviceFactory, DeviceFactory};
use crate::deconvolution::image_store::ImageStore;
use crate::deconvolution::pipeline::config::DeconvolutionConfig;
use crate::deconvolution::pipeline::session::Session;
use crate::deconvolution::pipeline::timing::{PipelineTimings, Timer};
use crate::deconvolution::tiff::{StandardTiffReader, StandardTiffWriter, TiffReader, TiffWriter};

/// Summary of a successful run.
#[derive(Debug)]
pub struct DeconvolutionReport {
    pub backend: String,
    pub requested_iterations: u32,
    pub passes: usize,
    pub timings: PipelineTimings,
}

pub struct DeconvolutionPipeline<R: TiffReader, W: TiffWriter, F: DeviceFactory> {
    reader: R,
    writer: W,
    factory: F,
    config: DeconvolutionConfig,
}

impl DeconvolutionPipeline<StandardTiffReader, StandardTiffWriter, CpuDeviceFactory> {
    pub fn new(config: DeconvolutionConfig) -> Self {
        Self {
            reader: StandardTiffReader,
            writer: StandardTiffWriter,
            factory: CpuDeviceFactory,
            config,
        }
    }
}

impl<R: TiffReader, W: TiffWriter, F: DeviceFactory> DeconvolutionPipeline<R, W, F> {
    pub fn with_custom(reader: R, writer: W, factory: F, config: DeconvolutionConfig) -> Self {
        Self {
            reader,
            writer,
            factory,
            config,
        }
    }

    fn validate_dimensions(&self, image: Dimensions, psf: Dimensions) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        for dims in [image, psf] {
            if dims.is_empty() {
                return Err(DeconvolutionError::InvalidDimensions(dims.width, dims.height));
            }
        }

        if let Some(max) = self.config.max_dimension {
            for (what, dims) in [("Image", image), ("PSF", psf)] {
                if dims.width > max || dims.height > max {
                    warn!("{} dimensions {} exceed maximum {}", what, dims, max);
                    return Err(DeconvolutionError::InvalidDimensions(dims.width, dims.height));
                }
            }
        }

        Ok(())
    }

    /// Deconvolves `input_path` with the PSF at `psf_path` and writes the
    /// result to `output_path`.
    ///
    /// Every error is fatal to the run. Host and device resources are
    /// released on every exit path, and the output file is only created once
    /// the result has been encoded.
    #[instrument(skip(self, input_path, psf_path, output_path))]
    pub fn deconvolve_files<P: AsRef<Path>, Q: AsRef<Path>, O: AsRef<Path>>(
        &self,
        input_path: P,
        psf_path: Q,
        output_path: O,
    ) -> Result<DeconvolutionReport> {
        let input_path = input_path.as_ref();
        let psf_path = psf_path.as_ref();
        let output_path = output_path.as_ref();
        let plan = self.config.plan();
        let mut timings = PipelineTimings::new();

        info!(
            input = %input_path.display(),
            psf = %psf_path.display(),
            output = %output_path.display(),
            "Deconvolving file"
        );

        let timer = Timer::start("decode_and_normalize");
        let host = ImageStore::load_and_normalize(&self.reader, input_path, psf_path)?;
        timings.record(timer);

        self.validate_dimensions(host.dimensions(), host.psf_dimensions())?;

        let timer = Timer::start("acquire_device");
        let mut session = Session::open(&self.factory, host)?;
        timings.record(timer);
        let backend = session.device_name().to_string();

        let timer = Timer::start("run_passes");
        let pass_durations = session.run(plan)?;
        timings.record(timer);
        timings.set_passes(pass_durations);

        let timer = Timer::start("release_device");
        let host = session.close();
        timings.record(timer);

        let timer = Timer::start("denormalize_and_write");
        host.denormalize_and_write(&self.writer, output_path, &self.config)?;
        timings.record(timer);

        info!(
            backend = %backend,
            passes = plan.passes(),
            "Deconvolution complete: {} in {:.3}ms",
            host.dimensions(),
            timings.total_duration().as_secs_f64() * 1000.0
        );

        Ok(DeconvolutionReport {
            backend,
            requested_iterations: plan.requested(),
            passes: plan.passes(),
            timings,
        })
    }

    pub fn config(&self) -> &DeconvolutionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: DeconvolutionConfig) {
        self.config = config;
    }
}
