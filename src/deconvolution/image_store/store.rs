use std::path::Path;

use tracing::{debug, info, instrument};

use crate::deconvolution::common::{DecodeFailure, DeconvolutionError, Dimensions, Result};
use crate::deconvolution::image_store::normalize::{
    NormalizedImage, denormalize, normalize_input, normalize_psf,
};
use crate::deconvolution::pipeline::DeconvolutionConfig;
use crate::deconvolution::tiff::{TiffReader, TiffWriter};

/// Host-resident images of one run, in normalized form.
#[derive(Debug)]
pub struct ImageStore {
    input: NormalizedImage,
    psf: NormalizedImage,
    output: NormalizedImage,
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| decode_error(path, DecodeFailure::Unreadable(e)))
}

fn decode_error(path: &Path, source: DecodeFailure) -> DeconvolutionError {
    DeconvolutionError::DecodeError {
        path: path.to_path_buf(),
        source,
    }
}

impl ImageStore {
    /// Builds a store from already-normalized planes.
    pub fn from_normalized(input: NormalizedImage, psf: NormalizedImage) -> Result<Self> {
        let output = NormalizedImage::zeroed(input.dimensions())?;
        Ok(Self { input, psf, output })
    }

    /// Decodes both input files and normalizes them.
    ///
    /// The input image is scaled into `[0, 1]`; every PSF channel is scaled
    /// to sum to one. Nothing touches the compute device until this succeeds.
    #[instrument(skip(reader, input_path, psf_path))]
    pub fn load_and_normalize<R: TiffReader>(
        reader: &R,
        input_path: &Path,
        psf_path: &Path,
    ) -> Result<Self> {
        let input = {
            let _span = tracing::info_span!("decode_input").entered();
            let bytes = read_file(input_path)?;
            reader
                .read_rgb16(&bytes)
                .map_err(|e| decode_error(input_path, e))?
        };

        let psf = {
            let _span = tracing::info_span!("decode_psf").entered();
            let bytes = read_file(psf_path)?;
            reader
                .read_rgb8(&bytes)
                .map_err(|e| decode_error(psf_path, e))?
        };

        info!(
            image = %input.dimensions(),
            psf = %psf.dimensions(),
            "Decoded input images"
        );

        let store = Self::from_normalized(normalize_input(&input)?, normalize_psf(&psf)?)?;
        debug!("Normalization complete");
        Ok(store)
    }

    /// Converts the readback planes to 16 bits and writes them as a TIFF.
    ///
    /// Encoding happens in memory first so a failure never leaves a partial
    /// file behind.
    #[instrument(skip(self, writer, output_path, config))]
    pub fn denormalize_and_write<W: TiffWriter>(
        &self,
        writer: &W,
        output_path: &Path,
        config: &DeconvolutionConfig,
    ) -> Result<()> {
        let raw = denormalize(&self.output)?;

        let mut encoded = Vec::new();
        writer.write_rgb16(&raw, &mut encoded, config)?;

        std::fs::write(output_path, &encoded).map_err(|e| {
            DeconvolutionError::OutputWriteError(format!("{}: {}", output_path.display(), e))
        })?;

        info!(output = %output_path.display(), bytes = encoded.len(), "Wrote result");
        Ok(())
    }

    pub fn input(&self) -> &NormalizedImage {
        &self.input
    }

    pub fn psf(&self) -> &NormalizedImage {
        &self.psf
    }

    pub fn output(&self) -> &NormalizedImage {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut NormalizedImage {
        &mut self.output
    }

    pub fn dimensions(&self) -> Dimensions {
        self.input.dimensions()
    }

    pub fn psf_dimensions(&self) -> Dimensions {
        self.psf.dimensions()
    }
}
