use std::io::Write;

use crate::deconvolution::common::Result;
use crate::deconvolution::pipeline::DeconvolutionConfig;
use crate::deconvolution::tiff::types::RawImage;

pub trait TiffWriter {
    fn write_rgb16(
        &self,
        image: &RawImage<u16>,
        output: &mut dyn Write,
        config: &DeconvolutionConfig,
    ) -> Result<()>;
}
