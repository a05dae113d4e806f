use crate::deconvolution::common::DecodeFailure;
use crate::deconvolution::tiff::types::RawImage;

/// Decodes the two inputs of a run: the 16-bit degraded image and the 8-bit PSF.
pub trait TiffReader {
    fn read_rgb16(&self, data: &[u8]) -> Result<RawImage<u16>, DecodeFailure>;
    fn read_rgb8(&self, data: &[u8]) -> Result<RawImage<u8>, DecodeFailure>;
}
