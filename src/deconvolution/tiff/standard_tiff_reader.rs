//! TIFF decoding backed by the `tiff` crate.
//!
//! Only interleaved RGB images are accepted: 16 bits per sample for the
//! degraded input and 8 bits per sample for the PSF. Anything else is a decode
//! failure rather than a silent conversion, since the normalization constants
//! depend on the bit depth.

use std::io::Cursor;

use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tracing::debug;

use crate::deconvolution::common::DecodeFailure;
use crate::deconvolution::tiff::reader::TiffReader;
use crate::deconvolution::tiff::types::RawImage;

pub struct StandardTiffReader;

impl StandardTiffReader {
    fn decode(data: &[u8], expected_bits: u8) -> Result<(usize, usize, DecodingResult), DecodeFailure> {
        let mut decoder = Decoder::new(Cursor::new(data))?;
        let (width, height) = decoder.dimensions()?;

        let color_type = decoder.colortype()?;
        if !matches!(color_type, ColorType::RGB(bits) if bits == expected_bits) {
            return Err(DecodeFailure::UnsupportedLayout {
                expected: if expected_bits == 16 { "16-bit RGB" } else { "8-bit RGB" },
                found: format!("{color_type:?}"),
            });
        }

        debug!("Decoding {}x{} {:?} TIFF", width, height, color_type);
        let samples = decoder.read_image()?;
        Ok((width as usize, height as usize, samples))
    }

    fn checked<S>(width: usize, height: usize, data: Vec<S>) -> Result<RawImage<S>, DecodeFailure> {
        let found = data.len();
        RawImage::new(width, height, data).map_err(|_| DecodeFailure::SampleCount {
            found,
            width,
            height,
        })
    }
}

impl TiffReader for StandardTiffReader {
    fn read_rgb16(&self, data: &[u8]) -> Result<RawImage<u16>, DecodeFailure> {
        match Self::decode(data, 16)? {
            (width, height, DecodingResult::U16(samples)) => Self::checked(width, height, samples),
            _ => Err(DecodeFailure::UnsupportedLayout {
                expected: "16-bit RGB",
                found: "non-u16 sample buffer".to_string(),
            }),
        }
    }

    fn read_rgb8(&self, data: &[u8]) -> Result<RawImage<u8>, DecodeFailure> {
        match Self::decode(data, 8)? {
            (width, height, DecodingResult::U8(samples)) => Self::checked(width, height, samples),
            _ => Err(DecodeFailure::UnsupportedLayout {
                expected: "8-bit RGB",
                found: "non-u8 sample buffer".to_string(),
            }),
        }
    }
}
