use std::io::Write;

use tiff::encoder::compression::DeflateLevel;
use tiff::encoder::{Compression, TiffEncoder, colortype};
use tracing::debug;

use crate::deconvolution::common::{DeconvolutionError, Result};
use crate::deconvolution::pipeline::DeconvolutionConfig;
use crate::deconvolution::tiff::types::{RawImage, TiffCompression};
use crate::deconvolution::tiff::writer::TiffWriter;

pub struct StandardTiffWriter;

impl TiffWriter for StandardTiffWriter {
    fn write_rgb16(
        &self,
        image: &RawImage<u16>,
        output: &mut dyn Write,
        config: &DeconvolutionConfig,
    ) -> Result<()> {
        debug!("Encoding RGB16 TIFF image: {}x{}", image.width, image.height);

        let mut buffer = Vec::new();

        let compression = match config.compression {
            TiffCompression::None => Compression::Uncompressed,
            TiffCompression::Lzw => Compression::Lzw,
            TiffCompression::DeflateFast => Compression::Deflate(DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => Compression::Deflate(DeflateLevel::Balanced),
            TiffCompression::DeflateBest => Compression::Deflate(DeflateLevel::Best),
        };

        let mut encoder = TiffEncoder::new(std::io::Cursor::new(&mut buffer))
            .map_err(|e| DeconvolutionError::EncodeError(e.to_string()))?
            .with_compression(compression);

        if let Some(predictor_val) = config.predictor {
            let predictor = match predictor_val {
                2 => tiff::tags::Predictor::Horizontal,
                _ => tiff::tags::Predictor::None,
            };
            encoder = encoder.with_predictor(predictor);
        }

        encoder
            .write_image::<colortype::RGB16>(image.width as u32, image.height as u32, &image.data)
            .map_err(|e| DeconvolutionError::EncodeError(e.to_string()))?;

        output
            .write_all(&buffer)
            .map_err(|e| DeconvolutionError::OutputWriteError(e.to_string()))?;

        debug!("TIFF encoding complete, {} bytes", buffer.len());
        Ok(())
    }
}
