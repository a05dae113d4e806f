//! TIFF reading and writing module
//!
//! Decodes the 16-bit input and 8-bit PSF images and encodes the 16-bit
//! deconvolved result.

mod reader;
mod standard_tiff_reader;
mod standard_tiff_writer;
pub mod types;
mod writer;

pub use reader::TiffReader;
pub use standard_tiff_reader::StandardTiffReader;
pub use standard_tiff_writer::StandardTiffWriter;
pub use types::{RawImage, TiffCompression};
pub use writer::TiffWriter;
