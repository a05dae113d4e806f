//! Image store module
//!
//! Holds the decoded input, PSF and output images in the canonical
//! per-channel float representation used by the rest of the engine.

pub mod normalize;
mod store;

pub use normalize::{NormalizedImage, SAMPLE_MAX, denormalize, denormalize_sample};
pub use store::ImageStore;
