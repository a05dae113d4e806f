//! Common types module
//!
//! Error taxonomy, channel-indexed storage and plane dimensions shared by
//! every stage of the deconvolution engine.

pub mod channels;
pub mod dimensions;
pub mod error;

pub use channels::{CHANNEL_COUNT, Channel, Channels};
pub use dimensions::Dimensions;
pub use error::{DecodeFailure, DeconvolutionError, Result};
