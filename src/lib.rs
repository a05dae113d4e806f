pub mod deconvolution;
pub mod logger;
