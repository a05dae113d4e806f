use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use deconvolute_rs::deconvolution::{
    CpuDeviceFactory, CudaDeviceFactory, DEFAULT_ITERATIONS, DEFAULT_OUTPUT_FILENAME,
    DeconvolutionConfig, DeconvolutionPipeline, DeconvolutionReport, DeviceFactory,
    StandardTiffReader, StandardTiffWriter, TiffCompression,
};
use deconvolute_rs::logger;

use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    Cpu,
    Cuda,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Compression {
    None,
    Lzw,
    Deflate,
}

impl From<Compression> for TiffCompression {
    fn from(value: Compression) -> Self {
        match value {
            Compression::None => TiffCompression::None,
            Compression::Lzw => TiffCompression::Lzw,
            Compression::Deflate => TiffCompression::DeflateBalanced,
        }
    }
}

/// Sharpen an RGB image by iterative deconvolution against a point-spread function.
#[derive(Debug, Parser)]
#[command(name = "deconvolute", version)]
struct Cli {
    /// Image to be deconvoluted, 16-bit RGB TIFF
    input: PathBuf,

    /// Point-spread function, 8-bit RGB TIFF
    psf: PathBuf,

    /// Where to write the 16-bit RGB result
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILENAME)]
    output: PathBuf,

    /// Number of passes; odd values are rounded up to the next even one
    #[arg(short = 'n', long, default_value_t = DEFAULT_ITERATIONS)]
    iterations: u32,

    /// Compute device to run the passes on
    #[arg(long, value_enum, default_value_t = Backend::Cuda)]
    backend: Backend,

    /// CUDA device ordinal
    #[arg(long, default_value_t = 0)]
    device: usize,

    /// Output TIFF compression
    #[arg(long, value_enum, default_value_t = Compression::None)]
    compression: Compression,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long)]
    verbose: bool,
}

fn run<F: DeviceFactory>(
    cli: &Cli,
    factory: F,
    config: DeconvolutionConfig,
) -> anyhow::Result<DeconvolutionReport> {
    let pipeline =
        DeconvolutionPipeline::with_custom(StandardTiffReader, StandardTiffWriter, factory, config);
    pipeline
        .deconvolve_files(&cli.input, &cli.psf, &cli.output)
        .with_context(|| format!("deconvolving {}", cli.input.display()))
}

/// Logs the outcome once and maps it to the process exit status.
fn finish(result: anyhow::Result<DeconvolutionReport>) -> ExitCode {
    match result {
        Ok(report) => {
            info!(
                "{} passes on {} ({} requested)",
                report.passes, report.backend, report.requested_iterations
            );
            report.timings.log_summary();
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Deconvolution failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(if cli.verbose { "debug" } else { "info" });

    info!("Starting deconvolute...");

    let config = DeconvolutionConfig::builder()
        .iterations(cli.iterations)
        .compression(cli.compression.into())
        .build();

    let result = match cli.backend {
        Backend::Cpu => run(&cli, CpuDeviceFactory, config),
        Backend::Cuda => run(&cli, CudaDeviceFactory { ordinal: cli.device }, config),
    };

    finish(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_failure_maps_to_failing_exit_status() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.tiff");
        let output = dir.path().join("out.tiff");
        let cli = Cli::try_parse_from([
            PathBuf::from("deconvolute"),
            missing.clone(),
            missing,
            PathBuf::from("--output"),
            output,
            PathBuf::from("--backend=cpu"),
        ])
        .unwrap();

        let result = run(&cli, CpuDeviceFactory, DeconvolutionConfig::default());
        assert!(result.is_err());
        assert_eq!(finish(result), ExitCode::FAILURE);
        assert!(!cli.output.exists());
    }

    #[test]
    fn test_two_positionals_required() {
        assert!(Cli::try_parse_from(["deconvolute", "in.tiff"]).is_err());
        assert!(Cli::try_parse_from(["deconvolute", "in.tiff", "psf.tiff", "extra.tiff"]).is_err());

        let cli = Cli::try_parse_from(["deconvolute", "in.tiff", "psf.tiff"]).unwrap();
        assert_eq!(cli.output, PathBuf::from(DEFAULT_OUTPUT_FILENAME));
        assert_eq!(cli.iterations, DEFAULT_ITERATIONS);
        assert_eq!(cli.backend, Backend::Cuda);
    }
}
