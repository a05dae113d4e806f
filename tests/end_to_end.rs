use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use deconvolute_rs::deconvolution::{
    DecodeFailure, DeconvolutionConfig, DeconvolutionError, DeconvolutionPipeline,
};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{TiffEncoder, colortype};

const INPUT: [u16; 12] = [0, 1, 65535, 300, 40000, 12345, 7, 65534, 32768, 2, 999, 50000];

fn write_rgb16(path: &Path, width: u32, height: u32, data: &[u16]) {
    let file = File::create(path).unwrap();
    TiffEncoder::new(file)
        .unwrap()
        .write_image::<colortype::RGB16>(width, height, data)
        .unwrap();
}

fn write_rgb8(path: &Path, width: u32, height: u32, data: &[u8]) {
    let file = File::create(path).unwrap();
    TiffEncoder::new(file)
        .unwrap()
        .write_image::<colortype::RGB8>(width, height, data)
        .unwrap();
}

fn write_delta_psf(path: &Path) {
    let mut psf = vec![0u8; 3 * 3 * 3];
    psf[4 * 3..4 * 3 + 3].copy_from_slice(&[200, 13, 255]);
    write_rgb8(path, 3, 3, &psf);
}

fn read_rgb16(path: &Path) -> (u32, u32, Vec<u16>) {
    let mut decoder = Decoder::new(BufReader::new(File::open(path).unwrap())).unwrap();
    let (width, height) = decoder.dimensions().unwrap();
    match decoder.read_image().unwrap() {
        DecodingResult::U16(data) => (width, height, data),
        other => panic!("unexpected sample type: {other:?}"),
    }
}

fn run(iterations: u32, input: &Path, psf: &Path, output: &Path) -> deconvolute_rs::deconvolution::Result<()> {
    let config = DeconvolutionConfig::builder().iterations(iterations).build();
    DeconvolutionPipeline::new(config)
        .deconvolve_files(input, psf, output)
        .map(|_| ())
}

#[test]
fn test_delta_psf_preserves_image() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.tiff");
    let psf = dir.path().join("psf.tiff");
    let output = dir.path().join("out.tiff");
    write_rgb16(&input, 2, 2, &INPUT);
    write_delta_psf(&psf);

    run(1, &input, &psf, &output).unwrap();

    let (width, height, data) = read_rgb16(&output);
    assert_eq!((width, height), (2, 2));
    assert_eq!(data, INPUT);
}

#[test]
fn test_zero_iterations_round_trips_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.tiff");
    let psf = dir.path().join("psf.tiff");
    let output = dir.path().join("out.tiff");
    write_rgb16(&input, 2, 2, &INPUT);
    write_delta_psf(&psf);

    run(0, &input, &psf, &output).unwrap();

    assert_eq!(read_rgb16(&output).2, INPUT);
}

#[test]
fn test_flat_image_stays_flat_under_blur() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.tiff");
    let psf = dir.path().join("psf.tiff");
    let output = dir.path().join("out.tiff");
    write_rgb16(&input, 4, 3, &[20000u16; 4 * 3 * 3]);
    write_rgb8(&psf, 3, 3, &[9u8; 3 * 3 * 3]);

    run(4, &input, &psf, &output).unwrap();

    let (_, _, data) = read_rgb16(&output);
    assert!(data.iter().all(|&v| v.abs_diff(20000) <= 1), "{data:?}");
}

#[test]
fn test_wrong_bit_depth_is_rejected_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.tiff");
    let psf = dir.path().join("psf.tiff");
    let output = dir.path().join("out.tiff");
    write_rgb8(&input, 2, 2, &[1u8; 12]);
    write_delta_psf(&psf);

    let err = run(2, &input, &psf, &output).unwrap_err();

    match err {
        DeconvolutionError::DecodeError { path, source } => {
            assert_eq!(path, input);
            assert!(matches!(source, DecodeFailure::UnsupportedLayout { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output.exists());
}

#[test]
fn test_blank_psf_channel_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.tiff");
    let psf = dir.path().join("psf.tiff");
    let output = dir.path().join("out.tiff");
    write_rgb16(&input, 2, 2, &INPUT);
    let mut blank_green = vec![0u8; 3 * 3 * 3];
    blank_green[4 * 3] = 255;
    blank_green[4 * 3 + 2] = 255;
    write_rgb8(&psf, 3, 3, &blank_green);

    let err = run(2, &input, &psf, &output).unwrap_err();

    assert!(matches!(err, DeconvolutionError::DegeneratePsf { .. }), "{err}");
    assert!(!output.exists());
}
