//! Conversions between interleaved integer samples and per-channel float planes.

use tracing::debug;

use crate::deconvolution::common::{
    CHANNEL_COUNT, Channel, Channels, DeconvolutionError, Dimensions, Result,
};
use crate::deconvolution::tiff::RawImage;

/// Largest representable 16-bit sample, the scale between raw and normalized values.
pub const SAMPLE_MAX: f32 = u16::MAX as f32;

/// Channel-separated float planes sharing one set of dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedImage {
    dims: Dimensions,
    planes: Channels<Vec<f32>>,
}

impl NormalizedImage {
    pub fn from_planes(dims: Dimensions, planes: Channels<Vec<f32>>) -> Result<Self> {
        if planes.iter().any(|(_, plane)| plane.len() != dims.pixel_count()) {
            return Err(DeconvolutionError::InvalidDimensions(dims.width, dims.height));
        }
        Ok(Self { dims, planes })
    }

    /// Zero-filled planes, used as the host side of the final readback.
    pub fn zeroed(dims: Dimensions) -> Result<Self> {
        let planes = Channels::try_from_fn(|channel| -> Result<Vec<f32>> {
            let mut plane = host_plane(dims.pixel_count(), channel, "output plane")?;
            plane.resize(dims.pixel_count(), 0.0);
            Ok(plane)
        })?;
        Ok(Self { dims, planes })
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub fn plane(&self, channel: Channel) -> &[f32] {
        &self.planes[channel]
    }

    pub fn plane_mut(&mut self, channel: Channel) -> &mut [f32] {
        &mut self.planes[channel]
    }

    pub fn planes(&self) -> &Channels<Vec<f32>> {
        &self.planes
    }
}

/// Reserves an empty host plane without aborting on exhaustion.
fn host_plane(len: usize, channel: Channel, resource: &str) -> Result<Vec<f32>> {
    let mut plane = Vec::new();
    plane
        .try_reserve_exact(len)
        .map_err(|e| DeconvolutionError::AllocationError {
            resource: format!("host {resource} ({channel})"),
            reason: e.to_string(),
        })?;
    Ok(plane)
}

fn deinterleave<S: Copy>(
    image: &RawImage<S>,
    resource: &str,
    mut convert: impl FnMut(Channel, S) -> f32,
) -> Result<Channels<Vec<f32>>> {
    Channels::try_from_fn(|channel| {
        let mut plane = host_plane(image.width * image.height, channel, resource)?;
        plane.extend(
            image
                .data
                .iter()
                .skip(channel.index())
                .step_by(CHANNEL_COUNT)
                .map(|&sample| convert(channel, sample)),
        );
        Ok(plane)
    })
}

/// Maps 16-bit samples into `[0, 1]`.
pub fn normalize_input(image: &RawImage<u16>) -> Result<NormalizedImage> {
    let planes = deinterleave(image, "input plane", |_, sample| sample as f32 / SAMPLE_MAX)?;
    NormalizedImage::from_planes(image.dimensions(), planes)
}

/// Scales each PSF channel so its samples sum to one.
///
/// A channel with zero total intensity cannot be normalized and is rejected,
/// otherwise every downstream sample would become NaN.
pub fn normalize_psf(image: &RawImage<u8>) -> Result<NormalizedImage> {
    let mut totals = Channels::<f64>::default();
    for (i, &sample) in image.data.iter().enumerate() {
        totals[Channel::ALL[i % CHANNEL_COUNT]] += f64::from(sample);
    }

    if let Some((channel, _)) = totals.iter().find(|(_, total)| **total <= 0.0) {
        return Err(DeconvolutionError::DegeneratePsf { channel });
    }
    debug!(
        red = totals[Channel::Red],
        green = totals[Channel::Green],
        blue = totals[Channel::Blue],
        "PSF channel totals"
    );

    let planes = deinterleave(image, "PSF plane", |channel, sample| {
        (f64::from(sample) / totals[channel]) as f32
    })?;
    NormalizedImage::from_planes(image.dimensions(), planes)
}

/// Converts one normalized sample back to 16 bits.
///
/// Overshoot at or above 1.0 saturates to [`u16::MAX`]; negative values and
/// NaN saturate to zero.
pub fn denormalize_sample(value: f32) -> u16 {
    if value >= 1.0 {
        u16::MAX
    } else {
        (value.max(0.0) * SAMPLE_MAX).round() as u16
    }
}

/// Re-interleaves normalized planes into a 16-bit image.
pub fn denormalize(image: &NormalizedImage) -> Result<RawImage<u16>> {
    let dims = image.dimensions();
    let len = CHANNEL_COUNT * dims.pixel_count();

    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|e| DeconvolutionError::AllocationError {
            resource: "host output image".to_string(),
            reason: e.to_string(),
        })?;

    let [red, green, blue] = image.planes().values();
    for ((&r, &g), &b) in red.iter().zip(green).zip(blue) {
        data.push(denormalize_sample(r));
        data.push(denormalize_sample(g));
        data.push(denormalize_sample(b));
    }

    RawImage::new(dims.width, dims.height, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb8(width: usize, height: usize, data: Vec<u8>) -> RawImage<u8> {
        RawImage::new(width, height, data).unwrap()
    }

    #[test]
    fn test_psf_channels_sum_to_one() {
        let data: Vec<u8> = (0..3 * 5 * 5).map(|i| ((i * 37) % 251 + 1) as u8).collect();
        let psf = normalize_psf(&rgb8(5, 5, data)).unwrap();

        for (channel, plane) in psf.planes().iter() {
            let sum: f32 = plane.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5, "{channel} sums to {sum}");
            assert!(plane.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn test_psf_zero_channel_is_rejected() {
        // green is empty everywhere
        let data = vec![10, 0, 3, 20, 0, 4];
        let err = normalize_psf(&rgb8(2, 1, data)).unwrap_err();
        assert!(matches!(
            err,
            DeconvolutionError::DegeneratePsf {
                channel: Channel::Green
            }
        ));
    }

    #[test]
    fn test_input_samples_in_unit_range() {
        let data = vec![0, 1, 32768, 65534, 65535, 12345];
        let image = normalize_input(&RawImage::new(2, 1, data).unwrap()).unwrap();

        assert_eq!(image.plane(Channel::Red), &[0.0, 65534.0 / SAMPLE_MAX]);
        assert_eq!(image.plane(Channel::Green)[1], 1.0);
        for (_, plane) in image.planes().iter() {
            assert!(plane.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn test_denormalize_boundaries() {
        assert_eq!(denormalize_sample(1.0), u16::MAX);
        assert_eq!(denormalize_sample(1.75), u16::MAX);
        assert_eq!(denormalize_sample(f32::INFINITY), u16::MAX);
        assert_eq!(denormalize_sample(0.0), 0);
        assert_eq!(denormalize_sample(-0.5), 0);
        assert_eq!(denormalize_sample(f32::NAN), 0);

        let just_below = 1.0f32 - f32::EPSILON;
        assert_eq!(denormalize_sample(just_below), (just_below * SAMPLE_MAX).round() as u16);
        assert_eq!(denormalize_sample(0.5), 32768);
    }

    #[test]
    fn test_every_u16_survives_normalize_denormalize() {
        for sample in 0..=u16::MAX {
            assert_eq!(denormalize_sample(sample as f32 / SAMPLE_MAX), sample);
        }
    }

    #[test]
    fn test_denormalize_reinterleaves_channels() {
        let data: Vec<u16> = vec![1, 2, 3, 400, 500, 600, 65535, 0, 7, 8, 9, 10];
        let raw = RawImage::new(2, 2, data.clone()).unwrap();
        let back = denormalize(&normalize_input(&raw).unwrap()).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn test_mismatched_plane_length_is_rejected() {
        let planes = Channels::new(vec![0.0; 4], vec![0.0; 4], vec![0.0; 3]);
        let err = NormalizedImage::from_planes(Dimensions::new(2, 2), planes).unwrap_err();
        assert!(matches!(err, DeconvolutionError::InvalidDimensions(2, 2)));
    }
}
