//! Host implementation of the Richardson–Lucy kernel pair.
//!
//! Mirrors `kernels/deconvolute.cu` sample for sample. The PSF is centred at
//! `(psf_width / 2, psf_height / 2)` and image borders are clamped.

use rayon::prelude::*;

use crate::deconvolution::common::Dimensions;

/// Lower bound on the blurred estimate when forming the correction ratio.
pub const RATIO_EPSILON: f32 = 1e-7;

fn clamp_offset(position: usize, offset: isize, len: usize) -> usize {
    (position as isize + offset).clamp(0, len as isize - 1) as usize
}

/// Weighted sum of `plane` around `(x, y)`.
///
/// With `adjoint` set the PSF offsets are negated about the same centre, which
/// makes this the exact transpose of the forward pass for any PSF size.
fn convolve_at(
    plane: &[f32],
    dims: Dimensions,
    psf: &[f32],
    psf_dims: Dimensions,
    x: usize,
    y: usize,
    adjoint: bool,
) -> f32 {
    let cx = (psf_dims.width / 2) as isize;
    let cy = (psf_dims.height / 2) as isize;
    let sign = if adjoint { -1 } else { 1 };
    let mut sum = 0.0f32;

    for j in 0..psf_dims.height {
        let row = clamp_offset(y, sign * (j as isize - cy), dims.height);
        for i in 0..psf_dims.width {
            let col = clamp_offset(x, sign * (i as isize - cx), dims.width);
            sum += psf[j * psf_dims.width + i] * plane[row * dims.width + col];
        }
    }
    sum
}

/// `scratch = original / max(source ⊗ psf, ε)`
pub fn convolute(
    source: &[f32],
    scratch: &mut [f32],
    original: &[f32],
    psf: &[f32],
    dims: Dimensions,
    psf_dims: Dimensions,
) {
    scratch
        .par_chunks_mut(dims.width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                let blurred = convolve_at(source, dims, psf, psf_dims, x, y, false);
                *out = original[y * dims.width + x] / blurred.max(RATIO_EPSILON);
            }
        });
}

/// `target = source * (scratch ⋆ psf)`, the correlation being the adjoint of
/// the blur in [`convolute`].
pub fn deconvolute(
    source: &[f32],
    target: &mut [f32],
    scratch: &[f32],
    psf: &[f32],
    dims: Dimensions,
    psf_dims: Dimensions,
) {
    target
        .par_chunks_mut(dims.width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                let correction = convolve_at(scratch, dims, psf, psf_dims, x, y, true);
                *out = source[y * dims.width + x] * correction;
            }
        });
}
