/// Gaussian blur operator
///
/// Separable convolution: a horizontal pass into an `f32` scratch plane,
/// then a vertical pass that rounds back to 8 bits. All channels, alpha
/// included, are filtered.
use super::{for_each_row, BorderMode, ImageOperator};
use crate::assert_invariant;
use crate::errors::{ProcessingError, Result};
use crate::types::ImageBuffer;

/// Largest kernel half-width ever built, whatever the sigma.
pub const MAX_KERNEL_RADIUS: usize = 1 << 16;

/// Kernel half-width for a given sigma: `ceil(3 * sigma)`, at least 1 and at
/// most [`MAX_KERNEL_RADIUS`].
pub fn kernel_radius(sigma: f32) -> usize {
    let reach = (3.0 * sigma).ceil();
    if reach.is_nan() || reach < 1.0 {
        1
    } else if reach >= MAX_KERNEL_RADIUS as f32 {
        MAX_KERNEL_RADIUS
    } else {
        reach as usize
    }
}

/// Normalised 1D Gaussian kernel of length `2 * kernel_radius(sigma) + 1`.
pub fn gaussian_kernel_1d(sigma: f32) -> Vec<f32> {
    gaussian_kernel_with_radius(sigma, kernel_radius(sigma))
}

/// Normalised Gaussian weights for offsets `-radius..=radius`.
///
/// Huge sigmas give an almost flat kernel; the weights still sum to one.
fn gaussian_kernel_with_radius(sigma: f32, radius: usize) -> Vec<f32> {
    let radius = radius.min(MAX_KERNEL_RADIUS) as isize;
    let two_sigma_sq = 2.0 * sigma * sigma;

    let mut kernel: Vec<f32> = (-radius..=radius)
        .map(|i| {
            let x = i as f32;
            (-(x * x) / two_sigma_sq).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }

    let total: f32 = kernel.iter().sum();
    assert_invariant!(
        (total - 1.0).abs() < 1e-4,
        "Gaussian kernel weights must sum to one",
        "ops::blur"
    );

    kernel
}

pub(crate) fn validate_sigma(sigma: f32) -> Result<()> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(ProcessingError::invalid_argument(format!(
            "sigma must be a positive finite number, got {}",
            sigma
        )));
    }
    Ok(())
}

/// Blur `src` into `dst` with clamp-to-edge borders.
pub fn gaussian_blur(src: &ImageBuffer, dst: &mut ImageBuffer, sigma: f32) -> Result<()> {
    gaussian_blur_with_border(src, dst, sigma, BorderMode::Replicate)
}

/// Blur `src` into `dst` using the given border policy.
///
/// `dst` must already have the shape of `src`.
pub fn gaussian_blur_with_border(
    src: &ImageBuffer,
    dst: &mut ImageBuffer,
    sigma: f32,
    border: BorderMode,
) -> Result<()> {
    validate_sigma(sigma)?;
    src.ensure_not_empty("source")?;
    dst.ensure_not_empty("destination")?;
    src.ensure_same_shape(dst)?;

    let width = src.width() as usize;
    let height = src.height() as usize;
    // The longest side bounds the useful kernel reach.
    let kernel = gaussian_kernel_with_radius(sigma, kernel_radius(sigma).min(width.max(height)));
    let radius = kernel.len() / 2;
    let channels = src.channels();
    let stride = width * channels;

    assert_invariant!(
        src.data().len() == stride * height,
        "Buffer length must equal width * height * channels",
        "ops::blur"
    );

    log::debug!(
        "Gaussian blur {}x{} {} sigma={:.3} radius={} border={:?}",
        width,
        height,
        src.format(),
        sigma,
        radius,
        border
    );

    let taps_x = tap_table(width, radius, border);
    let taps_y = tap_table(height, radius, border);
    let constant = border.constant_value();
    let taps = kernel.len();

    // Horizontal pass
    let mut scratch = vec![0.0f32; stride * height];
    let src_data = src.data();
    for_each_row(&mut scratch, stride, |y, out_row| {
        let in_row = &src_data[y * stride..(y + 1) * stride];
        for x in 0..width {
            let row_taps = &taps_x[x * taps..(x + 1) * taps];
            for c in 0..channels {
                let mut sum = 0.0f32;
                for (tap, &weight) in row_taps.iter().zip(&kernel) {
                    let value = match tap {
                        Some(sx) => in_row[sx * channels + c] as f32,
                        None => constant,
                    };
                    sum += value * weight;
                }
                out_row[x * channels + c] = sum;
            }
        }
    });

    // Vertical pass
    let scratch = &scratch;
    for_each_row(dst.data_mut(), stride, |y, out_row| {
        let col_taps = &taps_y[y * taps..(y + 1) * taps];
        for (i, out) in out_row.iter_mut().enumerate() {
            let mut sum = 0.0f32;
            for (tap, &weight) in col_taps.iter().zip(&kernel) {
                let value = match tap {
                    Some(sy) => scratch[sy * stride + i],
                    None => constant,
                };
                sum += value * weight;
            }
            *out = sum.round().clamp(0.0, 255.0) as u8;
        }
    });

    Ok(())
}

/// Blur a buffer onto itself: the source is copied first, then blurred back
/// into the original allocation.
pub fn blur_in_place(buffer: &mut ImageBuffer, sigma: f32) -> Result<()> {
    let src = buffer.clone();
    gaussian_blur(&src, buffer, sigma)
}

/// For every output coordinate, the source coordinate each kernel tap reads
/// (`None` means the constant border value).
fn tap_table(len: usize, radius: usize, border: BorderMode) -> Vec<Option<usize>> {
    let taps = 2 * radius + 1;
    let mut table = Vec::with_capacity(len * taps);
    for i in 0..len {
        for k in 0..taps {
            let offset = i as isize + k as isize - radius as isize;
            table.push(border.resolve(offset, len));
        }
    }
    table
}

/// Gaussian blur as an [`ImageOperator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianBlur {
    pub sigma: f32,
    pub border: BorderMode,
}

impl GaussianBlur {
    pub fn new(sigma: f32) -> Self {
        Self {
            sigma,
            border: BorderMode::default(),
        }
    }

    pub fn with_border(mut self, border: BorderMode) -> Self {
        self.border = border;
        self
    }
}

impl ImageOperator for GaussianBlur {
    fn name(&self) -> &'static str {
        "gaussian_blur"
    }

    fn apply(&self, src: &ImageBuffer, dst: &mut ImageBuffer) -> Result<()> {
        gaussian_blur_with_border(src, dst, self.sigma, self.border)
    }
}
