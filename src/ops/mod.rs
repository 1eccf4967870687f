//! Image operators
//!
//! Pure transformations over [`ImageBuffer`]. Every operator reads a source
//! buffer and writes a distinct destination of the same shape; none of them
//! keeps state between calls.
//!
//! - [`blur`]: separable Gaussian blur
//! - [`flip`]: row/column reversal, also in place
//! - [`stitch`]: composition of same-sized tiles into one image
pub mod blur;
pub mod flip;
pub mod stitch;

pub use blur::{blur_in_place, gaussian_blur, gaussian_blur_with_border, gaussian_kernel_1d, GaussianBlur};
pub use flip::{flip, flip_in_place, Flip, FlipAxis};
pub use stitch::{stitch, stitch_images, StitchLayout, StitchOptions};

use crate::errors::Result;
use crate::types::ImageBuffer;
use serde::{Deserialize, Serialize};

/// A transformation from a source buffer into a destination buffer of the
/// same shape.
pub trait ImageOperator {
    fn name(&self) -> &'static str;

    fn apply(&self, src: &ImageBuffer, dst: &mut ImageBuffer) -> Result<()>;

    /// Apply into a freshly allocated buffer shaped like `src`.
    fn apply_new(&self, src: &ImageBuffer) -> Result<ImageBuffer> {
        let mut dst = ImageBuffer::new(src.width(), src.height(), src.format());
        self.apply(src, &mut dst)?;
        Ok(dst)
    }
}

/// How samples outside the image are produced during convolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderMode {
    /// Clamp to the nearest edge pixel: `aaa|abcd|ddd`
    #[default]
    Replicate,
    /// Mirror without repeating the edge pixel: `dcb|abcd|cba`
    Reflect101,
    /// Pad with a fixed channel value.
    Constant(u8),
}

impl BorderMode {
    /// Map a possibly out-of-range coordinate onto `0..len`.
    ///
    /// Returns `None` for [`BorderMode::Constant`] when the coordinate falls
    /// outside the image. `len` must be non-zero.
    pub fn resolve(self, index: isize, len: usize) -> Option<usize> {
        let last = len as isize - 1;
        if (0..=last).contains(&index) {
            return Some(index as usize);
        }
        match self {
            BorderMode::Replicate => Some(index.clamp(0, last) as usize),
            BorderMode::Reflect101 => {
                if last == 0 {
                    return Some(0);
                }
                let period = 2 * last;
                let mut i = index.rem_euclid(period);
                if i > last {
                    i = period - i;
                }
                Some(i as usize)
            }
            BorderMode::Constant(_) => None,
        }
    }

    pub fn constant_value(self) -> f32 {
        match self {
            BorderMode::Constant(v) => v as f32,
            _ => 0.0,
        }
    }
}

/// Run `f(row_index, row)` over every `stride`-sized row of `data`, in
/// parallel when the `parallel` feature is enabled.
pub(crate) fn for_each_row<T, F>(data: &mut [T], stride: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    if stride == 0 {
        return;
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        data.par_chunks_mut(stride)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    }

    #[cfg(not(feature = "parallel"))]
    {
        data.chunks_mut(stride)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    }
}
