/// Flip operator
///
/// Reverses rows, columns or both. Flipping twice along the same axis is
/// the identity.
use super::ImageOperator;
use crate::errors::Result;
use crate::types::ImageBuffer;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipAxis {
    /// Upside down: row `y` becomes row `height - 1 - y`.
    #[default]
    Vertical,
    /// Mirror: column `x` becomes column `width - 1 - x`.
    Horizontal,
    /// Both axes, equivalent to a 180 degree rotation.
    Both,
}

impl FlipAxis {
    fn flips_rows(self) -> bool {
        matches!(self, FlipAxis::Vertical | FlipAxis::Both)
    }

    fn flips_columns(self) -> bool {
        matches!(self, FlipAxis::Horizontal | FlipAxis::Both)
    }
}

impl std::str::FromStr for FlipAxis {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v" | "vertical" => Ok(FlipAxis::Vertical),
            "h" | "horizontal" => Ok(FlipAxis::Horizontal),
            "both" | "hv" | "vh" => Ok(FlipAxis::Both),
            other => Err(format!("unknown flip axis: {}", other)),
        }
    }
}

/// Flip `src` into `dst` along `axis`.
pub fn flip(src: &ImageBuffer, dst: &mut ImageBuffer, axis: FlipAxis) -> Result<()> {
    src.ensure_not_empty("source")?;
    src.ensure_same_shape(dst)?;

    log::debug!("Flipping {}x{} along {:?}", src.width(), src.height(), axis);

    let height = src.height();
    let channels = src.channels();
    for y in 0..height {
        let target = if axis.flips_rows() { height - 1 - y } else { y };
        let out_row = dst.row_mut(target);
        out_row.copy_from_slice(src.row(y));
        if axis.flips_columns() {
            reverse_pixels(out_row, channels);
        }
    }
    Ok(())
}

/// Flip a buffer onto itself.
pub fn flip_in_place(buffer: &mut ImageBuffer, axis: FlipAxis) -> Result<()> {
    buffer.ensure_not_empty("source")?;

    log::debug!(
        "Flipping {}x{} in place along {:?}",
        buffer.width(),
        buffer.height(),
        axis
    );

    let stride = buffer.stride();
    let channels = buffer.channels();
    let height = buffer.height() as usize;
    let data = buffer.data_mut();

    if axis.flips_rows() {
        for y in 0..height / 2 {
            let (top, bottom) = data.split_at_mut((height - 1 - y) * stride);
            top[y * stride..(y + 1) * stride].swap_with_slice(&mut bottom[..stride]);
        }
    }
    if axis.flips_columns() {
        for row in data.chunks_exact_mut(stride) {
            reverse_pixels(row, channels);
        }
    }
    Ok(())
}

/// Reverse pixel order in a row while keeping each pixel's channel order.
fn reverse_pixels(row: &mut [u8], channels: usize) {
    row.reverse();
    if channels > 1 {
        for px in row.chunks_exact_mut(channels) {
            px.reverse();
        }
    }
}

/// Flip as an [`ImageOperator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flip {
    pub axis: FlipAxis,
}

impl Flip {
    pub fn new(axis: FlipAxis) -> Self {
        Self { axis }
    }
}

impl ImageOperator for Flip {
    fn name(&self) -> &'static str {
        "flip"
    }

    fn apply(&self, src: &ImageBuffer, dst: &mut ImageBuffer) -> Result<()> {
        flip(src, dst, self.axis)
    }
}
