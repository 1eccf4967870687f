/// Stitch operator
///
/// Places same-sized tiles on a grid (a horizontal strip, a vertical strip
/// or a row-major grid) and feather-blends the `overlap` pixels shared by
/// neighbouring tiles with linear ramp weights.
use crate::assert_invariant;
use crate::errors::{ProcessingError, Result};
use crate::types::ImageBuffer;
use serde::{Deserialize, Serialize};

/// Serialised in its textual form (`horizontal`, `vertical`, `grid:<columns>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StitchLayout {
    /// Left to right.
    #[default]
    Horizontal,
    /// Top to bottom.
    Vertical,
    /// Row-major grid with a fixed number of columns.
    Grid { columns: u32 },
}

impl StitchLayout {
    /// (columns, rows) needed to hold `count` tiles.
    pub fn grid_shape(self, count: usize) -> Result<(usize, usize)> {
        match self {
            StitchLayout::Horizontal => Ok((count, 1)),
            StitchLayout::Vertical => Ok((1, count)),
            StitchLayout::Grid { columns: 0 } => Err(ProcessingError::invalid_argument(
                "grid layout needs at least one column",
            )),
            StitchLayout::Grid { columns } => {
                let cols = (columns as usize).min(count);
                Ok((cols, count.div_ceil(cols)))
            }
        }
    }
}

impl std::str::FromStr for StitchLayout {
    type Err = String;

    /// Accepts `h`, `horizontal`, `v`, `vertical` and `grid:<columns>`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "h" | "horizontal" => Ok(StitchLayout::Horizontal),
            "v" | "vertical" => Ok(StitchLayout::Vertical),
            _ => {
                let columns = lower
                    .strip_prefix("grid:")
                    .ok_or_else(|| format!("unknown stitch layout: {}", s))?;
                let columns: u32 = columns
                    .parse()
                    .map_err(|_| format!("invalid grid column count: {}", columns))?;
                Ok(StitchLayout::Grid { columns })
            }
        }
    }
}

impl std::fmt::Display for StitchLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StitchLayout::Horizontal => write!(f, "horizontal"),
            StitchLayout::Vertical => write!(f, "vertical"),
            StitchLayout::Grid { columns } => write!(f, "grid:{}", columns),
        }
    }
}

impl TryFrom<String> for StitchLayout {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StitchLayout> for String {
    fn from(layout: StitchLayout) -> Self {
        layout.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StitchOptions {
    pub layout: StitchLayout,
    /// Pixels shared by neighbouring tiles.
    pub overlap: u32,
}

/// Compose `sources` into one image and append it to `destinations`.
pub fn stitch(
    sources: &[ImageBuffer],
    destinations: &mut Vec<ImageBuffer>,
    options: &StitchOptions,
) -> Result<()> {
    let composite = stitch_images(sources, options)?;
    destinations.push(composite);
    Ok(())
}

/// Compose `sources` into one image.
pub fn stitch_images(sources: &[ImageBuffer], options: &StitchOptions) -> Result<ImageBuffer> {
    let first = sources
        .first()
        .ok_or_else(|| ProcessingError::invalid_argument("stitch needs at least one source image"))?;
    first.ensure_not_empty("source")?;
    for source in sources.iter().skip(1) {
        first.ensure_same_shape(source)?;
    }

    if sources.len() == 1 {
        return Ok(first.clone());
    }

    let (cols, rows) = options.layout.grid_shape(sources.len())?;
    let tile_w = first.width() as usize;
    let tile_h = first.height() as usize;
    let overlap = options.overlap as usize;

    if cols > 1 && overlap >= tile_w {
        return Err(ProcessingError::invalid_argument(format!(
            "overlap {} must be smaller than tile width {}",
            overlap, tile_w
        )));
    }
    if rows > 1 && overlap >= tile_h {
        return Err(ProcessingError::invalid_argument(format!(
            "overlap {} must be smaller than tile height {}",
            overlap, tile_h
        )));
    }

    let step_x = tile_w - if cols > 1 { overlap } else { 0 };
    let step_y = tile_h - if rows > 1 { overlap } else { 0 };
    let out_w = step_x * (cols - 1) + tile_w;
    let out_h = step_y * (rows - 1) + tile_h;
    let channels = first.channels();

    log::info!(
        "Stitching {} tiles ({}x{}) into {}x{} grid -> {}x{}, overlap={}",
        sources.len(),
        tile_w,
        tile_h,
        cols,
        rows,
        out_w,
        out_h,
        overlap
    );

    let mut accum = vec![0.0f32; out_w * out_h * channels];
    let mut weights = vec![0.0f32; out_w * out_h];

    for (index, tile) in sources.iter().enumerate() {
        let col = index % cols;
        let row = index / cols;
        let origin_x = col * step_x;
        let origin_y = row * step_y;

        let ramp_x: Vec<f32> = (0..tile_w)
            .map(|x| feather_weight(x, tile_w, overlap, col > 0, col + 1 < cols))
            .collect();

        for y in 0..tile_h {
            let wy = feather_weight(y, tile_h, overlap, row > 0, row + 1 < rows);
            let src_row = tile.row(y as u32);
            let out_y = origin_y + y;
            for (x, &wx) in ramp_x.iter().enumerate() {
                let weight = wx * wy;
                let out_idx = out_y * out_w + origin_x + x;
                weights[out_idx] += weight;
                let src_px = &src_row[x * channels..(x + 1) * channels];
                let acc_px = &mut accum[out_idx * channels..(out_idx + 1) * channels];
                for (acc, &value) in acc_px.iter_mut().zip(src_px) {
                    *acc += value as f32 * weight;
                }
            }
        }
    }

    let data: Vec<u8> = accum
        .chunks_exact(channels)
        .zip(&weights)
        .flat_map(|(px, &weight)| {
            px.iter().map(move |&sum| {
                if weight > 0.0 {
                    (sum / weight).round().clamp(0.0, 255.0) as u8
                } else {
                    0
                }
            })
        })
        .collect();

    assert_invariant!(
        data.len() == out_w * out_h * channels,
        "Buffer length must equal width * height * channels",
        "ops::stitch"
    );

    ImageBuffer::from_raw(out_w as u32, out_h as u32, first.format(), data)
}

/// Weight of coordinate `i` inside a tile of extent `len`.
///
/// Ramps linearly over the first `overlap` samples when a neighbour
/// precedes the tile and over the last `overlap` samples when one follows
/// it; paired ramps of two neighbours always sum to one.
fn feather_weight(i: usize, len: usize, overlap: usize, has_prev: bool, has_next: bool) -> f32 {
    if overlap == 0 {
        return 1.0;
    }
    let denom = (overlap + 1) as f32;
    let mut weight = 1.0f32;
    if has_prev && i < overlap {
        weight = weight.min((i + 1) as f32 / denom);
    }
    if has_next && i >= len - overlap {
        weight = weight.min((len - i) as f32 / denom);
    }
    weight
}
