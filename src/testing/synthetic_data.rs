//! Synthetic test images
//!
//! Checkerboards are maximally sharp at small cell sizes, solids have a
//! sharpness score of exactly zero, and gradients sit in between. All images
//! are RGBA and fully opaque unless noted.

use crate::bitmap::{Bitmap, BitmapConfig};
use crate::types::{ImageBuffer, PixelFormat};

/// Black/white checkerboard with square cells of `cell` pixels.
pub fn checkerboard(width: u32, height: u32, cell: u32) -> ImageBuffer {
    let cell = cell.max(1);
    let mut buf = ImageBuffer::new(width, height, PixelFormat::Rgba8);
    for y in 0..height {
        for x in 0..width {
            let v = if ((x / cell) + (y / cell)) % 2 == 0 { 255 } else { 0 };
            buf.put_pixel(x, y, &[v, v, v, 255]);
        }
    }
    buf
}

/// Horizontal ramp from black on the left to white on the right.
pub fn gradient(width: u32, height: u32) -> ImageBuffer {
    let mut buf = ImageBuffer::new(width, height, PixelFormat::Rgba8);
    let span = width.saturating_sub(1).max(1);
    for y in 0..height {
        for x in 0..width {
            let v = (x * 255 / span) as u8;
            buf.put_pixel(x, y, &[v, v, v, 255]);
        }
    }
    buf
}

pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> ImageBuffer {
    ImageBuffer::from_rgba(width, height, rgba)
}

/// Pixel `i` (row-major) holds `[i, i + 1, i + 2, 255]` modulo 256, so every
/// pixel of a small image is distinguishable.
pub fn numbered(width: u32, height: u32) -> ImageBuffer {
    let data = (0..width * height)
        .flat_map(|i| {
            let v = (i % 256) as u8;
            [v, v.wrapping_add(1), v.wrapping_add(2), 255]
        })
        .collect();
    ImageBuffer::from_raw(width, height, PixelFormat::Rgba8, data)
        .unwrap_or_else(|_| ImageBuffer::new(width, height, PixelFormat::Rgba8))
}

/// Repeatable pseudo-random texture (xorshift seeded by `seed`).
pub fn pseudo_noise(width: u32, height: u32, seed: u64) -> ImageBuffer {
    let mut state = seed.max(1);
    let mut buf = ImageBuffer::new(width, height, PixelFormat::Rgba8);
    for px in buf.data_mut().chunks_exact_mut(4) {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let v = (state >> 24) as u8;
        px.copy_from_slice(&[v, v.rotate_left(3), v.rotate_right(2), 255]);
    }
    buf
}

/// Wrap a synthetic buffer as a platform bitmap of the given config.
pub fn synthetic_bitmap(buffer: &ImageBuffer, config: BitmapConfig) -> Bitmap {
    Bitmap::from_buffer(buffer, config)
        .unwrap_or_else(|_| Bitmap::new(buffer.width(), buffer.height(), config))
}
