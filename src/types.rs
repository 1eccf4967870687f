//! Core image value types.

use crate::errors::{ProcessingError, Result};
use serde::{Deserialize, Serialize};

/// 8-bit pixel layouts an [`ImageBuffer`] can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    Gray8,
    Rgb8,
    /// R, G, B, A byte order, straight (not premultiplied) alpha.
    Rgba8,
}

impl PixelFormat {
    pub const fn channels(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PixelFormat::Gray8 => "gray8",
            PixelFormat::Rgb8 => "rgb8",
            PixelFormat::Rgba8 => "rgba8",
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row-major 2D pixel grid that owns its storage.
///
/// `data.len() == width * height * format.channels()` holds for every
/// buffer handed out by the constructors; the fields are private so it
/// cannot be broken afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl ImageBuffer {
    /// Zero-filled buffer.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self::filled(width, height, format, 0)
    }

    /// Buffer with every byte set to `value`.
    pub fn filled(width: u32, height: u32, format: PixelFormat, value: u8) -> Self {
        let len = width as usize * height as usize * format.channels();
        Self {
            width,
            height,
            format,
            data: vec![value; len],
        }
    }

    /// Wrap existing pixel data, validating its length.
    pub fn from_raw(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * format.channels();
        if data.len() != expected {
            return Err(ProcessingError::DataCorruption {
                len: data.len(),
                expected,
            });
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// Build an RGBA buffer where every pixel has the same colour.
    pub fn from_rgba(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixel_count = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixel_count * 4);
        for _ in 0..pixel_count {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            format: PixelFormat::Rgba8,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn channels(&self) -> usize {
        self.format.channels()
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * self.channels()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Bytes of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &mut self.data[start..start + stride]
    }

    fn pixel_offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * self.channels())
    }

    /// Channel values of the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is outside the image. See [`ImageBuffer::get_pixel`].
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        match self.get_pixel(x, y) {
            Some(px) => px,
            None => panic!(
                "pixel ({}, {}) out of bounds for {}x{} image",
                x, y, self.width, self.height
            ),
        }
    }

    /// Channel values of the pixel at (x, y), or `None` outside the image.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        let idx = self.pixel_offset(x, y)?;
        Some(&self.data[idx..idx + self.channels()])
    }

    /// Overwrite the pixel at (x, y) with the first `channels()` values of
    /// `value`.
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is outside the image or `value` holds fewer than
    /// `channels()` values. See [`ImageBuffer::try_put_pixel`].
    pub fn put_pixel(&mut self, x: u32, y: u32, value: &[u8]) {
        if let Err(e) = self.try_put_pixel(x, y, value) {
            panic!("put_pixel: {}", e);
        }
    }

    pub fn try_put_pixel(&mut self, x: u32, y: u32, value: &[u8]) -> Result<()> {
        let channels = self.channels();
        let idx = self.pixel_offset(x, y).ok_or_else(|| {
            ProcessingError::invalid_argument(format!(
                "pixel ({}, {}) out of bounds for {}x{} image",
                x, y, self.width, self.height
            ))
        })?;
        if value.len() < channels {
            return Err(ProcessingError::invalid_argument(format!(
                "pixel value has {} channels, {} needs {}",
                value.len(),
                self.format,
                channels
            )));
        }
        self.data[idx..idx + channels].copy_from_slice(&value[..channels]);
        Ok(())
    }

    /// True when both buffers have the same width, height and format.
    pub fn same_shape(&self, other: &ImageBuffer) -> bool {
        self.width == other.width && self.height == other.height && self.format == other.format
    }

    /// Fail with `DimensionMismatch` (or `InvalidArgument` for a format
    /// mismatch) unless `other` has the same shape as `self`.
    pub fn ensure_same_shape(&self, other: &ImageBuffer) -> Result<()> {
        if self.dimensions() != other.dimensions() {
            return Err(ProcessingError::DimensionMismatch {
                expected: self.dimensions(),
                got: other.dimensions(),
            });
        }
        if self.format != other.format {
            return Err(ProcessingError::invalid_argument(format!(
                "pixel format mismatch: expected {}, got {}",
                self.format, other.format
            )));
        }
        Ok(())
    }

    pub fn ensure_not_empty(&self, what: &str) -> Result<()> {
        if self.is_empty() {
            return Err(ProcessingError::invalid_argument(format!(
                "{} buffer is empty ({}x{})",
                what, self.width, self.height
            )));
        }
        Ok(())
    }

    /// Replace contents with a copy of `src`, reusing the allocation when
    /// the shapes already agree.
    pub fn copy_from(&mut self, src: &ImageBuffer) {
        if self.same_shape(src) {
            self.data.copy_from_slice(&src.data);
        } else {
            *self = src.clone();
        }
    }

    /// Luma plane, rounded to 8 bits.
    ///
    /// Uses the Rec.601 weights; alpha is ignored and gray buffers are
    /// returned unchanged.
    pub fn to_gray(&self) -> ImageBuffer {
        if self.format == PixelFormat::Gray8 {
            return self.clone();
        }
        let channels = self.channels();
        let data = self
            .data
            .chunks_exact(channels)
            .map(|px| luminance(px[0], px[1], px[2]))
            .collect();
        ImageBuffer {
            width: self.width,
            height: self.height,
            format: PixelFormat::Gray8,
            data,
        }
    }

    /// Expand to RGBA with opaque alpha; RGBA buffers are cloned.
    pub fn to_rgba(&self) -> ImageBuffer {
        let data = match self.format {
            PixelFormat::Rgba8 => self.data.clone(),
            PixelFormat::Rgb8 => self
                .data
                .chunks_exact(3)
                .flat_map(|px| [px[0], px[1], px[2], 255])
                .collect(),
            PixelFormat::Gray8 => self.data.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        };
        ImageBuffer {
            width: self.width,
            height: self.height,
            format: PixelFormat::Rgba8,
            data,
        }
    }
}

/// Rec.601 luma of an RGB triple, rounded to the nearest integer.
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    y.round().clamp(0.0, 255.0) as u8
}
