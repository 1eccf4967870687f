//! Platform bitmap boundary
//!
//! A [`Bitmap`] is the pixel container that crosses the application
//! boundary: either RGBA_8888 (R, G, B, A bytes, optionally premultiplied)
//! or RGB_565 (one little-endian 16-bit word per pixel, red in the high
//! bits). Operators never work on bitmaps directly; they are converted to an
//! RGBA [`ImageBuffer`] on the way in and written back on the way out.

use crate::errors::{ProcessingError, Result};
use crate::types::{ImageBuffer, PixelFormat};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BitmapConfig {
    Rgba8888,
    Rgb565,
}

impl BitmapConfig {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            BitmapConfig::Rgba8888 => 4,
            BitmapConfig::Rgb565 => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bitmap {
    width: u32,
    height: u32,
    config: BitmapConfig,
    premultiplied: bool,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Zeroed bitmap (transparent black for RGBA_8888).
    pub fn new(width: u32, height: u32, config: BitmapConfig) -> Self {
        let len = width as usize * height as usize * config.bytes_per_pixel();
        Self {
            width,
            height,
            config,
            premultiplied: false,
            pixels: vec![0; len],
        }
    }

    pub fn from_pixels(
        width: u32,
        height: u32,
        config: BitmapConfig,
        pixels: Vec<u8>,
    ) -> Result<Self> {
        let expected = width as usize * height as usize * config.bytes_per_pixel();
        if pixels.len() != expected {
            return Err(ProcessingError::DataCorruption {
                len: pixels.len(),
                expected,
            });
        }
        Ok(Self {
            width,
            height,
            config,
            premultiplied: false,
            pixels,
        })
    }

    /// New bitmap holding `buffer` converted into `config`.
    pub fn from_buffer(buffer: &ImageBuffer, config: BitmapConfig) -> Result<Self> {
        let mut bitmap = Self::new(buffer.width(), buffer.height(), config);
        bitmap.write_buffer(buffer, false)?;
        Ok(bitmap)
    }

    pub fn with_premultiplied(mut self, premultiplied: bool) -> Self {
        self.premultiplied = premultiplied;
        self
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

    pub fn config(&self) -> BitmapConfig {
        self.config
    }

    pub fn is_premultiplied(&self) -> bool {
        self.premultiplied
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Read the bitmap into an RGBA buffer.
    ///
    /// With `unpremultiply` set, premultiplied RGBA_8888 colour values are
    /// divided back by alpha. RGB_565 pixels become opaque RGBA.
    pub fn to_buffer(&self, unpremultiply: bool) -> Result<ImageBuffer> {
        let data = match self.config {
            BitmapConfig::Rgba8888 => {
                if unpremultiply {
                    self.pixels
                        .chunks_exact(4)
                        .flat_map(|px| {
                            let a = px[3];
                            [
                                unpremultiply_channel(px[0], a),
                                unpremultiply_channel(px[1], a),
                                unpremultiply_channel(px[2], a),
                                a,
                            ]
                        })
                        .collect()
                } else {
                    self.pixels.clone()
                }
            }
            BitmapConfig::Rgb565 => self
                .pixels
                .chunks_exact(2)
                .flat_map(|word| {
                    let [r, g, b] = unpack_rgb565(u16::from_le_bytes([word[0], word[1]]));
                    [r, g, b, 255]
                })
                .collect(),
        };
        ImageBuffer::from_raw(self.width, self.height, PixelFormat::Rgba8, data)
    }

    /// Overwrite the bitmap's pixels with `src`, converting into the
    /// bitmap's own config.
    ///
    /// Gray, RGB and RGBA sources are accepted. `premultiply` multiplies
    /// colour by alpha for RGBA_8888 targets, and the premultiplied flag is
    /// reset to match what was written.
    pub fn write_buffer(&mut self, src: &ImageBuffer, premultiply: bool) -> Result<()> {
        if src.dimensions() != self.dimensions() {
            return Err(ProcessingError::DimensionMismatch {
                expected: self.dimensions(),
                got: src.dimensions(),
            });
        }

        let rgba = src.to_rgba();
        self.pixels = match self.config {
            BitmapConfig::Rgba8888 => {
                if premultiply {
                    rgba.data()
                        .chunks_exact(4)
                        .flat_map(|px| {
                            let a = px[3];
                            [
                                premultiply_channel(px[0], a),
                                premultiply_channel(px[1], a),
                                premultiply_channel(px[2], a),
                                a,
                            ]
                        })
                        .collect()
                } else {
                    rgba.into_raw()
                }
            }
            BitmapConfig::Rgb565 => rgba
                .data()
                .chunks_exact(4)
                .flat_map(|px| pack_rgb565(px[0], px[1], px[2]).to_le_bytes())
                .collect(),
        };
        self.premultiplied = premultiply && self.config == BitmapConfig::Rgba8888;
        Ok(())
    }

    /// Decode an encoded image (PNG, JPEG, ...) into an RGBA_8888 bitmap.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| ProcessingError::Decode(format!("Failed to decode image: {}", e)))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        log::debug!("Decoded {}x{} bitmap", width, height);
        Self::from_pixels(width, height, BitmapConfig::Rgba8888, img.into_raw())
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            ProcessingError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;
        log::info!("Loaded {} bytes from {:?}", bytes.len(), path);
        Self::decode(&bytes)
    }

    /// Encode to disk, picking the format from the file extension (JPEG
    /// with `jpeg_quality`, PNG when the extension is unknown).
    pub fn save<P: AsRef<Path>>(&self, path: P, jpeg_quality: u8) -> Result<()> {
        let path = path.as_ref();
        let rgba = self.to_buffer(self.premultiplied)?;
        let img = image::RgbaImage::from_raw(self.width, self.height, rgba.into_raw())
            .ok_or_else(|| ProcessingError::Encode("Failed to create image from bitmap".to_string()))?;
        let dynamic_img = image::DynamicImage::ImageRgba8(img);

        let format = image::ImageFormat::from_path(path).unwrap_or(image::ImageFormat::Png);

        let result = if format == image::ImageFormat::Jpeg {
            let file = File::create(path)?;
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                BufWriter::new(file),
                jpeg_quality.clamp(1, 100),
            );
            image::DynamicImage::ImageRgb8(dynamic_img.to_rgb8()).write_with_encoder(encoder)
        } else {
            dynamic_img.save_with_format(path, format)
        };

        result.map_err(|e| {
            log::error!("Failed to save bitmap: {}", e);
            ProcessingError::Encode(format!("Failed to save {}: {}", path.display(), e))
        })?;

        log::info!("Saved {}x{} bitmap to {:?}", self.width, self.height, path);
        Ok(())
    }
}

fn premultiply_channel(value: u8, alpha: u8) -> u8 {
    ((value as u32 * alpha as u32 + 127) / 255) as u8
}

fn unpremultiply_channel(value: u8, alpha: u8) -> u8 {
    if alpha == 0 {
        return 0;
    }
    let a = alpha as u32;
    ((value as u32 * 255 + a / 2) / a).min(255) as u8
}

/// Expand 5/6/5-bit fields to 8 bits by bit replication.
fn unpack_rgb565(word: u16) -> [u8; 3] {
    let r = ((word >> 11) & 0x1f) as u8;
    let g = ((word >> 5) & 0x3f) as u8;
    let b = (word & 0x1f) as u8;
    [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]
}

fn pack_rgb565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb565_extremes() {
        assert_eq!(unpack_rgb565(0xffff), [255, 255, 255]);
        assert_eq!(unpack_rgb565(0x0000), [0, 0, 0]);
        assert_eq!(unpack_rgb565(pack_rgb565(255, 0, 0)), [255, 0, 0]);
        assert_eq!(pack_rgb565(0, 255, 0), 0x07e0);
    }

    #[test]
    fn test_rgb565_bitmap_to_buffer_is_opaque() {
        let word = pack_rgb565(255, 0, 255).to_le_bytes();
        let bitmap = Bitmap::from_pixels(1, 1, BitmapConfig::Rgb565, word.to_vec()).unwrap();
        let buf = bitmap.to_buffer(false).unwrap();
        assert_eq!(buf.format(), PixelFormat::Rgba8);
        assert_eq!(buf.data(), &[255, 0, 255, 255]);
    }

    #[test]
    fn test_premultiply_round_trip_for_opaque_pixels() {
        let buf = ImageBuffer::from_rgba(2, 1, [10, 20, 30, 255]);
        let mut bitmap = Bitmap::new(2, 1, BitmapConfig::Rgba8888);
        bitmap.write_buffer(&buf, true).unwrap();
        assert!(bitmap.is_premultiplied());
        assert_eq!(bitmap.to_buffer(true).unwrap(), buf);
    }

    #[test]
    fn test_straight_write_clears_premultiplied_flag() {
        let mut bitmap = Bitmap::new(1, 1, BitmapConfig::Rgba8888).with_premultiplied(true);
        let straight = ImageBuffer::from_rgba(1, 1, [200, 100, 50, 128]);
        bitmap.write_buffer(&straight, false).unwrap();

        assert!(!bitmap.is_premultiplied());
        assert_eq!(bitmap.pixels(), &[200, 100, 50, 128]);
        assert_eq!(bitmap.to_buffer(bitmap.is_premultiplied()).unwrap(), straight);
    }

    #[test]
    fn test_premultiply_scales_by_alpha() {
        assert_eq!(premultiply_channel(200, 128), 100);
        assert_eq!(unpremultiply_channel(100, 128), 199);
        assert_eq!(unpremultiply_channel(50, 0), 0);
    }

    #[test]
    fn test_write_buffer_accepts_gray_source() {
        let gray = ImageBuffer::from_raw(2, 1, PixelFormat::Gray8, vec![7, 9]).unwrap();
        let mut bitmap = Bitmap::new(2, 1, BitmapConfig::Rgba8888);
        bitmap.write_buffer(&gray, false).unwrap();
        assert_eq!(bitmap.pixels(), &[7, 7, 7, 255, 9, 9, 9, 255]);
    }

    #[test]
    fn test_write_buffer_rejects_size_mismatch() {
        let buf = ImageBuffer::from_rgba(3, 3, [0, 0, 0, 255]);
        let mut bitmap = Bitmap::new(2, 2, BitmapConfig::Rgba8888);
        let err = bitmap.write_buffer(&buf, false).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let err = Bitmap::decode(b"definitely not an image").unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Decode);
    }

    #[test]
    fn test_from_pixels_validates_length() {
        let err = Bitmap::from_pixels(2, 2, BitmapConfig::Rgb565, vec![0; 6]).unwrap_err();
        assert!(matches!(err, ProcessingError::DataCorruption { len: 6, expected: 8 }));
    }
}
