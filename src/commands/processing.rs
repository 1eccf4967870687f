/// Bitmap processing commands
///
/// The boundary calls of the viewer: each takes platform bitmaps, converts
/// them to working buffers, runs one operator and writes the result back.
use crate::bitmap::{Bitmap, BitmapConfig};
use crate::commands::config::current_config;
use crate::config::CrabBlurConfig;
use crate::errors::{ProcessingError, Result};
use crate::ops::{self, FlipAxis};
use crate::quality::{BlurDetector, BlurMetrics};

fn configured() -> Result<CrabBlurConfig> {
    current_config().map_err(ProcessingError::Config)
}

/// Flip `input` into `output` along the configured axis.
pub fn flip_bitmap(input: &Bitmap, output: &mut Bitmap) -> Result<()> {
    let axis = configured()?.flip.axis;
    flip_bitmap_along(input, output, axis)
}

pub fn flip_bitmap_along(input: &Bitmap, output: &mut Bitmap, axis: FlipAxis) -> Result<()> {
    log::info!(
        "Flip requested: {}x{} -> {}x{} along {:?}",
        input.width(),
        input.height(),
        output.width(),
        output.height(),
        axis
    );

    let src = input.to_buffer(input.is_premultiplied())?;
    let mut dst = src.clone();
    ops::flip(&src, &mut dst, axis).map_err(|e| {
        log::error!("Flip failed: {}", e);
        e
    })?;

    let premultiply = output.is_premultiplied();
    output.write_buffer(&dst, premultiply).map_err(|e| {
        log::error!("Failed to write flipped bitmap: {}", e);
        e
    })
}

/// Flip a bitmap onto itself along the configured axis.
pub fn flip_bitmap_in_place(bitmap: &mut Bitmap) -> Result<()> {
    let axis = configured()?.flip.axis;
    log::info!(
        "In-place flip requested: {}x{} along {:?}",
        bitmap.width(),
        bitmap.height(),
        axis
    );

    let premultiplied = bitmap.is_premultiplied();
    let mut buffer = bitmap.to_buffer(premultiplied)?;
    ops::flip_in_place(&mut buffer, axis)?;
    bitmap.write_buffer(&buffer, premultiplied)
}

/// Gaussian-blur `input` into `output` with the configured border mode.
pub fn blur_bitmap(input: &Bitmap, output: &mut Bitmap, sigma: f32) -> Result<()> {
    let border = configured()?.blur.border;
    log::info!(
        "Blur requested: {}x{} sigma={} border={:?}",
        input.width(),
        input.height(),
        sigma,
        border
    );

    if input.dimensions() != output.dimensions() {
        let err = ProcessingError::DimensionMismatch {
            expected: input.dimensions(),
            got: output.dimensions(),
        };
        log::error!("Blur rejected: {}", err);
        return Err(err);
    }

    let src = input.to_buffer(input.is_premultiplied())?;
    let mut dst = src.clone();
    ops::gaussian_blur_with_border(&src, &mut dst, sigma, border).map_err(|e| {
        log::error!("Blur failed: {}", e);
        e
    })?;

    let premultiply = output.is_premultiplied();
    output.write_buffer(&dst, premultiply)
}

/// Stitch `inputs` with the configured layout and append the composite to
/// `outputs` as a new RGBA_8888 bitmap.
pub fn stitch_bitmaps(inputs: &[Bitmap], outputs: &mut Vec<Bitmap>) -> Result<()> {
    let options = configured()?.stitch.options();
    log::info!(
        "Stitch requested: {} bitmaps, layout={}, overlap={}",
        inputs.len(),
        options.layout,
        options.overlap
    );

    let buffers = inputs
        .iter()
        .map(|bitmap| bitmap.to_buffer(bitmap.is_premultiplied()))
        .collect::<Result<Vec<_>>>()?;

    let composite = ops::stitch_images(&buffers, &options).map_err(|e| {
        log::error!("Stitch failed: {}", e);
        e
    })?;

    let bitmap = Bitmap::from_buffer(&composite, BitmapConfig::Rgba8888)?;
    log::info!(
        "Stitched composite: {}x{}",
        bitmap.width(),
        bitmap.height()
    );
    outputs.push(bitmap);
    Ok(())
}

/// True when the bitmap's sharpness score is below `threshold`.
pub fn detect_blur(input: &Bitmap, threshold: f64) -> Result<bool> {
    Ok(analyze_blur(input, threshold)?.is_blurred)
}

/// Full blur analysis of a bitmap.
pub fn analyze_blur(input: &Bitmap, threshold: f64) -> Result<BlurMetrics> {
    let detector = BlurDetector::new(threshold)?;
    let buffer = input.to_buffer(input.is_premultiplied())?;
    let metrics = detector.analyze(&buffer)?;

    log::info!(
        "Blur analysis: variance={:.2}, threshold={}, blurred={}",
        metrics.variance,
        metrics.threshold,
        metrics.is_blurred
    );
    Ok(metrics)
}

/// Blur analysis with the configured detection threshold.
pub fn analyze_blur_default(input: &Bitmap) -> Result<BlurMetrics> {
    let threshold = configured()?.detection.threshold;
    analyze_blur(input, threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::types::ImageBuffer;

    fn gradient_bitmap(width: u32, height: u32) -> Bitmap {
        let data = (0..width * height)
            .flat_map(|i| {
                let v = (i * 255 / (width * height)) as u8;
                [v, 255 - v, v / 2, 255]
            })
            .collect();
        let buf = ImageBuffer::from_raw(width, height, crate::types::PixelFormat::Rgba8, data)
            .unwrap();
        Bitmap::from_buffer(&buf, BitmapConfig::Rgba8888).unwrap()
    }

    #[test]
    fn test_flip_bitmap_along_vertical() {
        let input = gradient_bitmap(3, 4);
        let mut output = Bitmap::new(3, 4, BitmapConfig::Rgba8888);
        flip_bitmap_along(&input, &mut output, FlipAxis::Vertical).unwrap();

        let src = input.to_buffer(false).unwrap();
        let dst = output.to_buffer(false).unwrap();
        assert_eq!(dst.row(0), src.row(3));
        assert_eq!(dst.row(3), src.row(0));
    }

    #[test]
    fn test_flip_bitmap_into_rgb565_output() {
        let input = gradient_bitmap(2, 2);
        let mut output = Bitmap::new(2, 2, BitmapConfig::Rgb565);
        flip_bitmap_along(&input, &mut output, FlipAxis::Horizontal).unwrap();
        assert_eq!(output.config(), BitmapConfig::Rgb565);
        assert_eq!(output.pixels().len(), 8);
    }

    #[test]
    fn test_blur_bitmap_rejects_mismatched_output() {
        let input = gradient_bitmap(4, 4);
        let mut output = Bitmap::new(4, 2, BitmapConfig::Rgba8888);
        let err = blur_bitmap(&input, &mut output, 1.0).unwrap_err();
        assert_eq!(
            err,
            ProcessingError::DimensionMismatch {
                expected: (4, 4),
                got: (4, 2),
            }
        );
    }

    #[test]
    fn test_blur_bitmap_rejects_bad_sigma() {
        let input = gradient_bitmap(4, 4);
        let mut output = Bitmap::new(4, 4, BitmapConfig::Rgba8888);
        let err = blur_bitmap(&input, &mut output, 0.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_analyze_blur_on_flat_bitmap() {
        let flat = Bitmap::from_buffer(
            &ImageBuffer::from_rgba(8, 8, [40, 40, 40, 255]),
            BitmapConfig::Rgba8888,
        )
        .unwrap();
        let metrics = analyze_blur(&flat, 10.0).unwrap();
        assert_eq!(metrics.variance, 0.0);
        assert!(detect_blur(&flat, 10.0).unwrap());
        assert!(detect_blur(&flat, -1.0).is_err());
    }
}
