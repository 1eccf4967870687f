//! Command layer testing
//!
//! Exercises the bitmap boundary commands and the global configuration
//! commands. Tests touching the process-wide configuration hold
//! `CONFIG_LOCK` and point it at a temporary file first.

use crabblur::bitmap::{Bitmap, BitmapConfig};
use crabblur::commands::{
    analyze_blur, analyze_blur_default, blur_bitmap, detect_blur, flip_bitmap,
    flip_bitmap_in_place, get_blur_config, get_config, get_detection_config, get_stitch_config,
    initialize, load_config_from, reset_config, stitch_bitmaps, update_config,
};
use crabblur::config::CrabBlurConfig;
use crabblur::errors::{ErrorKind, ProcessingError};
use crabblur::ops::{FlipAxis, StitchLayout};
use crabblur::testing::{checkerboard, numbered, solid, synthetic_bitmap};
use std::sync::{Mutex, MutexGuard};
use tempfile::{tempdir, TempDir};

static CONFIG_LOCK: Mutex<()> = Mutex::new(());

/// Serialize access to the global configuration and start from defaults
/// backed by a fresh temporary file.
fn isolated_config() -> (MutexGuard<'static, ()>, TempDir) {
    let guard = CONFIG_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempdir().unwrap();
    load_config_from(dir.path().join("crabblur.toml")).unwrap();
    (guard, dir)
}

#[test]
fn test_initialize_reports_crate_info() {
    let (_guard, _dir) = isolated_config();
    let info = initialize().unwrap();
    assert_eq!(info.name, "crabblur");
    assert!(!info.version.is_empty());
}

#[test]
fn test_flip_bitmap_uses_configured_axis() {
    let (_guard, _dir) = isolated_config();
    let input = synthetic_bitmap(&numbered(4, 3), BitmapConfig::Rgba8888);

    let mut output = Bitmap::new(4, 3, BitmapConfig::Rgba8888);
    flip_bitmap(&input, &mut output).unwrap();
    let src = input.to_buffer(false).unwrap();
    let dst = output.to_buffer(false).unwrap();
    assert_eq!(dst.row(0), src.row(2));

    let mut config = get_config().unwrap();
    config.flip.axis = FlipAxis::Horizontal;
    update_config(config).unwrap();

    flip_bitmap(&input, &mut output).unwrap();
    let dst = output.to_buffer(false).unwrap();
    assert_eq!(dst.pixel(0, 0), src.pixel(3, 0));
}

#[test]
fn test_flip_bitmap_in_place_twice_restores() {
    let (_guard, _dir) = isolated_config();
    let original = synthetic_bitmap(&numbered(5, 5), BitmapConfig::Rgba8888);
    let mut bitmap = original.clone();
    flip_bitmap_in_place(&mut bitmap).unwrap();
    assert_ne!(bitmap, original);
    flip_bitmap_in_place(&mut bitmap).unwrap();
    assert_eq!(bitmap, original);
}

#[test]
fn test_blur_then_detect_on_bitmaps() {
    let (_guard, _dir) = isolated_config();
    let input = synthetic_bitmap(&checkerboard(8, 8, 1), BitmapConfig::Rgba8888);
    let mut output = Bitmap::new(8, 8, BitmapConfig::Rgba8888);

    assert!(!detect_blur(&input, 10.0).unwrap());
    blur_bitmap(&input, &mut output, 5.0).unwrap();
    assert!(detect_blur(&output, 10.0).unwrap());

    let metrics = analyze_blur(&output, 10.0).unwrap();
    assert!(metrics.is_blurred);
    assert!(metrics.variance < 10.0);
}

#[test]
fn test_blur_into_rgb565_output() {
    let (_guard, _dir) = isolated_config();
    let input = synthetic_bitmap(&solid(6, 6, [255, 255, 255, 255]), BitmapConfig::Rgba8888);
    let mut output = Bitmap::new(6, 6, BitmapConfig::Rgb565);
    blur_bitmap(&input, &mut output, 1.0).unwrap();
    assert!(output
        .pixels()
        .chunks_exact(2)
        .all(|word| word == [0xff, 0xff]));
}

#[test]
fn test_stitch_bitmaps_appends_rgba_composite() {
    let (_guard, _dir) = isolated_config();
    let inputs = vec![
        synthetic_bitmap(&solid(3, 2, [255, 0, 0, 255]), BitmapConfig::Rgb565),
        synthetic_bitmap(&solid(3, 2, [0, 0, 255, 255]), BitmapConfig::Rgba8888),
    ];
    let mut outputs = Vec::new();
    stitch_bitmaps(&inputs, &mut outputs).unwrap();

    assert_eq!(outputs.len(), 1);
    let composite = &outputs[0];
    assert_eq!(composite.config(), BitmapConfig::Rgba8888);
    assert_eq!(composite.dimensions(), (6, 2));
    let buf = composite.to_buffer(false).unwrap();
    assert_eq!(buf.pixel(0, 0), &[255, 0, 0, 255]);
    assert_eq!(buf.pixel(5, 1), &[0, 0, 255, 255]);
}

#[test]
fn test_stitch_bitmaps_follows_configured_layout() {
    let (_guard, _dir) = isolated_config();
    let mut config = get_config().unwrap();
    config.stitch.layout = StitchLayout::Vertical;
    update_config(config).unwrap();

    let tile = synthetic_bitmap(&solid(4, 2, [1, 2, 3, 255]), BitmapConfig::Rgba8888);
    let mut outputs = Vec::new();
    stitch_bitmaps(&[tile.clone(), tile.clone(), tile], &mut outputs).unwrap();
    assert_eq!(outputs[0].dimensions(), (4, 6));
}

#[test]
fn test_stitch_bitmaps_rejects_empty_input() {
    let (_guard, _dir) = isolated_config();
    let mut outputs = Vec::new();
    let err = stitch_bitmaps(&[], &mut outputs).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(outputs.is_empty());
}

#[test]
fn test_blur_bitmap_errors_keep_their_kind() {
    let (_guard, _dir) = isolated_config();
    let input = synthetic_bitmap(&checkerboard(8, 8, 1), BitmapConfig::Rgba8888);

    let mut short = Bitmap::new(8, 4, BitmapConfig::Rgba8888);
    let err = blur_bitmap(&input, &mut short, 1.0).unwrap_err();
    assert_eq!(
        err,
        ProcessingError::DimensionMismatch {
            expected: (8, 8),
            got: (8, 4),
        }
    );
    assert_eq!(short.pixels(), Bitmap::new(8, 4, BitmapConfig::Rgba8888).pixels());

    let mut output = Bitmap::new(8, 8, BitmapConfig::Rgba8888);
    let err = blur_bitmap(&input, &mut output, f32::NAN).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = analyze_blur(&input, -5.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_analyze_blur_default_uses_configured_threshold() {
    let (_guard, _dir) = isolated_config();
    let mut config = get_config().unwrap();
    config.detection.threshold = 2.0e6;
    update_config(config).unwrap();

    let sharp = synthetic_bitmap(&checkerboard(8, 8, 1), BitmapConfig::Rgba8888);
    let metrics = analyze_blur_default(&sharp).unwrap();
    assert_eq!(metrics.threshold, 2.0e6);
    assert!(metrics.is_blurred);
}

#[test]
fn test_update_config_persists_to_file() {
    let (_guard, dir) = isolated_config();
    let mut config = get_config().unwrap();
    config.blur.default_progress = 42;
    config.output.jpeg_quality = 70;
    update_config(config.clone()).unwrap();

    let on_disk = CrabBlurConfig::load_from_file(dir.path().join("crabblur.toml")).unwrap();
    assert_eq!(on_disk, config);
    assert_eq!(get_blur_config().unwrap().default_progress, 42);
}

#[test]
fn test_update_config_rejects_invalid_values() {
    let (_guard, _dir) = isolated_config();
    let mut config = get_config().unwrap();
    config.detection.threshold = 0.0;
    assert!(update_config(config).is_err());
    assert_eq!(get_detection_config().unwrap().threshold, 10.0);
}

#[test]
fn test_reset_config_restores_defaults() {
    let (_guard, _dir) = isolated_config();
    let mut config = get_config().unwrap();
    config.stitch.overlap = 3;
    update_config(config).unwrap();
    assert_eq!(get_stitch_config().unwrap().overlap, 3);

    let reset = reset_config().unwrap();
    assert_eq!(reset, CrabBlurConfig::default());
    assert_eq!(get_stitch_config().unwrap().overlap, 0);
}

#[test]
fn test_load_config_from_existing_file() {
    let _guard = CONFIG_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.toml");

    let mut custom = CrabBlurConfig::default();
    custom.flip.axis = FlipAxis::Both;
    custom.stitch.layout = StitchLayout::Grid { columns: 2 };
    custom.save_to_file(&path).unwrap();

    let loaded = load_config_from(&path).unwrap();
    assert_eq!(loaded, custom);
    assert_eq!(get_config().unwrap(), custom);
}
