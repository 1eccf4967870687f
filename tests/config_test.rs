use crabblur::config::CrabBlurConfig;
use crabblur::errors::ErrorKind;
use crabblur::ops::{BorderMode, FlipAxis, StitchLayout};
use std::fs;
use tempfile::tempdir;

const HANDWRITTEN: &str = r#"
[blur]
default_progress = 30
min_sigma = 0.5
max_sigma = 6.0
border = "reflect101"

[detection]
threshold = 25.0

[flip]
axis = "horizontal"

[stitch]
layout = "grid:3"
overlap = 4

[output]
output_directory = "/tmp/crabblur"
default_format = "jpeg"
jpeg_quality = 85
"#;

#[test]
fn test_handwritten_file_parses() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("crabblur.toml");
    fs::write(&path, HANDWRITTEN).unwrap();

    let config = CrabBlurConfig::load_from_file(&path).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.blur.default_progress, 30);
    assert_eq!(config.blur.border, BorderMode::Reflect101);
    assert_eq!(config.detection.threshold, 25.0);
    assert_eq!(config.flip.axis, FlipAxis::Horizontal);
    assert_eq!(config.stitch.layout, StitchLayout::Grid { columns: 3 });
    assert_eq!(config.stitch.overlap, 4);
    assert_eq!(config.output.jpeg_quality, 85);

    // slider mapping honours the configured bounds
    assert_eq!(config.blur.sigma_from_progress(0), 0.5);
    assert_eq!(config.blur.sigma_from_progress(100), 6.0);
}

#[test]
fn test_saved_file_is_readable_toml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("defaults.toml");
    CrabBlurConfig::default().save_to_file(&path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    for section in ["[blur]", "[detection]", "[flip]", "[stitch]", "[output]"] {
        assert!(text.contains(section), "missing {}", section);
    }
    assert!(text.contains("layout = \"horizontal\""));
    assert!(text.contains("axis = \"vertical\""));
}

#[test]
fn test_unknown_enum_value_is_config_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, HANDWRITTEN.replace("grid:3", "spiral")).unwrap();

    let err = CrabBlurConfig::load_from_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_missing_section_is_config_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("partial.toml");
    fs::write(&path, "[detection]\nthreshold = 3.0\n").unwrap();
    assert!(CrabBlurConfig::load_from_file(&path).is_err());
}
