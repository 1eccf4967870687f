//! Configuration management for CrabBlur
//!
//! Loads and saves the runtime options for blurring, blur detection,
//! flipping, stitching and file output as a TOML document.

use crate::errors::ProcessingError;
use crate::ops::{BorderMode, FlipAxis, StitchLayout, StitchOptions};
use crate::quality::DEFAULT_BLUR_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Highest slider position.
pub const MAX_PROGRESS: u32 = 100;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrabBlurConfig {
    pub blur: BlurConfig,
    pub detection: DetectionConfig,
    pub flip: FlipConfig,
    pub stitch: StitchConfig,
    pub output: OutputConfig,
}

/// Gaussian blur configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlurConfig {
    /// Slider position used when none is given (0-100)
    pub default_progress: u32,
    /// Lower bound for slider-derived sigma
    pub min_sigma: f32,
    /// Upper bound for slider-derived sigma
    pub max_sigma: f32,
    pub border: BorderMode,
}

/// Blur detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Laplacian variance below which an image counts as blurred
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlipConfig {
    pub axis: FlipAxis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StitchConfig {
    pub layout: StitchLayout,
    /// Pixels shared by neighbouring tiles
    pub overlap: u32,
}

/// Output file configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for files written without an explicit path
    pub output_directory: String,
    /// Default image format (png, jpeg, bmp)
    pub default_format: String,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
}

impl Default for CrabBlurConfig {
    fn default() -> Self {
        Self {
            blur: BlurConfig {
                default_progress: 0,
                min_sigma: 0.1,
                max_sigma: 10.0,
                border: BorderMode::Replicate,
            },
            detection: DetectionConfig {
                threshold: DEFAULT_BLUR_THRESHOLD,
            },
            flip: FlipConfig {
                axis: FlipAxis::Vertical,
            },
            stitch: StitchConfig {
                layout: StitchLayout::Horizontal,
                overlap: 0,
            },
            output: OutputConfig {
                output_directory: "./output".to_string(),
                default_format: "png".to_string(),
                jpeg_quality: 95,
            },
        }
    }
}

impl StitchConfig {
    pub fn options(&self) -> StitchOptions {
        StitchOptions {
            layout: self.layout,
            overlap: self.overlap,
        }
    }
}

impl BlurConfig {
    /// Map a slider position to sigma: `progress / 10`, clamped to
    /// `[min_sigma, max_sigma]`. Progress above 100 counts as 100.
    pub fn sigma_from_progress(&self, progress: u32) -> f32 {
        let progress = progress.min(MAX_PROGRESS);
        (progress as f32 / 10.0).clamp(self.min_sigma, self.max_sigma)
    }
}

impl CrabBlurConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ProcessingError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| ProcessingError::Config(format!("Failed to read config file: {}", e)))?;

        let config: CrabBlurConfig = toml::from_str(&contents)
            .map_err(|e| ProcessingError::Config(format!("Failed to parse config file: {}", e)))?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ProcessingError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    ProcessingError::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ProcessingError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| ProcessingError::Config(format!("Failed to write config file: {}", e)))?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        PathBuf::from("crabblur.toml")
    }

    /// Load from default location, falling back to defaults on any error
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.blur.default_progress > MAX_PROGRESS {
            return Err("Default progress must be between 0 and 100".to_string());
        }
        if !self.blur.min_sigma.is_finite() || self.blur.min_sigma <= 0.0 {
            return Err("Minimum sigma must be a positive number".to_string());
        }
        if !self.blur.max_sigma.is_finite() || self.blur.max_sigma < self.blur.min_sigma {
            return Err("Maximum sigma must not be below the minimum sigma".to_string());
        }

        if !self.detection.threshold.is_finite() || self.detection.threshold <= 0.0 {
            return Err("Detection threshold must be a positive number".to_string());
        }

        if let StitchLayout::Grid { columns: 0 } = self.stitch.layout {
            return Err("Grid layout needs at least one column".to_string());
        }

        if self.output.jpeg_quality == 0 || self.output.jpeg_quality > 100 {
            return Err("JPEG quality must be between 1 and 100".to_string());
        }
        if !matches!(
            self.output.default_format.to_ascii_lowercase().as_str(),
            "png" | "jpeg" | "jpg" | "bmp"
        ) {
            return Err(format!(
                "Unsupported output format: {}",
                self.output.default_format
            ));
        }

        Ok(())
    }
}
