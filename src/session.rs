//! Headless preview session
//!
//! Reproduces the viewer's data flow without any widgets: a hidden source
//! image, a displayed image that is always the source blurred at the current
//! slider position, and a blur verdict computed after every re-blur.

use crate::config::{CrabBlurConfig, MAX_PROGRESS};
use crate::errors::Result;
use crate::ops::{flip_in_place, gaussian_blur_with_border};
use crate::quality::{BlurDetector, BlurMetrics};
use crate::types::ImageBuffer;
use serde::{Deserialize, Serialize};

/// What a slider move or flip produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewOutcome {
    pub progress: u32,
    pub sigma: f32,
    pub metrics: BlurMetrics,
}

#[derive(Debug, Clone)]
pub struct PreviewSession {
    source: ImageBuffer,
    display: ImageBuffer,
    progress: u32,
    config: CrabBlurConfig,
    detector: BlurDetector,
}

impl PreviewSession {
    /// Start a session on `source`. The display starts as an unblurred copy
    /// and the slider at the configured default position.
    pub fn new(source: ImageBuffer, config: CrabBlurConfig) -> Result<Self> {
        source.ensure_not_empty("source")?;
        let detector = BlurDetector::new(config.detection.threshold)?;
        let progress = config.blur.default_progress.min(MAX_PROGRESS);

        log::info!(
            "Preview session on {}x{} image (progress={}, threshold={})",
            source.width(),
            source.height(),
            progress,
            detector.threshold()
        );

        Ok(Self {
            display: source.clone(),
            source,
            progress,
            config,
            detector,
        })
    }

    pub fn source(&self) -> &ImageBuffer {
        &self.source
    }

    pub fn display(&self) -> &ImageBuffer {
        &self.display
    }

    pub fn progress(&self) -> u32 {
        self.progress
    }

    pub fn config(&self) -> &CrabBlurConfig {
        &self.config
    }

    pub fn into_display(self) -> ImageBuffer {
        self.display
    }

    /// Move the slider, re-blur the display and judge the result.
    pub fn set_progress(&mut self, progress: u32) -> Result<PreviewOutcome> {
        self.progress = progress.min(MAX_PROGRESS);
        self.refresh()
    }

    /// Flip the hidden source, then re-blur at the current position.
    pub fn flip_source(&mut self) -> Result<PreviewOutcome> {
        flip_in_place(&mut self.source, self.config.flip.axis)?;
        self.refresh()
    }

    fn refresh(&mut self) -> Result<PreviewOutcome> {
        let sigma = self.config.blur.sigma_from_progress(self.progress);
        gaussian_blur_with_border(&self.source, &mut self.display, sigma, self.config.blur.border)?;
        let metrics = self.detector.analyze(&self.display)?;

        log::info!(
            "Progress {} -> sigma {:.1}: {} (variance {:.2})",
            self.progress,
            sigma,
            if metrics.is_blurred { "blurred" } else { "not blurred" },
            metrics.variance
        );

        Ok(PreviewOutcome {
            progress: self.progress,
            sigma,
            metrics,
        })
    }
}
