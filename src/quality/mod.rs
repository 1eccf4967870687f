/// Image quality assessment
///
/// Currently blur detection: a Laplacian-variance sharpness score compared
/// against a threshold.
pub mod blur;

pub use blur::{
    detect_blur, laplacian_variance, BlurDetector, BlurLevel, BlurMetrics, DEFAULT_BLUR_THRESHOLD,
};
