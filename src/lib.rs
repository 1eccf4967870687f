//! CrabBlur: Gaussian blur, flip, stitching and blur detection for 8-bit images
//!
//! This crate provides the image operations behind a simple photo viewer:
//! a slider-driven Gaussian blur, a flip button, a blur verdict computed
//! from the variance of the Laplacian, and composition of several images
//! into one.
//!
//! # Features
//! - Separable Gaussian blur with selectable border handling
//! - Flip along rows, columns or both, into a new buffer or in place
//! - Laplacian-variance blur detection with graded metrics
//! - Stitching of same-sized tiles with optional feathered overlap
//! - Platform bitmap conversion (RGBA_8888, RGB_565, premultiplied alpha)
//! - TOML configuration and a headless preview session
//!
//! # Usage
//! ```rust
//! use crabblur::ops::gaussian_blur;
//! use crabblur::quality::detect_blur;
//! use crabblur::testing::checkerboard;
//!
//! let sharp = checkerboard(8, 8, 1);
//! let mut blurred = sharp.clone();
//! gaussian_blur(&sharp, &mut blurred, 5.0).unwrap();
//!
//! assert!(!detect_blur(&sharp, 10.0).unwrap());
//! assert!(detect_blur(&blurred, 10.0).unwrap());
//! ```
pub mod bitmap;
pub mod commands;
pub mod config;
pub mod errors;
pub mod invariant_ppt;
pub mod ops;
pub mod quality;
pub mod session;
pub mod types;

// Testing utilities - synthetic images for offline testing
pub mod testing;

// Re-exports for convenience
pub use bitmap::{Bitmap, BitmapConfig};
pub use config::CrabBlurConfig;
pub use errors::{ErrorKind, ProcessingError};
pub use ops::{BorderMode, FlipAxis, ImageOperator, StitchLayout, StitchOptions};
pub use quality::{BlurDetector, BlurLevel, BlurMetrics};
pub use session::{PreviewOutcome, PreviewSession};
pub use types::{ImageBuffer, PixelFormat};

/// Initialize logging for the processing pipeline
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "crabblur=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get crate information
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
        parallel: cfg!(feature = "parallel"),
    }
}

/// Crate information structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    /// Whether operators split rows across threads
    pub parallel: bool,
}
