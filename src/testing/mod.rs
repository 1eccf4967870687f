//! Testing utilities for CrabBlur
//!
//! Deterministic synthetic images with known sharpness characteristics, for
//! tests and benchmarks that should not depend on image files.

pub mod synthetic_data;

pub use synthetic_data::{
    checkerboard,
    gradient,
    numbered,
    pseudo_noise,
    solid,
    synthetic_bitmap,
};
