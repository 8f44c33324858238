//! Edge-gradient producer for the boundary-simplicity cue.
//!
//! The search engine only consumes a single-channel `[0, 255]` gradient map;
//! this module builds one from a grayscale photograph (Gaussian pre-blur,
//! 3×3 Sobel, min–max stretch) for callers that do not bring their own.

pub mod filters;
pub mod grad;

pub use filters::{GaussianFilter, SeparableFilter};
pub use grad::{gradient_map, sobel_magnitude, BlurPolicy};
