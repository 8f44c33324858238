//! Rectangle scorers.
//!
//! Every scorer is a pure function of a rectangle over read-only integral
//! images, so one instance can be shared by all worker threads.

pub mod boundary;
pub mod composition;
pub mod saliency;

pub use boundary::BoundaryScorer;
pub use composition::{
    spatial_pyramid, CompositionClassifier, CompositionScorer, LinearClassifier, PyramidDepth,
    DEGENERATE_COST,
};
pub use saliency::{MeanSaliency, SaliencyScorer};

use crate::types::Rect;

/// Capability shared by all scorers: one real value per rectangle.
pub trait Scorer: Sync {
    fn score(&self, rect: &Rect) -> f64;
}

impl<F> Scorer for F
where
    F: Fn(&Rect) -> f64 + Sync,
{
    fn score(&self, rect: &Rect) -> f64 {
        self(rect)
    }
}
