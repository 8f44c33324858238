//! Crop-search drivers.
//!
//! A driver wires a candidate generator to one or more scorers and picks a
//! single winner:
//!
//! - [`SuhDriver`]: maximise saliency share (grid walk, aspect ladder,
//!   greedy region grow or random grid).
//! - [`StentifordDriver`]: maximise mean saliency per pixel.
//! - [`FangDriver`]: content threshold as a filter, then rank fusion of
//!   boundary simplicity and composition cost.
//!
//! Candidate scoring runs on the rayon pool when the `parallel` feature is
//! enabled. Reductions order candidates by `(score, y, x, w, h)` so the winner
//! does not depend on scheduling.

pub mod fang;
pub mod fusion;
pub mod stentiford;
pub mod suh;

pub use fang::{FangDriver, FangParams};
pub use fusion::{competition_ranks, rank_fusion};
pub use stentiford::{Sampling, StentifordDriver, StentifordFreeStrategy, StentifordParams};
pub use suh::{SuhDriver, SuhFreeStrategy, SuhParams};

use crate::config::CropOptions;
use crate::constraint::SizeConstraint;
use crate::diagnostics::{CropReport, ReportBuilder};
use crate::error::{CropError, Result};
use crate::image::ImageU8;
use crate::scoring::Scorer;
use crate::types::{Candidate, DriverTag, Rect};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Maps handed to a driver, validated against the source image size.
#[derive(Clone, Copy, Debug)]
pub struct SearchInput<'a> {
    width: usize,
    height: usize,
    saliency: ImageU8<'a>,
    gradient: Option<ImageU8<'a>>,
}

impl<'a> SearchInput<'a> {
    /// `width × height` is the size of the source photograph.
    pub fn new(width: usize, height: usize, saliency: ImageU8<'a>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CropError::Image(format!("empty source image {width}x{height}")));
        }
        check_map("saliency", &saliency, width, height)?;
        Ok(Self {
            width,
            height,
            saliency,
            gradient: None,
        })
    }

    pub fn with_gradient(mut self, gradient: ImageU8<'a>) -> Result<Self> {
        check_map("gradient", &gradient, self.width, self.height)?;
        self.gradient = Some(gradient);
        Ok(self)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn saliency(&self) -> &ImageU8<'a> {
        &self.saliency
    }

    #[inline]
    pub fn gradient(&self) -> Option<&ImageU8<'a>> {
        self.gradient.as_ref()
    }
}

fn check_map(name: &str, map: &ImageU8<'_>, width: usize, height: usize) -> Result<()> {
    if map.w != width || map.h != height {
        return Err(CropError::Image(format!(
            "{name} map is {}x{}, source image is {width}x{height}",
            map.w, map.h
        )));
    }
    if map.stride < map.w || map.data.len() < (map.h - 1) * map.stride + map.w {
        return Err(CropError::Image(format!(
            "{name} map buffer too short for {}x{} with stride {}",
            map.w, map.h, map.stride
        )));
    }
    Ok(())
}

/// A complete crop-search pipeline.
pub trait CropDriver {
    fn tag(&self) -> DriverTag;

    /// Search `input` under `options` and report the winner.
    ///
    /// Configuration and image errors are returned; infeasible constraints,
    /// blank saliency and a missing classifier degrade to warnings inside the
    /// report.
    fn crop(&self, input: &SearchInput<'_>, options: &CropOptions) -> Result<CropReport>;
}

/// Validate options and resolve the mode for a driver.
///
/// Recoverable failures are recorded on `report` and yield `None`; the
/// caller then returns the full-image fallback.
pub(crate) fn resolve_constraint(
    report: &mut ReportBuilder,
    input: &SearchInput<'_>,
    options: &CropOptions,
    min_scale: f64,
) -> Result<Option<SizeConstraint>> {
    options.validate()?;
    match SizeConstraint::resolve(&options.mode, input.width, input.height, min_scale) {
        Ok(c) => {
            log::debug!(
                "{} constraint: sizes {:?} to {:?}",
                options.mode.name(),
                c.min_size(),
                c.max_size()
            );
            Ok(Some(c))
        }
        Err(err) if err.is_recoverable() => {
            report.warn(err);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Score every rectangle, preserving input order.
pub(crate) fn score_all<S: Scorer + ?Sized>(rects: &[Rect], scorer: &S) -> Vec<f64> {
    #[cfg(feature = "parallel")]
    {
        rects.par_iter().map(|r| scorer.score(r)).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        rects.iter().map(|r| scorer.score(r)).collect()
    }
}

/// Highest-scoring rectangle, ties broken by position.
pub(crate) fn best_of<S: Scorer + ?Sized>(rects: &[Rect], scorer: &S) -> Option<Candidate> {
    #[cfg(feature = "parallel")]
    {
        rects
            .par_iter()
            .map(|r| Candidate::new(*r, scorer.score(r)))
            .min_by(|a, b| a.cmp_desc(b))
    }
    #[cfg(not(feature = "parallel"))]
    {
        rects
            .iter()
            .map(|r| Candidate::new(*r, scorer.score(r)))
            .min_by(|a, b| a.cmp_desc(b))
    }
}

/// Lowest-scoring candidate among precomputed scores, ties broken by position.
pub(crate) fn min_of(rects: &[Rect], scores: &[f64]) -> Option<Candidate> {
    debug_assert_eq!(rects.len(), scores.len());
    rects
        .iter()
        .zip(scores)
        .map(|(r, &s)| Candidate::new(*r, s))
        .min_by(|a, b| a.cmp_asc(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_rejects_mismatched_maps() {
        let sal = vec![0u8; 20 * 10];
        let grad = vec![0u8; 10 * 10];
        assert!(matches!(
            SearchInput::new(20, 11, ImageU8::new(20, 10, &sal)),
            Err(CropError::Image(_))
        ));
        let input = SearchInput::new(20, 10, ImageU8::new(20, 10, &sal)).unwrap();
        assert!(matches!(
            input.with_gradient(ImageU8::new(10, 10, &grad)),
            Err(CropError::Image(_))
        ));
    }

    #[test]
    fn best_of_is_order_independent() {
        let rects = vec![
            Rect::new(5, 5, 2, 2),
            Rect::new(0, 5, 2, 2),
            Rect::new(3, 0, 2, 2),
            Rect::new(1, 1, 2, 2),
        ];
        let score = |r: &Rect| if r.x == 1 { 0.5 } else { 1.0 };
        let forward = best_of(&rects, &score).unwrap();
        let mut reversed = rects.clone();
        reversed.reverse();
        let backward = best_of(&reversed, &score).unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward.rect, Rect::new(3, 0, 2, 2));
        let min = min_of(&rects, &[1.0, 1.0, 2.0, 1.0]).unwrap();
        assert_eq!(min.rect, Rect::new(1, 1, 2, 2));
    }
}
