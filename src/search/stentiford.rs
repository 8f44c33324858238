//! Mean-saliency driver: every mode produces candidates and the rectangle with
//! the highest saliency per pixel wins. No secondary cue is involved.
use super::{best_of, resolve_constraint, CropDriver, SearchInput};
use crate::candidates::{resolve_seed, CandidateSource, GridWalk, RandomSampler};
use crate::config::CropOptions;
use crate::constraint::{CropMode, SizeConstraint};
use crate::diagnostics::{CropReport, ReportBuilder};
use crate::error::{CropError, Result};
use crate::scoring::{MeanSaliency, SaliencyScorer};
use crate::types::{DriverTag, Rect};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// How aspect-constrained candidates are produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sampling {
    /// Lattice walk over the aspect size ladder.
    #[default]
    Grid,
    /// Uniform random draws keeping the ratio.
    Random,
}

/// Candidate strategy for unconstrained crops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StentifordFreeStrategy {
    /// Uniform random rectangles above the minimum scale.
    #[default]
    Random,
    /// Scale grid walks for zoom factors `from, from + step, …, to`.
    ZoomInterval { from: f64, to: f64, step: f64 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StentifordParams {
    pub min_scale: f64,
    /// Draws per random walk when the options do not set `iterations`.
    pub iterations: usize,
    pub aspect_sampling: Sampling,
    pub aspect_step: f64,
    pub free_strategy: StentifordFreeStrategy,
}

impl Default for StentifordParams {
    fn default() -> Self {
        Self {
            min_scale: 0.3,
            iterations: 2000,
            aspect_sampling: Sampling::Grid,
            aspect_step: 0.1,
            free_strategy: StentifordFreeStrategy::Random,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct StentifordDriver {
    params: StentifordParams,
}

impl StentifordDriver {
    pub fn new(params: StentifordParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &StentifordParams {
        &self.params
    }

    fn random_walk(
        &self,
        report: &mut ReportBuilder,
        constraint: &SizeConstraint,
        options: &CropOptions,
        (width, height): (usize, usize),
    ) -> Vec<Rect> {
        let seed = resolve_seed(options.seed);
        let iterations = options.iterations.unwrap_or(self.params.iterations);
        report.seed = Some(seed);
        report.iterations = Some(iterations);
        RandomSampler::seeded(seed, iterations).generate(constraint, width, height)
    }
}

/// Zoom factors of an interval walk, inclusive of `to` up to rounding.
pub(crate) fn zoom_factors(from: f64, to: f64, step: f64) -> Result<Vec<f64>> {
    let valid = |z: f64| z > 0.0 && z <= 1.0;
    if !valid(from) || !valid(to) || from > to || step <= 0.0 {
        return Err(CropError::config(format!(
            "zoom interval {from}..={to} step {step} must lie in (0, 1] with a positive step"
        )));
    }
    let mut out = Vec::new();
    let mut i = 0usize;
    loop {
        let z = from + i as f64 * step;
        if z > to + 1e-9 {
            break;
        }
        out.push(z.min(to));
        i += 1;
    }
    Ok(out)
}

impl CropDriver for StentifordDriver {
    fn tag(&self) -> DriverTag {
        DriverTag::Stentiford
    }

    fn crop(&self, input: &SearchInput<'_>, options: &CropOptions) -> Result<CropReport> {
        let (width, height) = (input.width(), input.height());
        let mut report = ReportBuilder::start(DriverTag::Stentiford, options.mode);
        let Some(constraint) =
            resolve_constraint(&mut report, input, options, self.params.min_scale)?
        else {
            return Ok(report.fallback(width, height, 0.0));
        };

        let t = Instant::now();
        let saliency = SaliencyScorer::new(input.saliency());
        report.timing.lap("integral", t);
        if saliency.is_blank() {
            log::warn!("Stentiford: saliency map is blank, returning the full image");
            return Ok(report.fallback(width, height, 0.0));
        }

        let mut grid = GridWalk::with_steps(width, height, options.h_step, options.v_step)
            .with_size_step(self.params.aspect_step);
        let t = Instant::now();
        let rects = match constraint {
            SizeConstraint::Exact { .. } => grid.generate(&constraint, width, height),
            SizeConstraint::Aspect { .. } => match self.params.aspect_sampling {
                Sampling::Grid => grid.generate(&constraint, width, height),
                Sampling::Random => {
                    self.random_walk(&mut report, &constraint, options, (width, height))
                }
            },
            SizeConstraint::Free { .. } => match self.params.free_strategy {
                StentifordFreeStrategy::Random => {
                    self.random_walk(&mut report, &constraint, options, (width, height))
                }
                StentifordFreeStrategy::ZoomInterval { from, to, step } => {
                    let mut rects = Vec::new();
                    for zoom in zoom_factors(from, to, step)? {
                        let scaled = SizeConstraint::resolve(
                            &CropMode::Scale { scale: zoom },
                            width,
                            height,
                            self.params.min_scale,
                        )?;
                        rects.extend(grid.generate(&scaled, width, height));
                    }
                    rects
                }
            },
        };
        report.timing.lap("candidates", t);
        report.candidates_evaluated = rects.len();
        log::debug!("Stentiford: {} candidates for {}", rects.len(), options.mode.name());

        let t = Instant::now();
        let winner = best_of(&rects, &MeanSaliency(&saliency));
        report.timing.lap("scoring", t);
        match winner {
            Some(best) => Ok(report.finish(best.rect, best.score)),
            None => {
                report.warn(CropError::InfeasibleConstraint(format!(
                    "no {} candidate fits a {width}x{height} image",
                    options.mode.name()
                )));
                let full = saliency.mean(&Rect::full(width, height));
                Ok(report.fallback(width, height, full))
            }
        }
    }
}
