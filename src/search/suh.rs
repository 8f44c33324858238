//! Saliency-share driver.
//!
//! - Fixed size / scale: grid walk, maximise the saliency share.
//! - Aspect: walk a ladder of sizes from the minimum upwards; the first size
//!   whose best rectangle holds more than `τ` of the energy wins, with that
//!   size's best rectangle.
//! - Free: greedy region grow until the share reaches `τ`, or a random grid
//!   that keeps the smallest rectangle reaching `τ`.
use super::{best_of, resolve_constraint, CropDriver, SearchInput};
use crate::candidates::{resolve_seed, AnchoredSampler, CandidateSource, GridWalk, RegionGrow};
use crate::config::CropOptions;
use crate::constraint::SizeConstraint;
use crate::diagnostics::{CropReport, ReportBuilder};
use crate::error::{CropError, Result};
use crate::scoring::SaliencyScorer;
use crate::types::{DriverTag, Rect};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuhFreeStrategy {
    /// Greedy region grow from a central square.
    #[default]
    Greedy,
    /// Random sizes at every lattice anchor; smallest rectangle reaching `τ`.
    RandomGrid,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuhParams {
    /// Minimum crop extent as a fraction of the image (aspect/free).
    pub min_scale: f64,
    /// Default saliency-share threshold `τ`.
    pub threshold: f64,
    /// Aspect ladder growth per rung, as a fraction of the dominant extent.
    pub aspect_step: f64,
    pub free_strategy: SuhFreeStrategy,
    /// Sizes drawn per anchor by the random grid.
    pub samples_per_anchor: usize,
}

impl Default for SuhParams {
    fn default() -> Self {
        Self {
            min_scale: 0.4,
            threshold: 0.6,
            aspect_step: 0.1,
            free_strategy: SuhFreeStrategy::Greedy,
            samples_per_anchor: 3,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SuhDriver {
    params: SuhParams,
}

impl SuhDriver {
    pub fn new(params: SuhParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SuhParams {
        &self.params
    }

    fn fixed(
        &self,
        report: &mut ReportBuilder,
        pass: &Pass<'_>,
        cw: usize,
        ch: usize,
    ) -> Option<(Rect, f64)> {
        let rects = pass.grid.walk(cw, ch, pass.width, pass.height);
        report.candidates_evaluated += rects.len();
        best_of(&rects, pass.saliency).map(|c| (c.rect, c.score))
    }

    fn aspect(
        &self,
        report: &mut ReportBuilder,
        pass: &Pass<'_>,
        constraint: &SizeConstraint,
        threshold: f64,
    ) -> Option<(Rect, f64)> {
        for (cw, ch) in constraint.size_ladder(self.params.aspect_step, pass.width, pass.height) {
            let rects = pass.grid.walk(cw, ch, pass.width, pass.height);
            report.candidates_evaluated += rects.len();
            let Some(best) = best_of(&rects, pass.saliency) else {
                continue;
            };
            log::debug!("Suh aspect: size {cw}x{ch} best {} share={:.3}", best.rect, best.score);
            if best.score > threshold {
                return Some((best.rect, best.score));
            }
        }
        None
    }

    fn random_grid(
        &self,
        report: &mut ReportBuilder,
        pass: &Pass<'_>,
        constraint: &SizeConstraint,
        threshold: f64,
        seed: u64,
    ) -> Option<(Rect, f64)> {
        let mut sampler = AnchoredSampler::seeded(
            seed,
            pass.grid.h_step,
            pass.grid.v_step,
            self.params.samples_per_anchor,
        );
        let rects = sampler.generate(constraint, pass.width, pass.height);
        report.candidates_evaluated += rects.len();
        rects
            .iter()
            .map(|r| (*r, pass.saliency.ratio(r)))
            .filter(|&(_, share)| share >= threshold)
            .min_by(|a, b| {
                a.0.area()
                    .cmp(&b.0.area())
                    .then_with(|| b.1.total_cmp(&a.1))
                    .then_with(|| a.0.tie_break(&b.0))
            })
    }
}

/// Read-only state shared by the search strategies of one run.
struct Pass<'a> {
    saliency: &'a SaliencyScorer,
    grid: GridWalk,
    width: usize,
    height: usize,
}

impl CropDriver for SuhDriver {
    fn tag(&self) -> DriverTag {
        DriverTag::Suh
    }

    fn crop(&self, input: &SearchInput<'_>, options: &CropOptions) -> Result<CropReport> {
        let (width, height) = (input.width(), input.height());
        let mut report = ReportBuilder::start(DriverTag::Suh, options.mode);
        let Some(constraint) =
            resolve_constraint(&mut report, input, options, self.params.min_scale)?
        else {
            return Ok(report.fallback(width, height, 1.0));
        };

        let t = Instant::now();
        let saliency = SaliencyScorer::new(input.saliency());
        report.timing.lap("integral", t);
        if saliency.is_blank() {
            log::warn!("Suh: saliency map is blank, returning the full image");
            return Ok(report.fallback(width, height, 0.0));
        }

        let pass = Pass {
            saliency: &saliency,
            grid: GridWalk::with_steps(width, height, options.h_step, options.v_step),
            width,
            height,
        };
        let threshold = options.threshold.unwrap_or(self.params.threshold);
        let t = Instant::now();
        let winner = match constraint {
            SizeConstraint::Exact { w, h } => self.fixed(&mut report, &pass, w, h),
            SizeConstraint::Aspect { .. } => {
                report.threshold = Some(threshold);
                self.aspect(&mut report, &pass, &constraint, threshold)
            }
            SizeConstraint::Free { .. } => {
                report.threshold = Some(threshold);
                match self.params.free_strategy {
                    SuhFreeStrategy::Greedy => {
                        let grown = RegionGrow::new(threshold).grow(input.saliency(), &saliency);
                        report.candidates_evaluated += grown.iterations + 1;
                        report.iterations = Some(grown.iterations);
                        Some((grown.rect, grown.ratio))
                    }
                    SuhFreeStrategy::RandomGrid => {
                        let seed = resolve_seed(options.seed);
                        report.seed = Some(seed);
                        self.random_grid(&mut report, &pass, &constraint, threshold, seed)
                    }
                }
            }
        };
        report.timing.lap("search", t);

        match winner {
            Some((rect, share)) => Ok(report.finish(rect, share)),
            None => {
                report.warn(CropError::InfeasibleConstraint(format!(
                    "no {} crop holds more than {threshold:.2} of the saliency",
                    options.mode.name()
                )));
                Ok(report.fallback(width, height, 1.0))
            }
        }
    }
}
