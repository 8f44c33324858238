//! Rank-fusion driver.
//!
//! Content preservation is a feasibility filter: candidates must keep at
//! least `τ` of the saliency energy, with `τ` lowered from 0.8 in steps of 0.1
//! until enough candidates survive. Survivors are ranked by boundary mean and
//! by composition cost (both ascending) and the minimum of
//! `1·rank_B + 5·rank_C` wins. Free crops use a random grid with a fixed `τ`.
use super::fusion::rank_fusion;
use super::{min_of, resolve_constraint, score_all, CropDriver, SearchInput};
use crate::candidates::{resolve_seed, AnchoredSampler, CandidateSource, GridWalk};
use crate::config::CropOptions;
use crate::constraint::SizeConstraint;
use crate::diagnostics::{CropReport, ReportBuilder};
use crate::error::{CropError, Result};
use crate::scoring::{
    BoundaryScorer, CompositionClassifier, CompositionScorer, PyramidDepth, SaliencyScorer,
};
use crate::types::{DriverTag, Rect};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FangParams {
    pub min_scale: f64,
    /// First content threshold tried by the adaptive filter.
    pub initial_threshold: f64,
    /// Amount the threshold drops per retry.
    pub threshold_step: f64,
    /// Survivors required before the threshold stops dropping (`K`).
    pub min_candidates: usize,
    pub boundary_weight: f64,
    pub composition_weight: f64,
    /// Aspect ladder growth per rung, as a fraction of the dominant extent.
    pub aspect_step: f64,
    /// Fixed content threshold of the free-mode random grid.
    pub free_threshold: f64,
    pub samples_per_anchor: usize,
    /// Pyramid used when the classifier does not fix its feature length.
    pub pyramid: PyramidDepth,
}

impl Default for FangParams {
    fn default() -> Self {
        Self {
            min_scale: 0.3,
            initial_threshold: 0.8,
            threshold_step: 0.1,
            min_candidates: 1000,
            boundary_weight: 1.0,
            composition_weight: 5.0,
            aspect_step: 0.05,
            free_threshold: 0.7,
            samples_per_anchor: 10,
            pyramid: PyramidDepth::Grid4,
        }
    }
}

#[derive(Default)]
pub struct FangDriver {
    params: FangParams,
    classifier: Option<Box<dyn CompositionClassifier>>,
}

impl FangDriver {
    pub fn new(params: FangParams) -> Self {
        Self {
            params,
            classifier: None,
        }
    }

    pub fn with_classifier(mut self, classifier: Box<dyn CompositionClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn params(&self) -> &FangParams {
        &self.params
    }

    /// Lower `τ` until `min(K, n)` candidates keep at least `τ` of the energy.
    fn adaptive_filter(
        &self,
        report: &mut ReportBuilder,
        rects: &[Rect],
        saliency: &SaliencyScorer,
        min_candidates: usize,
    ) -> Vec<Rect> {
        let shares = score_all(rects, saliency);
        let wanted = min_candidates.min(rects.len());
        let mut round = 0usize;
        loop {
            let tau = self.params.initial_threshold - round as f64 * self.params.threshold_step;
            let kept = shares.iter().filter(|&&s| s >= tau).count();
            if kept >= wanted || tau <= 0.0 {
                log::debug!("Fang: threshold {tau:.2} keeps {kept}/{} candidates", rects.len());
                report.threshold = Some(tau);
                return rects
                    .iter()
                    .zip(&shares)
                    .filter(|&(_, &s)| s >= tau)
                    .map(|(r, _)| *r)
                    .collect();
            }
            round += 1;
        }
    }

    fn composition_costs(
        &self,
        report: &mut ReportBuilder,
        saliency: &SaliencyScorer,
        rects: &[Rect],
    ) -> Option<Vec<f64>> {
        let Some(classifier) = self.classifier.as_deref() else {
            report.warn(CropError::Classifier(
                "no composition classifier, ranking by boundary only".into(),
            ));
            return None;
        };
        let depth = classifier
            .feature_len()
            .and_then(PyramidDepth::for_feature_len)
            .unwrap_or(self.params.pyramid);
        log::debug!("Fang: composition pyramid {depth:?}");
        match CompositionScorer::new(saliency, classifier, depth) {
            Ok(scorer) => Some(score_all(rects, &scorer)),
            Err(err) => {
                report.warn(err);
                None
            }
        }
    }

    fn check_params(&self) -> Result<()> {
        let p = &self.params;
        if !(p.threshold_step > 0.0) {
            return Err(CropError::config("fang threshold_step must be positive"));
        }
        if !(0.0..=1.0).contains(&p.free_threshold) || !(0.0..=1.0).contains(&p.initial_threshold)
        {
            return Err(CropError::config("fang thresholds must lie in [0, 1]"));
        }
        Ok(())
    }
}

impl CropDriver for FangDriver {
    fn tag(&self) -> DriverTag {
        DriverTag::Fang
    }

    fn crop(&self, input: &SearchInput<'_>, options: &CropOptions) -> Result<CropReport> {
        let (width, height) = (input.width(), input.height());
        self.check_params()?;
        let gradient = input
            .gradient()
            .ok_or_else(|| CropError::Image("Fang driver needs a gradient map".into()))?;
        let mut report = ReportBuilder::start(DriverTag::Fang, options.mode);
        let Some(constraint) =
            resolve_constraint(&mut report, input, options, self.params.min_scale)?
        else {
            return Ok(report.fallback(width, height, 0.0));
        };

        let t = Instant::now();
        let saliency = SaliencyScorer::new(input.saliency());
        let boundary = BoundaryScorer::new(gradient);
        report.timing.lap("integral", t);
        if saliency.is_blank() {
            log::warn!("Fang: saliency map is blank, returning the full image");
            return Ok(report.fallback(width, height, 0.0));
        }

        let t = Instant::now();
        let survivors = match constraint {
            SizeConstraint::Free { .. } => {
                let seed = resolve_seed(options.seed);
                report.seed = Some(seed);
                let grid = GridWalk::with_steps(width, height, options.h_step, options.v_step);
                let rects = AnchoredSampler::seeded(
                    seed,
                    grid.h_step,
                    grid.v_step,
                    self.params.samples_per_anchor,
                )
                .generate(&constraint, width, height);
                report.candidates_evaluated = rects.len();
                let tau = options.threshold.unwrap_or(self.params.free_threshold);
                report.threshold = Some(tau);
                let shares = score_all(&rects, &saliency);
                rects
                    .iter()
                    .zip(&shares)
                    .filter(|&(_, &s)| s >= tau)
                    .map(|(r, _)| *r)
                    .collect::<Vec<_>>()
            }
            _ => {
                let rects = GridWalk::with_steps(width, height, options.h_step, options.v_step)
                    .with_size_step(self.params.aspect_step)
                    .generate(&constraint, width, height);
                report.candidates_evaluated = rects.len();
                let k = options.min_candidates.unwrap_or(self.params.min_candidates);
                self.adaptive_filter(&mut report, &rects, &saliency, k)
            }
        };
        report.timing.lap("candidates", t);

        if survivors.is_empty() {
            report.warn(CropError::InfeasibleConstraint(format!(
                "no {} candidate keeps {:.2} of the saliency",
                options.mode.name(),
                report.threshold.unwrap_or_default()
            )));
            return Ok(report.fallback(width, height, 0.0));
        }

        let t = Instant::now();
        let boundary_means = score_all(&survivors, &boundary);
        let composition = self.composition_costs(&mut report, &saliency, &survivors);
        report.timing.lap("scoring", t);

        let t = Instant::now();
        let fused = rank_fusion(
            &boundary_means,
            composition.as_deref(),
            self.params.boundary_weight,
            self.params.composition_weight,
        );
        let winner = min_of(&survivors, &fused);
        report.timing.lap("ranking", t);

        match winner {
            Some(best) => Ok(report.finish(best.rect, best.score)),
            None => Ok(report.fallback(width, height, 0.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::CropMode;
    use crate::image::ImageU8;

    #[test]
    fn adaptive_threshold_stops_once_enough_survive() {
        let mut data = vec![0u8; 60 * 60];
        for y in 20..40 {
            for x in 20..40 {
                data[y * 60 + x] = 255;
            }
        }
        let grad = vec![0u8; 60 * 60];
        let input = SearchInput::new(60, 60, ImageU8::new(60, 60, &data))
            .unwrap()
            .with_gradient(ImageU8::new(60, 60, &grad))
            .unwrap();
        let opts = CropOptions::new(CropMode::FixedWh { width: 30, height: 30 })
            .with_min_candidates(10);
        let report = FangDriver::default().crop(&input, &opts).unwrap();
        assert_eq!(report.threshold, Some(0.8));
        // Flat gradient and no classifier: the topmost survivor wins, which
        // keeps every block column and 16 of its 20 rows.
        assert_eq!(report.rect(), Rect::new(10, 6, 30, 30));
        assert!(matches!(report.warnings[0], CropError::Classifier(_)));
    }

    #[test]
    fn missing_gradient_is_an_image_error() {
        let data = vec![1u8; 16];
        let input = SearchInput::new(4, 4, ImageU8::new(4, 4, &data)).unwrap();
        let err = FangDriver::default()
            .crop(&input, &CropOptions::new(CropMode::Scale { scale: 0.5 }))
            .unwrap_err();
        assert!(matches!(err, CropError::Image(_)));
    }

    #[test]
    fn mismatched_classifier_degrades_to_boundary_ranking() {
        let data = vec![100u8; 40 * 40];
        let grad = vec![0u8; 40 * 40];
        let input = SearchInput::new(40, 40, ImageU8::new(40, 40, &data))
            .unwrap()
            .with_gradient(ImageU8::new(40, 40, &grad))
            .unwrap();
        let model = crate::scoring::LinearClassifier {
            weights: vec![1.0; 30],
            bias: 0.0,
        };
        let driver = FangDriver::default().with_classifier(Box::new(model));
        let report = driver
            .crop(&input, &CropOptions::new(CropMode::FixedWh { width: 20, height: 20 }))
            .unwrap();
        assert!(matches!(report.warnings[0], CropError::Classifier(_)));
        assert_eq!(report.rect(), Rect::new(0, 0, 20, 20));
    }

    #[test]
    fn classifier_length_selects_the_pyramid() {
        let data = vec![100u8; 40 * 40];
        let grad = vec![0u8; 40 * 40];
        let input = SearchInput::new(40, 40, ImageU8::new(40, 40, &data))
            .unwrap()
            .with_gradient(ImageU8::new(40, 40, &grad))
            .unwrap();
        let opts = CropOptions::new(CropMode::FixedWh { width: 20, height: 20 });
        for (len, configured) in [
            (21, PyramidDepth::Grid4),
            (21, PyramidDepth::Grid8),
            (85, PyramidDepth::Grid4),
        ] {
            let model = crate::scoring::LinearClassifier {
                weights: vec![0.5; len],
                bias: 0.0,
            };
            let params = FangParams {
                pyramid: configured,
                ..FangParams::default()
            };
            let report = FangDriver::new(params)
                .with_classifier(Box::new(model))
                .crop(&input, &opts)
                .unwrap();
            assert!(
                report.warnings.is_empty(),
                "{len} weights with {configured:?}: {:?}",
                report.warnings
            );
        }
    }
}
