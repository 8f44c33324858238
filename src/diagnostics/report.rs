use super::timing::{elapsed_ms, TimingBreakdown};
use crate::constraint::CropMode;
use crate::error::CropError;
use crate::types::{CropResult, DriverTag, Rect};
use serde::Serialize;
use std::time::Instant;

/// Outcome of one driver run: the winning crop plus what it took to find it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CropReport {
    pub result: CropResult,
    pub mode: CropMode,
    /// Rectangles scored by the driver.
    pub candidates_evaluated: usize,
    /// Content threshold in force when the winner was chosen.
    pub threshold: Option<f64>,
    /// Seed used by random candidate generators.
    pub seed: Option<u64>,
    /// Greedy grow rounds, when the region grow ran.
    pub iterations: Option<usize>,
    /// True when the full image was returned instead of a searched crop.
    pub fallback: bool,
    /// Non-fatal conditions the caller should know about.
    pub warnings: Vec<CropError>,
    pub timing: TimingBreakdown,
}

impl CropReport {
    pub fn rect(&self) -> Rect {
        self.result.rect()
    }
}

/// Accumulates report fields while a driver runs.
#[derive(Debug)]
pub(crate) struct ReportBuilder {
    driver: DriverTag,
    mode: CropMode,
    started: Instant,
    pub candidates_evaluated: usize,
    pub threshold: Option<f64>,
    pub seed: Option<u64>,
    pub iterations: Option<usize>,
    pub warnings: Vec<CropError>,
    pub timing: TimingBreakdown,
}

impl ReportBuilder {
    pub fn start(driver: DriverTag, mode: CropMode) -> Self {
        Self {
            driver,
            mode,
            started: Instant::now(),
            candidates_evaluated: 0,
            threshold: None,
            seed: None,
            iterations: None,
            warnings: Vec::new(),
            timing: TimingBreakdown::default(),
        }
    }

    pub fn warn(&mut self, err: CropError) {
        log::warn!("{}: {err}", self.driver);
        self.warnings.push(err);
    }

    pub fn finish(self, rect: Rect, score: f64) -> CropReport {
        self.build(rect, score, false)
    }

    /// Full-image crop returned when the search cannot run.
    pub fn fallback(self, width: usize, height: usize, score: f64) -> CropReport {
        self.build(Rect::full(width, height), score, true)
    }

    fn build(mut self, rect: Rect, score: f64, fallback: bool) -> CropReport {
        self.timing.total_ms = elapsed_ms(self.started);
        let result = CropResult::new(rect, score, self.driver);
        log::debug!(
            "{} winner {rect} score={score:.4} candidates={} fallback={fallback} total_ms={:.3}",
            self.driver,
            self.candidates_evaluated,
            self.timing.total_ms
        );
        CropReport {
            result,
            mode: self.mode,
            candidates_evaluated: self.candidates_evaluated,
            threshold: self.threshold,
            seed: self.seed,
            iterations: self.iterations,
            fallback,
            warnings: self.warnings,
            timing: self.timing,
        }
    }
}
