use crate::constraint::CropMode;
use crate::error::{CropError, Result};
use serde::{Deserialize, Serialize};

/// Per-invocation options shared by all drivers.
///
/// Unset fields fall back to the driver's own defaults (see `SuhParams`,
/// `StentifordParams`, `FangParams`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropOptions {
    pub mode: CropMode,
    /// Saliency-share threshold (Suh aspect/free, Fang free).
    pub threshold: Option<f64>,
    /// Horizontal lattice step; `max(1, W/100)` when unset.
    pub h_step: Option<usize>,
    /// Vertical lattice step; `max(1, H/100)` when unset.
    pub v_step: Option<usize>,
    /// Draw count for random samplers.
    pub iterations: Option<usize>,
    /// Fixed seed for random samplers; the clock is used when unset.
    pub seed: Option<u64>,
    /// Candidates the Fang adaptive threshold must keep.
    pub min_candidates: Option<usize>,
}

impl CropOptions {
    pub fn new(mode: CropMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_steps(mut self, h_step: usize, v_step: usize) -> Self {
        self.h_step = Some(h_step);
        self.v_step = Some(v_step);
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = Some(iterations);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_min_candidates(mut self, k: usize) -> Self {
        self.min_candidates = Some(k);
        self
    }

    /// Reject out-of-range numeric options. Mode-specific checks against the
    /// image size happen when the mode is resolved.
    pub fn validate(&self) -> Result<()> {
        if let Some(t) = self.threshold {
            if !(0.0..=1.0).contains(&t) {
                return Err(CropError::config(format!("threshold {t} outside [0, 1]")));
            }
        }
        if self.h_step == Some(0) || self.v_step == Some(0) {
            return Err(CropError::config("grid steps must be positive"));
        }
        if self.iterations == Some(0) {
            return Err(CropError::config("iterations must be positive"));
        }
        if self.min_candidates == Some(0) {
            return Err(CropError::config("min_candidates must be positive"));
        }
        match self.mode {
            CropMode::Scale { scale } if !(scale > 0.0 && scale <= 1.0) => {
                Err(CropError::config(format!("scale {scale} outside (0, 1]")))
            }
            CropMode::FixedWh { width, height } | CropMode::Aspect { width, height }
                if width == 0 || height == 0 =>
            {
                Err(CropError::config(format!(
                    "{} requires positive width and height",
                    self.mode.name()
                )))
            }
            _ => Ok(()),
        }
    }
}
