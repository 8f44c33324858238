//! Shape and size constraints mapping an image size to the feasible crop sizes.
//!
//! A [`CropMode`] is what the caller asks for; [`SizeConstraint`] is the
//! resolved, image-specific form consumed by candidate generators. Resolution
//! applies the per-driver minimum scale `f` (the fraction of the image a crop
//! must at least span in aspect and free modes).
use crate::error::{CropError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Guards `floor`/`ceil` of products like `0.3 · 110` against binary noise.
const SCALE_EPS: f64 = 1e-9;

/// Requested crop shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CropMode {
    /// Exactly `width × height` pixels.
    FixedWh { width: usize, height: usize },
    /// `(⌊s·W⌋, ⌊s·H⌋)`.
    Scale { scale: f64 },
    /// Any size with the ratio `width : height`.
    Aspect { width: usize, height: usize },
    /// Any size no smaller than the minimum scale on both axes.
    #[default]
    Free,
}

impl CropMode {
    pub fn name(&self) -> &'static str {
        match self {
            CropMode::FixedWh { .. } => "fixed_wh",
            CropMode::Scale { .. } => "scale",
            CropMode::Aspect { .. } => "aspect",
            CropMode::Free => "free",
        }
    }
}

/// Integer aspect ratio `width : height`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AspectRatio {
    pub width: usize,
    pub height: usize,
}

impl AspectRatio {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CropError::config(format!(
                "aspect ratio {width}:{height} must have positive terms"
            )));
        }
        Ok(Self { width, height })
    }

    /// Width drives the ladder when the ratio is strictly landscape.
    #[inline]
    pub fn width_dominant(&self) -> bool {
        self.width > self.height
    }

    /// `(w, h)` for a given length of the dominant side.
    pub fn size_for(&self, dominant: usize) -> (usize, usize) {
        if self.width_dominant() {
            (dominant, dominant * self.height / self.width)
        } else {
            (dominant * self.width / self.height, dominant)
        }
    }

    /// Largest dominant side whose derived size still fits `width × height`.
    fn max_dominant(&self, width: usize, height: usize) -> usize {
        let (a, b) = (self.width, self.height);
        if self.width_dominant() {
            width.min(((height + 1) * a - 1) / b)
        } else {
            height.min(((width + 1) * b - 1) / a)
        }
    }

    /// Smallest dominant side whose derived side is at least one pixel.
    fn min_nonempty_dominant(&self) -> usize {
        let (a, b) = (self.width, self.height);
        if self.width_dominant() {
            a.div_ceil(b)
        } else {
            b.div_ceil(a)
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

/// Feasible `(w, h)` set for one image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SizeConstraint {
    /// Single admissible size.
    Exact { w: usize, h: usize },
    /// Sizes `ratio.size_for(d)` for `d` in `min_dominant..=max_dominant`.
    Aspect {
        ratio: AspectRatio,
        min_dominant: usize,
        max_dominant: usize,
    },
    /// Every `(w, h)` with `min_w <= w <= max_w` and `min_h <= h <= max_h`.
    Free {
        min_w: usize,
        min_h: usize,
        max_w: usize,
        max_h: usize,
    },
}

impl SizeConstraint {
    /// Resolve `mode` against a `width × height` image using the driver's
    /// minimum scale.
    pub fn resolve(mode: &CropMode, width: usize, height: usize, min_scale: f64) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CropError::Image(format!("empty image {width}x{height}")));
        }
        if !(min_scale > 0.0 && min_scale <= 1.0) {
            return Err(CropError::config(format!(
                "minimum scale {min_scale} outside (0, 1]"
            )));
        }
        match *mode {
            CropMode::FixedWh { width: w, height: h } => {
                if w == 0 || h == 0 {
                    return Err(CropError::config("fixed_wh requires positive width and height"));
                }
                if w > width || h > height {
                    return Err(CropError::config(format!(
                        "fixed size {w}x{h} exceeds image {width}x{height}"
                    )));
                }
                Ok(SizeConstraint::Exact { w, h })
            }
            CropMode::Scale { scale } => {
                if !(scale > 0.0 && scale <= 1.0) {
                    return Err(CropError::config(format!("scale {scale} outside (0, 1]")));
                }
                let w = scaled_floor(width, scale).max(1);
                let h = scaled_floor(height, scale).max(1);
                Ok(SizeConstraint::Exact { w, h })
            }
            CropMode::Aspect { width: a, height: b } => {
                let ratio = AspectRatio::new(a, b)?;
                let dominant_extent = if ratio.width_dominant() { width } else { height };
                let min_dominant = scaled_ceil(dominant_extent, min_scale)
                    .max(ratio.min_nonempty_dominant())
                    .max(1);
                let max_dominant = ratio.max_dominant(width, height);
                if min_dominant > max_dominant {
                    return Err(CropError::InfeasibleConstraint(format!(
                        "aspect {ratio} needs a dominant side of at least {min_dominant} px \
                         but {width}x{height} allows at most {max_dominant}"
                    )));
                }
                Ok(SizeConstraint::Aspect {
                    ratio,
                    min_dominant,
                    max_dominant,
                })
            }
            CropMode::Free => Ok(SizeConstraint::Free {
                min_w: scaled_ceil(width, min_scale).clamp(1, width),
                min_h: scaled_ceil(height, min_scale).clamp(1, height),
                max_w: width,
                max_h: height,
            }),
        }
    }

    /// True when `(w, h)` belongs to the feasible set.
    pub fn admits(&self, w: usize, h: usize) -> bool {
        match *self {
            SizeConstraint::Exact { w: ew, h: eh } => w == ew && h == eh,
            SizeConstraint::Aspect {
                ratio,
                min_dominant,
                max_dominant,
            } => {
                let d = if ratio.width_dominant() { w } else { h };
                d >= min_dominant && d <= max_dominant && ratio.size_for(d) == (w, h)
            }
            SizeConstraint::Free {
                min_w,
                min_h,
                max_w,
                max_h,
            } => w >= min_w && w <= max_w && h >= min_h && h <= max_h,
        }
    }

    /// Smallest admissible size.
    pub fn min_size(&self) -> (usize, usize) {
        match *self {
            SizeConstraint::Exact { w, h } => (w, h),
            SizeConstraint::Aspect {
                ratio, min_dominant, ..
            } => ratio.size_for(min_dominant),
            SizeConstraint::Free { min_w, min_h, .. } => (min_w, min_h),
        }
    }

    /// Largest admissible size.
    pub fn max_size(&self) -> (usize, usize) {
        match *self {
            SizeConstraint::Exact { w, h } => (w, h),
            SizeConstraint::Aspect {
                ratio, max_dominant, ..
            } => ratio.size_for(max_dominant),
            SizeConstraint::Free { max_w, max_h, .. } => (max_w, max_h),
        }
    }

    /// Sizes visited by a grid walk, smallest first.
    ///
    /// Aspect sizes grow the dominant side by `step_frac` of the matching
    /// image extent; free sizes form a lattice with the same relative step on
    /// each axis. The largest admissible size always closes the ladder.
    pub fn size_ladder(&self, step_frac: f64, width: usize, height: usize) -> Vec<(usize, usize)> {
        match *self {
            SizeConstraint::Exact { w, h } => vec![(w, h)],
            SizeConstraint::Aspect {
                ratio,
                min_dominant,
                max_dominant,
            } => {
                let extent = if ratio.width_dominant() { width } else { height };
                let step = ladder_step(extent, step_frac);
                ladder(min_dominant, max_dominant, step)
                    .into_iter()
                    .map(|d| ratio.size_for(d))
                    .collect()
            }
            SizeConstraint::Free {
                min_w,
                min_h,
                max_w,
                max_h,
            } => {
                let ws = ladder(min_w, max_w, ladder_step(width, step_frac));
                let hs = ladder(min_h, max_h, ladder_step(height, step_frac));
                let mut sizes = Vec::with_capacity(ws.len() * hs.len());
                for &h in &hs {
                    for &w in &ws {
                        sizes.push((w, h));
                    }
                }
                sizes.sort_by_key(|&(w, h)| (w * h, h, w));
                sizes
            }
        }
    }

    /// Draw an admissible size no larger than `room_w × room_h`, uniformly
    /// over the free parameter(s). `None` when nothing fits.
    pub fn sample_size<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        room_w: usize,
        room_h: usize,
    ) -> Option<(usize, usize)> {
        match *self {
            SizeConstraint::Exact { w, h } => (w <= room_w && h <= room_h).then_some((w, h)),
            SizeConstraint::Aspect {
                ratio,
                min_dominant,
                max_dominant,
            } => {
                let upper = max_dominant.min(ratio.max_dominant(room_w, room_h));
                if room_w == 0 || room_h == 0 || upper < min_dominant {
                    return None;
                }
                Some(ratio.size_for(rng.gen_range(min_dominant..=upper)))
            }
            SizeConstraint::Free {
                min_w,
                min_h,
                max_w,
                max_h,
            } => {
                let (upper_w, upper_h) = (max_w.min(room_w), max_h.min(room_h));
                if upper_w < min_w || upper_h < min_h {
                    return None;
                }
                Some((
                    rng.gen_range(min_w..=upper_w),
                    rng.gen_range(min_h..=upper_h),
                ))
            }
        }
    }
}

fn scaled_floor(extent: usize, scale: f64) -> usize {
    (extent as f64 * scale + SCALE_EPS).floor() as usize
}

fn scaled_ceil(extent: usize, scale: f64) -> usize {
    (extent as f64 * scale - SCALE_EPS).ceil().max(0.0) as usize
}

fn ladder_step(extent: usize, step_frac: f64) -> usize {
    ((extent as f64 * step_frac + SCALE_EPS).floor() as usize).max(1)
}

fn ladder(min: usize, max: usize, step: usize) -> Vec<usize> {
    let mut out: Vec<usize> = (min..=max).step_by(step.max(1)).collect();
    if out.last().is_some_and(|&last| last != max) {
        out.push(max);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn scale_mode_halves_both_sides() {
        let c = SizeConstraint::resolve(&CropMode::Scale { scale: 0.5 }, 100, 100, 0.3).unwrap();
        assert_eq!(c, SizeConstraint::Exact { w: 50, h: 50 });
        let c = SizeConstraint::resolve(&CropMode::Scale { scale: 0.3 }, 110, 70, 0.3).unwrap();
        assert_eq!(c, SizeConstraint::Exact { w: 33, h: 21 });
    }

    #[test]
    fn invalid_options_are_config_errors() {
        for mode in [
            CropMode::Scale { scale: 0.0 },
            CropMode::Scale { scale: 1.5 },
            CropMode::FixedWh { width: 0, height: 4 },
            CropMode::FixedWh { width: 200, height: 4 },
            CropMode::Aspect { width: 0, height: 1 },
        ] {
            let err = SizeConstraint::resolve(&mode, 100, 80, 0.4).unwrap_err();
            assert!(matches!(err, CropError::Config(_)), "{mode:?} -> {err}");
        }
    }

    #[test]
    fn aspect_bounds_follow_dominant_side() {
        let c = SizeConstraint::resolve(&CropMode::Aspect { width: 16, height: 9 }, 200, 100, 0.4)
            .unwrap();
        let SizeConstraint::Aspect {
            min_dominant,
            max_dominant,
            ..
        } = c
        else {
            panic!("expected aspect constraint");
        };
        assert_eq!(min_dominant, 80);
        // 16:9 at width 179 still floors to height 100.
        assert_eq!(max_dominant, 179);
        assert_eq!(c.min_size(), (80, 45));
        assert_eq!(c.max_size(), (179, 100));
        assert!(c.admits(160, 90));
        assert!(!c.admits(160, 91));
        assert!(!c.admits(64, 36));
    }

    #[test]
    fn extreme_aspect_on_thin_image_is_infeasible() {
        let err = SizeConstraint::resolve(&CropMode::Aspect { width: 10, height: 1 }, 100, 2, 0.4)
            .unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn ladder_ends_at_largest_size() {
        let c = SizeConstraint::resolve(&CropMode::Aspect { width: 1, height: 1 }, 100, 60, 0.4)
            .unwrap();
        let ladder = c.size_ladder(0.1, 100, 60);
        assert_eq!(ladder.first(), Some(&(24, 24)));
        assert_eq!(ladder.last(), Some(&(60, 60)));
        assert_eq!(ladder.first().copied(), Some(c.min_size()));
        assert_eq!(ladder.last().copied(), Some(c.max_size()));
        assert!(ladder.windows(2).all(|p| p[0].0 < p[1].0));
        assert!(ladder.iter().all(|&(w, h)| c.admits(w, h)));
    }

    #[test]
    fn sampled_sizes_are_admissible_and_fit_the_room() {
        let mut rng = StdRng::seed_from_u64(11);
        let modes = [
            CropMode::FixedWh { width: 20, height: 10 },
            CropMode::Aspect { width: 4, height: 3 },
            CropMode::Aspect { width: 2, height: 5 },
            CropMode::Free,
        ];
        for mode in modes {
            let c = SizeConstraint::resolve(&mode, 120, 90, 0.3).unwrap();
            for _ in 0..200 {
                let room_w = rng.gen_range(1..=120);
                let room_h = rng.gen_range(1..=90);
                if let Some((w, h)) = c.sample_size(&mut rng, room_w, room_h) {
                    assert!(c.admits(w, h), "{mode:?} sampled {w}x{h}");
                    assert!(w <= room_w && h <= room_h);
                }
            }
        }
    }
}
