use super::CandidateSource;
use crate::constraint::SizeConstraint;
use crate::types::Rect;

/// Fraction of the dominant image extent added per aspect ladder rung.
pub const DEFAULT_SIZE_STEP: f64 = 0.1;

/// Exhaustive walk of top-left corners on a regular lattice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridWalk {
    pub h_step: usize,
    pub v_step: usize,
    /// Relative growth between consecutive sizes for aspect/free constraints.
    pub size_step: f64,
}

impl GridWalk {
    pub fn new(h_step: usize, v_step: usize) -> Self {
        Self {
            h_step: h_step.max(1),
            v_step: v_step.max(1),
            size_step: DEFAULT_SIZE_STEP,
        }
    }

    /// Default lattice: one step per percent of each image extent.
    pub fn for_image(width: usize, height: usize) -> Self {
        Self::new(default_step(width), default_step(height))
    }

    /// Lattice from optional per-axis overrides.
    pub fn with_steps(
        width: usize,
        height: usize,
        h_step: Option<usize>,
        v_step: Option<usize>,
    ) -> Self {
        Self::new(
            h_step.unwrap_or_else(|| default_step(width)),
            v_step.unwrap_or_else(|| default_step(height)),
        )
    }

    pub fn with_size_step(mut self, size_step: f64) -> Self {
        self.size_step = size_step;
        self
    }

    /// Every `w × h` rectangle whose corner lies on the lattice and which fits
    /// inside the image.
    pub fn walk(&self, w: usize, h: usize, width: usize, height: usize) -> Vec<Rect> {
        let mut out = Vec::new();
        self.walk_into(w, h, width, height, &mut out);
        out
    }

    fn walk_into(&self, w: usize, h: usize, width: usize, height: usize, out: &mut Vec<Rect>) {
        if w == 0 || h == 0 || w > width || h > height {
            return;
        }
        for y in (0..=height - h).step_by(self.v_step) {
            for x in (0..=width - w).step_by(self.h_step) {
                out.push(Rect::new(x, y, w, h));
            }
        }
    }
}

impl CandidateSource for GridWalk {
    fn generate(&mut self, constraint: &SizeConstraint, width: usize, height: usize) -> Vec<Rect> {
        let mut out = Vec::new();
        for (w, h) in constraint.size_ladder(self.size_step, width, height) {
            self.walk_into(w, h, width, height, &mut out);
        }
        out
    }
}

/// `max(1, extent / 100)`.
#[inline]
pub fn default_step(extent: usize) -> usize {
    (extent / 100).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::CropMode;

    #[test]
    fn default_steps_follow_image_extent() {
        let g = GridWalk::for_image(640, 80);
        assert_eq!((g.h_step, g.v_step), (6, 1));
        let g = GridWalk::with_steps(640, 80, None, Some(5));
        assert_eq!((g.h_step, g.v_step), (6, 5));
    }

    #[test]
    fn fixed_walk_covers_the_lattice() {
        let rects = GridWalk::new(10, 10).walk(30, 30, 100, 100);
        assert_eq!(rects.len(), 8 * 8);
        assert_eq!(rects[0], Rect::new(0, 0, 30, 30));
        assert_eq!(rects[rects.len() - 1], Rect::new(70, 70, 30, 30));
        assert!(GridWalk::new(1, 1).walk(101, 10, 100, 100).is_empty());
    }

    #[test]
    fn walk_respects_every_constraint() {
        let (w, h) = (97usize, 61usize);
        for mode in [
            CropMode::FixedWh { width: 13, height: 40 },
            CropMode::Scale { scale: 0.7 },
            CropMode::Aspect { width: 3, height: 2 },
            CropMode::Aspect { width: 1, height: 4 },
            CropMode::Free,
        ] {
            let c = SizeConstraint::resolve(&mode, w, h, 0.4).unwrap();
            let rects = GridWalk::new(3, 4).generate(&c, w, h);
            assert!(!rects.is_empty(), "{mode:?}");
            for r in rects {
                assert!(r.fits_within(w, h), "{mode:?} {r}");
                assert!(c.admits(r.w, r.h), "{mode:?} {r}");
            }
        }
    }
}
