use super::Scorer;
use crate::image::ImageU8;
use crate::integral::IntegralImage;
use crate::types::Rect;

/// Perimeter thickness in pixels.
pub const BORDER_WIDTH: usize = 2;

/// Boundary-simplicity cue: mean edge gradient along a crop's border band.
/// Lower is cleaner.
#[derive(Clone, Debug)]
pub struct BoundaryScorer {
    integral: IntegralImage,
}

impl BoundaryScorer {
    pub fn new(gradient: &ImageU8<'_>) -> Self {
        Self {
            integral: IntegralImage::integrate(gradient),
        }
    }

    /// Mean gradient over the band between `rect` and its inset by
    /// `min(2, w/2, h/2)`. Rectangles one pixel thin are all border.
    pub fn mean(&self, rect: &Rect) -> f64 {
        if rect.is_empty() {
            return 0.0;
        }
        let d = BORDER_WIDTH.min(rect.w / 2).min(rect.h / 2);
        let outer = self.integral.rect_sum(rect);
        let inner_rect = if d == 0 { None } else { Some(rect.inset(d)) };
        let (inner, inner_area) = match inner_rect {
            Some(r) if !r.is_empty() => (self.integral.rect_sum(&r), r.area()),
            _ => (0, 0),
        };
        let count = rect.area() - inner_area;
        debug_assert!(count > 0);
        (outer - inner) as f64 / count as f64
    }
}

impl Scorer for BoundaryScorer {
    fn score(&self, rect: &Rect) -> f64 {
        self.mean(rect)
    }
}
