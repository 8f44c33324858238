use super::Scorer;
use crate::image::ImageU8;
use crate::integral::IntegralImage;
use crate::types::Rect;

/// Content-preservation cue: share of the saliency energy a crop retains.
#[derive(Clone, Debug)]
pub struct SaliencyScorer {
    integral: IntegralImage,
    total: u64,
}

impl SaliencyScorer {
    pub fn new(saliency: &ImageU8<'_>) -> Self {
        Self::from_integral(IntegralImage::integrate(saliency))
    }

    pub fn from_integral(integral: IntegralImage) -> Self {
        let total = integral.total();
        Self { integral, total }
    }

    #[inline]
    pub fn integral(&self) -> &IntegralImage {
        &self.integral
    }

    /// Saliency energy of the whole map.
    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// True when the map carries no saliency at all.
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.total == 0
    }

    #[inline]
    pub fn energy(&self, rect: &Rect) -> u64 {
        self.integral.rect_sum(rect)
    }

    /// `energy(rect) / total` in `[0, 1]`; 0 for a blank map.
    #[inline]
    pub fn ratio(&self, rect: &Rect) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.energy(rect) as f64 / self.total as f64
    }

    #[inline]
    pub fn covers_at_least(&self, rect: &Rect, threshold: f64) -> bool {
        self.ratio(rect) >= threshold
    }

    /// Mean saliency per pixel inside `rect`.
    #[inline]
    pub fn mean(&self, rect: &Rect) -> f64 {
        if rect.is_empty() {
            return 0.0;
        }
        self.energy(rect) as f64 / rect.area() as f64
    }
}

impl Scorer for SaliencyScorer {
    fn score(&self, rect: &Rect) -> f64 {
        self.ratio(rect)
    }
}

/// Scores a rectangle by its mean saliency per pixel.
#[derive(Clone, Copy, Debug)]
pub struct MeanSaliency<'a>(pub &'a SaliencyScorer);

impl Scorer for MeanSaliency<'_> {
    fn score(&self, rect: &Rect) -> f64 {
        self.0.mean(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_and_mean_of_a_single_block() {
        let mut data = vec![0u8; 100 * 100];
        for y in 40..50 {
            for x in 40..50 {
                data[y * 100 + x] = 255;
            }
        }
        let s = SaliencyScorer::new(&ImageU8::new(100, 100, &data));
        assert_eq!(s.total(), 100 * 255);
        assert_eq!(s.ratio(&Rect::new(40, 40, 10, 10)), 1.0);
        assert_eq!(s.ratio(&Rect::new(40, 40, 5, 10)), 0.5);
        assert!(s.covers_at_least(&Rect::new(35, 35, 20, 20), 1.0));
        assert_eq!(s.mean(&Rect::new(40, 40, 10, 10)), 255.0);
        assert_eq!(MeanSaliency(&s).score(&Rect::new(40, 40, 20, 10)), 127.5);
    }

    #[test]
    fn blank_map_scores_zero_everywhere() {
        let data = vec![0u8; 64];
        let s = SaliencyScorer::new(&ImageU8::new(8, 8, &data));
        assert!(s.is_blank());
        assert_eq!(s.ratio(&Rect::full(8, 8)), 0.0);
        assert!(!s.covers_at_least(&Rect::full(8, 8), 0.1));
    }
}
