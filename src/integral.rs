//! Summed-area table over a single-channel 8-bit map.
//!
//! The table has `(W+1) × (H+1)` entries with a zero first row and column so
//! that the sum over the half-open rectangle `[x1,x2) × [y1,y2)` is
//! `I[y2][x2] - I[y1][x2] - I[y2][x1] + I[y1][x1]` without branches.
//! Accumulation is 64-bit, so even a full `u8` map of any realistic size
//! cannot overflow.
use crate::image::{ImageU8, ImageView};
use crate::types::Rect;

#[derive(Clone, Debug)]
pub struct IntegralImage {
    width: usize,
    height: usize,
    /// Row stride of `table` (`width + 1`).
    stride: usize,
    table: Vec<u64>,
}

impl IntegralImage {
    /// Build the table in a single pass over `src`.
    pub fn integrate(src: &ImageU8<'_>) -> Self {
        let (w, h) = (src.width(), src.height());
        let stride = w + 1;
        let mut table = vec![0u64; stride * (h + 1)];
        for (y, row) in src.rows().enumerate() {
            let mut running = 0u64;
            let (prev, cur) = table.split_at_mut((y + 1) * stride);
            let prev = &prev[y * stride..];
            let cur = &mut cur[..stride];
            for (x, &px) in row.iter().enumerate() {
                running += px as u64;
                cur[x + 1] = prev[x + 1] + running;
            }
        }
        Self {
            width: w,
            height: h,
            stride,
            table,
        }
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
    fn at(&self, x: usize, y: usize) -> u64 {
        self.table[y * self.stride + x]
    }

    /// Sum over `[x1,x2) × [y1,y2)` in corner coordinates. Callers guarantee
    /// `x1 <= x2 <= width` and `y1 <= y2 <= height`.
    #[inline]
    pub(crate) fn sum_corners(&self, x1: usize, y1: usize, x2: usize, y2: usize) -> u64 {
        debug_assert!(x1 <= x2 && x2 <= self.width && y1 <= y2 && y2 <= self.height);
        self.at(x2, y2) + self.at(x1, y1) - self.at(x2, y1) - self.at(x1, y2)
    }

    /// Sum of the source over `rect` in constant time.
    ///
    /// Rectangles that do not fit inside the source yield 0.
    #[inline]
    pub fn rect_sum(&self, rect: &Rect) -> u64 {
        if rect.right() > self.width || rect.bottom() > self.height {
            return 0;
        }
        self.sum_corners(rect.x, rect.y, rect.right(), rect.bottom())
    }

    /// Sum over the whole source.
    #[inline]
    pub fn total(&self) -> u64 {
        self.at(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn naive_sum(data: &[u8], width: usize, rect: &Rect) -> u64 {
        let mut sum = 0u64;
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                sum += data[y * width + x] as u64;
            }
        }
        sum
    }

    #[test]
    fn small_table_matches_hand_computed_sums() {
        #[rustfmt::skip]
        let data = vec![
            1, 0, 1, 0, 0,
            2, 0, 0, 0, 0,
            3, 0, 1, 0, 0,
            0, 0, 0, 0, 1,
        ];
        let ii = IntegralImage::integrate(&ImageU8::new(5, 4, &data));
        assert_eq!(ii.total(), 9);
        assert_eq!(ii.rect_sum(&Rect::new(0, 0, 1, 2)), 3);
        assert_eq!(ii.rect_sum(&Rect::new(2, 0, 3, 4)), 3);
        assert_eq!(ii.rect_sum(&Rect::new(4, 3, 1, 1)), 1);
    }

    #[test]
    fn random_rectangles_match_naive_double_sum() {
        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..20 {
            let w = rng.gen_range(1..=200usize);
            let h = rng.gen_range(1..=200usize);
            let data: Vec<u8> = (0..w * h).map(|_| rng.gen()).collect();
            let ii = IntegralImage::integrate(&ImageU8::new(w, h, &data));
            for _ in 0..50 {
                let x = rng.gen_range(0..w);
                let y = rng.gen_range(0..h);
                let rw = rng.gen_range(1..=w - x);
                let rh = rng.gen_range(1..=h - y);
                let rect = Rect::new(x, y, rw, rh);
                assert_eq!(ii.rect_sum(&rect), naive_sum(&data, w, &rect), "rect {rect}");
            }
        }
    }

    #[test]
    fn strided_views_integrate_only_visible_pixels() {
        let data: Vec<u8> = (0..64).collect();
        let parent = ImageU8::new(8, 8, &data);
        let view = parent.sub_view(Rect::new(2, 3, 4, 2)).unwrap();
        let ii = IntegralImage::integrate(&view);
        let expected: u64 = (26..30).chain(34..38).sum();
        assert_eq!(ii.total(), expected);
    }

    #[test]
    fn out_of_bounds_rectangles_sum_to_zero() {
        let data = vec![255u8; 100];
        let ii = IntegralImage::integrate(&ImageU8::new(10, 10, &data));
        assert_eq!(ii.rect_sum(&Rect::new(5, 5, 6, 2)), 0);
        assert_eq!(ii.rect_sum(&Rect::new(0, 9, 1, 2)), 0);
    }

    #[test]
    fn nested_rectangles_never_lose_energy() {
        let mut rng = StdRng::seed_from_u64(7);
        let data: Vec<u8> = (0..120 * 80).map(|_| rng.gen()).collect();
        let ii = IntegralImage::integrate(&ImageU8::new(120, 80, &data));
        for _ in 0..200 {
            let outer = Rect::new(
                rng.gen_range(0..60),
                rng.gen_range(0..40),
                rng.gen_range(10..=60),
                rng.gen_range(10..=40),
            );
            let inner = Rect::new(
                outer.x + rng.gen_range(0..outer.w / 2),
                outer.y + rng.gen_range(0..outer.h / 2),
                rng.gen_range(1..=outer.w / 2),
                rng.gen_range(1..=outer.h / 2),
            );
            assert!(outer.contains_rect(&inner));
            assert!(ii.rect_sum(&inner) <= ii.rect_sum(&outer));
        }
    }
}
