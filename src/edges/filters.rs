//! Separable smoothing applied before gradient extraction.
use crate::image::{ImageF32, ImageView, ImageViewMut};

/// Trait implemented by separable 1D filters. The taps are applied along rows
/// and then along columns.
pub trait SeparableFilter {
    /// Return the 1D taps (in left-to-right order).
    fn taps(&self) -> &[f32];
}

/// Normalised Gaussian kernel truncated at `3σ`.
#[derive(Clone, Debug)]
pub struct GaussianFilter {
    taps: Vec<f32>,
}

impl GaussianFilter {
    pub fn with_sigma(sigma: f32) -> Self {
        if sigma <= 0.0 {
            return Self { taps: vec![1.0] };
        }
        let radius = (3.0 * sigma).ceil() as isize;
        let denom = 2.0 * sigma * sigma;
        let mut taps: Vec<f32> = (-radius..=radius)
            .map(|i| (-((i * i) as f32) / denom).exp())
            .collect();
        let sum: f32 = taps.iter().sum();
        for t in &mut taps {
            *t /= sum;
        }
        Self { taps }
    }
}

impl SeparableFilter for GaussianFilter {
    #[inline]
    fn taps(&self) -> &[f32] {
        &self.taps
    }
}

/// Convolve `src` with `filter` horizontally then vertically, replicating
/// border samples.
pub fn apply(filter: &dyn SeparableFilter, src: &ImageF32) -> ImageF32 {
    let taps = filter.taps();
    let radius = (taps.len() / 2) as isize;
    let mut horiz = ImageF32::new(src.w, src.h);
    if src.w == 0 || src.h == 0 {
        return horiz;
    }

    for y in 0..src.h {
        let src_row = src.row(y);
        let dst_row = horiz.row_mut(y);
        for (x, dst_px) in dst_row.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (k, &tap) in taps.iter().enumerate() {
                let idx = clamp_index(x as isize + k as isize - radius, src.w);
                acc += tap * src_row[idx];
            }
            *dst_px = acc;
        }
    }

    let mut out = ImageF32::new(src.w, src.h);
    for y in 0..src.h {
        let dst_row = out.row_mut(y);
        for (k, &tap) in taps.iter().enumerate() {
            let sy = clamp_index(y as isize + k as isize - radius, src.h);
            let src_row = horiz.row(sy);
            for (dst_px, &s) in dst_row.iter_mut().zip(src_row) {
                *dst_px += tap * s;
            }
        }
    }
    out
}

pub(crate) fn clamp_index(idx: isize, upper: usize) -> usize {
    if upper == 0 {
        return 0;
    }
    if idx < 0 {
        0
    } else if (idx as usize) >= upper {
        upper - 1
    } else {
        idx as usize
    }
}
