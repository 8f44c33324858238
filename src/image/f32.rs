//! Owned single-channel f32 image in row-major layout (stride == width).
//!
//! Working buffer for gradient computation and for float saliency maps that
//! still need stretching to the 8-bit range used by the search engine.
use super::{GrayImageU8, ImageU8, ImageView};

#[derive(Clone, Debug)]
pub struct ImageF32 {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Number of f32 elements between consecutive rows (equals `w`)
    pub stride: usize,
    /// Backing storage in row-major order
    pub data: Vec<f32>,
}

impl ImageF32 {
    /// Construct a zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            stride: w,
            data: vec![0.0; w * h],
        }
    }

    /// Wrap an existing row-major buffer. Returns `None` on a length mismatch.
    pub fn from_vec(w: usize, h: usize, data: Vec<f32>) -> Option<Self> {
        (data.len() == w * h).then_some(Self {
            w,
            h,
            stride: w,
            data,
        })
    }

    /// Widen an 8-bit view without rescaling (values stay in `[0, 255]`).
    pub fn from_u8(src: &ImageU8<'_>) -> Self {
        let mut out = Self::new(src.w, src.h);
        for (y, row) in src.rows().enumerate() {
            let dst = &mut out.data[y * out.stride..y * out.stride + out.w];
            for (d, &s) in dst.iter_mut().zip(row) {
                *d = s as f32;
            }
        }
        out
    }

    #[inline]
    /// Convert (x, y) to a linear index into `data`.
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.stride + x
    }
    #[inline]
    /// Get the pixel value at (x, y).
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.idx(x, y)]
    }
    #[inline]
    /// Set the pixel value at (x, y).
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    /// Min–max stretch to `[0, 255]`.
    ///
    /// A constant image (including an all-zero one) maps to all zeros so that
    /// blank maps stay blank after normalization.
    pub fn normalize_to_u8(&self) -> GrayImageU8 {
        let (lo, hi) = self
            .data
            .iter()
            .filter(|v| v.is_finite())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let range = hi - lo;
        let bytes = if !range.is_finite() || range <= f32::EPSILON {
            vec![0u8; self.w * self.h]
        } else {
            let scale = 255.0 / range;
            self.data
                .iter()
                .map(|&v| {
                    if v.is_finite() {
                        ((v - lo) * scale).round().clamp(0.0, 255.0) as u8
                    } else {
                        0
                    }
                })
                .collect()
        };
        GrayImageU8::new(self.w, self.h, bytes)
    }
}

impl crate::image::traits::ImageView for ImageF32 {
    type Pixel = f32;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn row(&self, y: usize) -> &[f32] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
}

impl crate::image::traits::ImageViewMut for ImageF32 {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [f32] {
        let start = y * self.stride;
        let end = start + self.w;
        &mut self.data[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_stretches_to_full_range() {
        let img = ImageF32::from_vec(2, 2, vec![0.25, 0.5, 0.75, 1.25]).unwrap();
        let out = img.normalize_to_u8();
        assert_eq!(out.as_view().data, &[0, 64, 128, 255]);
    }

    #[test]
    fn constant_map_normalizes_to_zero() {
        let img = ImageF32::from_vec(3, 1, vec![0.4; 3]).unwrap();
        assert_eq!(img.normalize_to_u8().as_view().data, &[0, 0, 0]);
    }
}
