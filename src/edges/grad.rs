//! Sobel gradient map used by the boundary-simplicity scorer.
//!
//! - Optional Gaussian pre-blur whose sigma grows with the image size so that
//!   texture on large photographs does not dominate the edge response.
//! - 3×3 Sobel pair with border clamping.
//! - Magnitude approximated as `0.5·|gx| + 0.5·|gy|`, then min–max
//!   normalized to `[0, 255]`.
//!
//! Complexity: O(W·H·k) for the blur (k = kernel length) plus O(W·H).
use super::filters::{apply as apply_filter, clamp_index, GaussianFilter};
use crate::image::{GrayImageU8, ImageF32, ImageU8, ImageView, ImageViewMut};
use serde::Deserialize;

type Kernel3 = [[f32; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Pre-blur selection for [`gradient_map`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum BlurPolicy {
    /// Sigma picked from the larger image dimension.
    #[default]
    Auto,
    /// Fixed sigma in pixels.
    Sigma { sigma: f32 },
    /// Skip smoothing.
    Off,
}

impl BlurPolicy {
    pub fn sigma_for(&self, width: usize, height: usize) -> Option<f32> {
        match *self {
            BlurPolicy::Auto => Some(auto_sigma(width, height)),
            BlurPolicy::Sigma { sigma } if sigma > 0.0 => Some(sigma),
            BlurPolicy::Sigma { .. } | BlurPolicy::Off => None,
        }
    }
}

fn auto_sigma(width: usize, height: usize) -> f32 {
    let side = width.max(height);
    if side >= 3000 {
        8.0
    } else if side >= 2000 {
        5.0
    } else if side >= 1200 {
        3.0
    } else {
        2.0
    }
}

/// Per-pixel `0.5·|gx| + 0.5·|gy|` of the 3×3 Sobel pair, each term
/// saturated at 255 as for 8-bit gradient images.
pub fn sobel_magnitude(l: &ImageF32) -> ImageF32 {
    let (w, h) = (l.w, l.h);
    let mut mag = ImageF32::new(w, h);
    if w == 0 || h == 0 {
        return mag;
    }

    for y in 0..h {
        let y_idx = [
            clamp_index(y as isize - 1, h),
            y,
            clamp_index(y as isize + 1, h),
        ];
        let rows = [l.row(y_idx[0]), l.row(y_idx[1]), l.row(y_idx[2])];
        let out = mag.row_mut(y);
        for (x, out_px) in out.iter_mut().enumerate() {
            let x_idx = [
                clamp_index(x as isize - 1, w),
                x,
                clamp_index(x as isize + 1, w),
            ];
            let mut sum_x = 0.0;
            let mut sum_y = 0.0;
            for (ky, row) in rows.iter().enumerate() {
                let kx_row = &SOBEL_KERNEL_X[ky];
                let ky_row = &SOBEL_KERNEL_Y[ky];
                for k in 0..3 {
                    sum_x += row[x_idx[k]] * kx_row[k];
                    sum_y += row[x_idx[k]] * ky_row[k];
                }
            }
            *out_px = 0.5 * sum_x.abs().min(255.0) + 0.5 * sum_y.abs().min(255.0);
        }
    }
    mag
}

/// Edge-gradient map of a grayscale photograph, stretched to `[0, 255]`.
pub fn gradient_map(gray: &ImageU8<'_>, blur: BlurPolicy) -> GrayImageU8 {
    let src = ImageF32::from_u8(gray);
    let smoothed = match blur.sigma_for(gray.w, gray.h) {
        Some(sigma) => apply_filter(&GaussianFilter::with_sigma(sigma), &src),
        None => src,
    };
    let gm = sobel_magnitude(&smoothed);
    log::debug!(
        "gradient_map w={} h={} blur={:?}",
        gray.w,
        gray.h,
        blur.sigma_for(gray.w, gray.h)
    );
    gm.normalize_to_u8()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_image_valued(width: usize, height: usize, split_x: usize, value: u8) -> Vec<u8> {
        let mut img = vec![0u8; width * height];
        for y in 0..height {
            for x in split_x..width {
                img[y * width + x] = value;
            }
        }
        img
    }

    fn step_image(width: usize, height: usize, split_x: usize) -> Vec<u8> {
        step_image_valued(width, height, split_x, 200)
    }

    #[test]
    fn vertical_step_produces_vertical_ridge() {
        let data = step_image(32, 16, 16);
        let gm = gradient_map(&ImageU8::new(32, 16, &data), BlurPolicy::Off);
        for y in 0..16 {
            assert_eq!(gm.get(15, y), 255);
            assert_eq!(gm.get(16, y), 255);
            assert_eq!(gm.get(4, y), 0);
            assert_eq!(gm.get(28, y), 0);
        }
    }

    #[test]
    fn strong_edges_saturate_each_direction() {
        let strong = ImageF32::from_u8(&ImageU8::new(6, 3, &step_image_valued(6, 3, 3, 255)));
        let weak = ImageF32::from_u8(&ImageU8::new(6, 3, &step_image_valued(6, 3, 3, 50)));
        // |gx| = 4 * 255 saturates to 255; |gy| is zero on a vertical step.
        assert_eq!(sobel_magnitude(&strong).get(2, 1), 127.5);
        assert_eq!(sobel_magnitude(&weak).get(2, 1), 100.0);
    }

    #[test]
    fn flat_image_has_no_edges() {
        let data = vec![90u8; 20 * 10];
        let gm = gradient_map(&ImageU8::new(20, 10, &data), BlurPolicy::Auto);
        assert!(gm.as_view().data.iter().all(|&v| v == 0));
    }

    #[test]
    fn auto_blur_grows_with_image_size() {
        assert_eq!(BlurPolicy::Auto.sigma_for(800, 600), Some(2.0));
        assert_eq!(BlurPolicy::Auto.sigma_for(1600, 900), Some(3.0));
        assert_eq!(BlurPolicy::Auto.sigma_for(2400, 1600), Some(5.0));
        assert_eq!(BlurPolicy::Auto.sigma_for(1000, 4000), Some(8.0));
        assert_eq!(BlurPolicy::Off.sigma_for(4000, 4000), None);
    }
}
