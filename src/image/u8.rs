use crate::types::Rect;

/// Borrowed single-channel 8-bit image with an explicit row stride.
///
/// Saliency and gradient maps are passed around as this view; sub-regions are
/// obtained with [`ImageU8::sub_view`] without copying pixels.
#[derive(Clone, Copy, Debug)]
pub struct ImageU8<'a> {
    pub w: usize,
    pub h: usize,
    pub stride: usize, // bytes between rows
    pub data: &'a [u8],
}

impl<'a> ImageU8<'a> {
    /// Tightly packed view over `data` (`stride == w`).
    pub fn new(w: usize, h: usize, data: &'a [u8]) -> Self {
        debug_assert!(data.len() >= w * h, "buffer shorter than w*h");
        Self {
            w,
            h,
            stride: w,
            data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride + x]
    }

    /// True when rows follow each other without padding.
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.stride == self.w
    }

    /// Zero-copy view of `rect`. Returns `None` when the rectangle does not
    /// fit inside the image.
    pub fn sub_view(&self, rect: Rect) -> Option<ImageU8<'a>> {
        if !rect.fits_within(self.w, self.h) {
            return None;
        }
        let start = rect.y * self.stride + rect.x;
        Some(ImageU8 {
            w: rect.w,
            h: rect.h,
            stride: self.stride,
            data: &self.data[start..],
        })
    }

    /// Location and value of the first maximum in row-major order.
    pub fn argmax(&self) -> Option<(usize, usize, u8)> {
        let mut best: Option<(usize, usize, u8)> = None;
        for y in 0..self.h {
            let row = &self.data[y * self.stride..y * self.stride + self.w];
            for (x, &v) in row.iter().enumerate() {
                if best.map_or(true, |(_, _, b)| v > b) {
                    best = Some((x, y, v));
                }
            }
        }
        best
    }
}

impl<'a> crate::image::traits::ImageView for ImageU8<'a> {
    type Pixel = u8;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn row(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageView;

    #[test]
    fn sub_view_shares_rows_with_parent() {
        let data: Vec<u8> = (0..48).collect();
        let img = ImageU8::new(8, 6, &data);
        let view = img.sub_view(Rect::new(2, 1, 3, 2)).expect("inside bounds");
        assert_eq!(view.row(0), &[10, 11, 12]);
        assert_eq!(view.row(1), &[18, 19, 20]);
        assert_eq!(view.get(2, 1), 20);
        assert!(!view.is_contiguous());
        assert!(img.sub_view(Rect::new(6, 0, 3, 1)).is_none());
    }

    #[test]
    fn argmax_prefers_first_in_row_major_order() {
        let mut data = vec![0u8; 16];
        data[6] = 9;
        data[9] = 9;
        let img = ImageU8::new(4, 4, &data);
        assert_eq!(img.argmax(), Some((2, 1, 9)));
    }
}
