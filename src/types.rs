//! Core value types shared by scorers, candidate generators and drivers.
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Axis-aligned crop rectangle in pixel coordinates.
///
/// The top-left corner `(x, y)` is inclusive and the bottom-right corner
/// `(x + w, y + h)` is exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl Rect {
    pub const fn new(x: usize, y: usize, w: usize, h: usize) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle covering a whole `width × height` image.
    pub const fn full(width: usize, height: usize) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Build from half-open corner coordinates `[x1, x2) × [y1, y2)`.
    pub fn from_corners(x1: usize, y1: usize, x2: usize, y2: usize) -> Self {
        Self::new(x1, y1, x2.saturating_sub(x1), y2.saturating_sub(y1))
    }

    #[inline]
    pub fn right(&self) -> usize {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> usize {
        self.y + self.h
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.w * self.h
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// True when the rectangle is non-empty and lies inside a `width × height` image.
    #[inline]
    pub fn fits_within(&self, width: usize, height: usize) -> bool {
        !self.is_empty() && self.right() <= width && self.bottom() <= height
    }

    #[inline]
    pub fn contains_point(&self, px: usize, py: usize) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Shrink by `d` pixels on every side. Returns an empty rectangle when the
    /// inset consumes the whole extent.
    pub fn inset(&self, d: usize) -> Rect {
        let w = self.w.saturating_sub(2 * d);
        let h = self.h.saturating_sub(2 * d);
        if w == 0 || h == 0 {
            Rect::new(self.x + d, self.y + d, 0, 0)
        } else {
            Rect::new(self.x + d, self.y + d, w, h)
        }
    }

    /// Geometric order used to break score ties: `(y, x, w, h)` ascending.
    #[inline]
    pub fn tie_break(&self, other: &Rect) -> Ordering {
        (self.y, self.x, self.w, self.h).cmp(&(other.y, other.x, other.w, other.h))
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}x{})", self.x, self.y, self.w, self.h)
    }
}

/// A rectangle under evaluation with the score assigned by a driver.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Candidate {
    pub rect: Rect,
    pub score: f64,
}

impl Candidate {
    pub fn new(rect: Rect, score: f64) -> Self {
        Self { rect, score }
    }

    /// Deterministic "is better than" for maximised scores.
    ///
    /// Higher score wins; equal scores fall back to [`Rect::tie_break`] so the
    /// winner never depends on evaluation order.
    pub fn cmp_desc(&self, other: &Candidate) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.rect.tie_break(&other.rect))
    }

    /// Deterministic ordering for minimised scores (lower first).
    pub fn cmp_asc(&self, other: &Candidate) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.rect.tie_break(&other.rect))
    }
}

/// Search pipeline that produced a crop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverTag {
    Suh,
    Stentiford,
    Fang,
}

impl DriverTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverTag::Suh => "suh",
            DriverTag::Stentiford => "stentiford",
            DriverTag::Fang => "fang",
        }
    }
}

impl fmt::Display for DriverTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final crop selected by a driver.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CropResult {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
    /// Driver-specific winning score (ratio, mean saliency or fused rank).
    pub score: f64,
    pub driver: DriverTag,
}

impl CropResult {
    pub fn new(rect: Rect, score: f64, driver: DriverTag) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            w: rect.w,
            h: rect.h,
            score,
            driver,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}
