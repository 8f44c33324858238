//! Greedy region grow for unconstrained crops.
//!
//! States: a small square centred in the image, grown on demand, accepted
//! once it holds the requested saliency share. Each round clears the pixels
//! the rectangle gained on a private working copy of the map, finds the
//! brightest remaining pixel and stretches the rectangle just enough to
//! include it.
//! Every round adds at least one row or column, so the loop ends after at
//! most `W + H` rounds even if the share is never reached.
use crate::image::{GrayImageU8, ImageU8};
use crate::scoring::SaliencyScorer;
use crate::types::Rect;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GrowOutcome {
    pub rect: Rect,
    /// Grow rounds performed after the initial square.
    pub iterations: usize,
    /// Saliency share of `rect`.
    pub ratio: f64,
    /// False when the map ran out of saliency before the share was met.
    pub reached: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct RegionGrow {
    pub threshold: f64,
}

impl RegionGrow {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Centred square of side `max(1, W / 20)`, clipped to the image.
    pub fn seed_rect(width: usize, height: usize) -> Rect {
        let side = (width / 20).max(1).min(width).min(height);
        Rect::new((width - side) / 2, (height - side) / 2, side, side)
    }

    pub fn grow(&self, saliency: &ImageU8<'_>, scorer: &SaliencyScorer) -> GrowOutcome {
        let (width, height) = (saliency.w, saliency.h);
        let mut rect = Self::seed_rect(width, height);
        let mut work = GrayImageU8::from_view(saliency);
        let limit = width * height;
        let mut iterations = 0;
        let mut reached = false;
        let mut cleared: Option<Rect> = None;

        while iterations < limit {
            if scorer.covers_at_least(&rect, self.threshold) {
                reached = true;
                break;
            }
            clear_added(&mut work, cleared, &rect);
            cleared = Some(rect);
            let Some((px, py, v)) = work.as_view().argmax() else {
                break;
            };
            if v == 0 {
                break;
            }
            let x1 = rect.x.min(px);
            let y1 = rect.y.min(py);
            let x2 = rect.right().max(px + 1);
            let y2 = rect.bottom().max(py + 1);
            rect = Rect::from_corners(x1, y1, x2, y2);
            iterations += 1;
        }

        let ratio = scorer.ratio(&rect);
        log::debug!(
            "RegionGrow: rect={rect} ratio={ratio:.3} iterations={iterations} reached={reached}"
        );
        GrowOutcome {
            rect,
            iterations,
            ratio,
            reached: reached || ratio >= self.threshold,
        }
    }
}

/// Zero the part of `rect` outside `done`. `rect` always contains `done`.
fn clear_added(work: &mut GrayImageU8, done: Option<Rect>, rect: &Rect) {
    for y in rect.y..rect.bottom() {
        match done.filter(|d| y >= d.y && y < d.bottom()) {
            Some(d) => {
                clear_span(work, y, rect.x, d.x);
                clear_span(work, y, d.right(), rect.right());
            }
            None => clear_span(work, y, rect.x, rect.right()),
        }
    }
}

fn clear_span(work: &mut GrayImageU8, y: usize, x0: usize, x1: usize) {
    for x in x0..x1 {
        work.set(x, y, 0);
    }
}
