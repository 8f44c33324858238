//! Visual-composition cue.
//!
//! A crop is summarised by a spatial pyramid of mean saliency: the crop is
//! area-averaged onto an `n × n` grid (`n = 4` or `8`) and every coarser level
//! averages the four children of the level below, down to a single global
//! mean. The levels are concatenated finest first, giving 21 (`4×4 + 2×2 + 1`)
//! or 85 (`8×8 + 4×4 + 2×2 + 1`) values in `[0, 1]`. An external classifier
//! maps the vector to a cost; lower is better.
//!
//! The finest grid is read straight from the saliency integral image with
//! fractional edge weights, so no pixels of the crop are copied.
use super::SaliencyScorer;
use crate::error::{CropError, Result};
use crate::image::io::read_json_file;
use crate::types::Rect;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Cost returned for crops that cannot be described (empty or without saliency).
pub const DEGENERATE_COST: f64 = 1.0e6;

/// Pure function from a pyramid feature vector to a composition cost.
pub trait CompositionClassifier: Send + Sync {
    fn score(&self, features: &[f32]) -> f32;

    /// Expected feature length, when the model fixes one.
    fn feature_len(&self) -> Option<usize> {
        None
    }
}

impl<F> CompositionClassifier for F
where
    F: Fn(&[f32]) -> f32 + Send + Sync,
{
    fn score(&self, features: &[f32]) -> f32 {
        self(features)
    }
}

/// Linear decision function `w · x + b`, stored as JSON
/// `{"weights": [...], "bias": b}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearClassifier {
    pub weights: Vec<f32>,
    #[serde(default)]
    pub bias: f32,
}

impl LinearClassifier {
    pub fn load(path: &Path) -> Result<Self> {
        let model: LinearClassifier = read_json_file(path)?;
        if model.weights.is_empty() {
            return Err(CropError::Classifier(format!(
                "{} holds no weights",
                path.display()
            )));
        }
        Ok(model)
    }
}

impl CompositionClassifier for LinearClassifier {
    fn score(&self, features: &[f32]) -> f32 {
        self.weights
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f32>()
            + self.bias
    }

    fn feature_len(&self) -> Option<usize> {
        Some(self.weights.len())
    }
}

/// Resolution of the finest pyramid level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PyramidDepth {
    /// 4×4 finest grid, 21 features.
    #[default]
    Grid4,
    /// 8×8 finest grid, 85 features.
    Grid8,
}

impl PyramidDepth {
    /// Depth producing exactly `len` features, if any.
    pub fn for_feature_len(len: usize) -> Option<Self> {
        [PyramidDepth::Grid4, PyramidDepth::Grid8]
            .into_iter()
            .find(|d| d.feature_len() == len)
    }

    pub fn side(&self) -> usize {
        match self {
            PyramidDepth::Grid4 => 4,
            PyramidDepth::Grid8 => 8,
        }
    }

    pub fn feature_len(&self) -> usize {
        match self {
            PyramidDepth::Grid4 => 21,
            PyramidDepth::Grid8 => 85,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Span {
    start: usize,
    end: usize,
    weight: f64,
}

/// Integer pixel runs covering the real interval `[a, b)`: a partially
/// covered head pixel, the fully covered middle and a partial tail pixel.
fn spans(a: f64, b: f64) -> ([Span; 3], usize) {
    let mut out = [Span::default(); 3];
    let mut n = 0;
    let first = a.floor();
    let last = b.floor();
    if first == last {
        out[0] = Span {
            start: first as usize,
            end: first as usize + 1,
            weight: b - a,
        };
        return (out, 1);
    }
    let head = first + 1.0 - a;
    let full_start = if head < 1.0 {
        out[n] = Span {
            start: first as usize,
            end: first as usize + 1,
            weight: head,
        };
        n += 1;
        first as usize + 1
    } else {
        first as usize
    };
    let full_end = last as usize;
    if full_end > full_start {
        out[n] = Span {
            start: full_start,
            end: full_end,
            weight: 1.0,
        };
        n += 1;
    }
    let tail = b - last;
    if tail > 0.0 {
        out[n] = Span {
            start: full_end,
            end: full_end + 1,
            weight: tail,
        };
        n += 1;
    }
    (out, n)
}

/// Spatial-pyramid feature vector of `rect` over the saliency map behind
/// `saliency`. Values are mean saliency scaled to `[0, 1]`.
pub fn spatial_pyramid(saliency: &SaliencyScorer, rect: &Rect, depth: PyramidDepth) -> Vec<f32> {
    let n = depth.side();
    let integral = saliency.integral();
    let mut features = Vec::with_capacity(depth.feature_len());

    // Cell edges come from integer products so the last edge lands exactly
    // on the crop border.
    let edge = |origin: usize, extent: usize, i: usize| {
        origin as f64 + (i * extent) as f64 / n as f64
    };
    let mut level = vec![0f64; n * n];
    for cy in 0..n {
        let (y0, y1) = (edge(rect.y, rect.h, cy), edge(rect.y, rect.h, cy + 1));
        let (ys, ny) = spans(y0, y1);
        for cx in 0..n {
            let (x0, x1) = (edge(rect.x, rect.w, cx), edge(rect.x, rect.w, cx + 1));
            let (xs, nx) = spans(x0, x1);
            let mut acc = 0.0;
            for sy in &ys[..ny] {
                for sx in &xs[..nx] {
                    let sum = integral.sum_corners(sx.start, sy.start, sx.end, sy.end);
                    acc += sum as f64 * sx.weight * sy.weight;
                }
            }
            level[cy * n + cx] = acc / ((x1 - x0) * (y1 - y0)) / 255.0;
        }
    }
    features.extend(level.iter().map(|&v| v as f32));

    let mut side = n;
    while side > 1 {
        let half = side / 2;
        let mut coarse = vec![0f64; half * half];
        for y in 0..half {
            for x in 0..half {
                let tl = level[(2 * y) * side + 2 * x];
                let tr = level[(2 * y) * side + 2 * x + 1];
                let bl = level[(2 * y + 1) * side + 2 * x];
                let br = level[(2 * y + 1) * side + 2 * x + 1];
                coarse[y * half + x] = 0.25 * (tl + tr + bl + br);
            }
        }
        features.extend(coarse.iter().map(|&v| v as f32));
        level = coarse;
        side = half;
    }
    debug_assert_eq!(features.len(), depth.feature_len());
    features
}

/// Adapter from a rectangle to the classifier's composition cost.
pub struct CompositionScorer<'a> {
    saliency: &'a SaliencyScorer,
    classifier: &'a dyn CompositionClassifier,
    depth: PyramidDepth,
}

impl<'a> CompositionScorer<'a> {
    /// Fails with [`CropError::Classifier`] when the model expects a feature
    /// length other than `depth.feature_len()`.
    pub fn new(
        saliency: &'a SaliencyScorer,
        classifier: &'a dyn CompositionClassifier,
        depth: PyramidDepth,
    ) -> Result<Self> {
        if let Some(len) = classifier.feature_len() {
            if len != depth.feature_len() {
                return Err(CropError::Classifier(format!(
                    "classifier expects {len} features, pyramid {depth:?} yields {}",
                    depth.feature_len()
                )));
            }
        }
        Ok(Self {
            saliency,
            classifier,
            depth,
        })
    }

    pub fn cost(&self, rect: &Rect) -> f64 {
        if rect.is_empty() || self.saliency.energy(rect) == 0 {
            return DEGENERATE_COST;
        }
        let features = spatial_pyramid(self.saliency, rect, self.depth);
        self.classifier.score(&features) as f64
    }
}

impl super::Scorer for CompositionScorer<'_> {
    fn score(&self, rect: &Rect) -> f64 {
        self.cost(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{ImageU8, ImageView};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Area-weighted cell means computed pixel by pixel over a borrowed view.
    fn naive_finest(view: &ImageU8<'_>, n: usize) -> Vec<f64> {
        let mut out = vec![0f64; n * n];
        let cw = view.w as f64 / n as f64;
        let ch = view.h as f64 / n as f64;
        for (y, row) in view.rows().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                for cy in 0..n {
                    let oy = overlap(y as f64, cy as f64 * ch, ch);
                    if oy == 0.0 {
                        continue;
                    }
                    for cx in 0..n {
                        let ox = overlap(x as f64, cx as f64 * cw, cw);
                        out[cy * n + cx] += v as f64 * ox * oy;
                    }
                }
            }
        }
        out.iter().map(|s| s / (cw * ch) / 255.0).collect()
    }

    fn overlap(px: f64, start: f64, len: f64) -> f64 {
        ((px + 1.0).min(start + len) - px.max(start)).max(0.0)
    }

    #[test]
    fn spans_split_fractional_intervals() {
        let (s, n) = spans(2.5, 6.25);
        assert_eq!(n, 3);
        assert_eq!((s[0].start, s[0].end, s[0].weight), (2, 3, 0.5));
        assert_eq!((s[1].start, s[1].end, s[1].weight), (3, 6, 1.0));
        assert_eq!((s[2].start, s[2].end, s[2].weight), (6, 7, 0.25));
        let (s, n) = spans(4.0, 8.0);
        assert_eq!(n, 1);
        assert_eq!((s[0].start, s[0].end), (4, 8));
        let (s, n) = spans(1.25, 1.75);
        assert_eq!(n, 1);
        assert_eq!((s[0].start, s[0].weight), (1, 0.5));
    }

    #[test]
    fn finest_level_matches_pixelwise_average() {
        let mut rng = StdRng::seed_from_u64(5);
        let (w, h) = (64usize, 48usize);
        let data: Vec<u8> = (0..w * h).map(|_| rng.gen()).collect();
        let map = ImageU8::new(w, h, &data);
        let scorer = SaliencyScorer::new(&map);
        for rect in [
            Rect::new(0, 0, 64, 48),
            Rect::new(3, 5, 21, 13),
            Rect::new(10, 7, 5, 3),
        ] {
            for depth in [PyramidDepth::Grid4, PyramidDepth::Grid8] {
                let features = spatial_pyramid(&scorer, &rect, depth);
                assert_eq!(features.len(), depth.feature_len());
                let view = map.sub_view(rect).unwrap();
                let expected = naive_finest(&view, depth.side());
                for (got, want) in features.iter().zip(&expected) {
                    assert!((*got as f64 - want).abs() < 1e-4, "{rect} {depth:?}");
                }
            }
        }
    }

    #[test]
    fn coarse_levels_average_their_children() {
        let data: Vec<u8> = (0..32 * 32).map(|i| (i % 251) as u8).collect();
        let scorer = SaliencyScorer::new(&ImageU8::new(32, 32, &data));
        let f = spatial_pyramid(&scorer, &Rect::new(2, 2, 24, 24), PyramidDepth::Grid4);
        let finest = &f[..16];
        let mid = &f[16..20];
        let top = f[20];
        let tl = 0.25 * (finest[0] + finest[1] + finest[4] + finest[5]);
        assert!((mid[0] - tl).abs() < 1e-6);
        let mean_mid = 0.25 * mid.iter().sum::<f32>();
        assert!((top - mean_mid).abs() < 1e-6);
    }

    #[test]
    fn degenerate_crops_get_the_sentinel_and_scoring_is_pure() {
        let mut data = vec![0u8; 40 * 40];
        data[25 * 40 + 25] = 255;
        let scorer = SaliencyScorer::new(&ImageU8::new(40, 40, &data));
        let model = LinearClassifier {
            weights: vec![0.5; 21],
            bias: -1.0,
        };
        let comp = CompositionScorer::new(&scorer, &model, PyramidDepth::Grid4).unwrap();
        assert_eq!(comp.cost(&Rect::new(0, 0, 10, 10)), DEGENERATE_COST);
        let r = Rect::new(20, 20, 12, 12);
        let a = comp.cost(&r);
        let b = comp.cost(&r);
        assert_eq!(a.to_bits(), b.to_bits());
        assert!(a < DEGENERATE_COST);
    }

    #[test]
    fn feature_length_mismatch_is_reported() {
        let data = vec![1u8; 16];
        let scorer = SaliencyScorer::new(&ImageU8::new(4, 4, &data));
        let model = LinearClassifier {
            weights: vec![1.0; 21],
            bias: 0.0,
        };
        let err = CompositionScorer::new(&scorer, &model, PyramidDepth::Grid8).err();
        assert!(matches!(err, Some(CropError::Classifier(_))));
        let constant = |_: &[f32]| 0.0f32;
        assert!(CompositionScorer::new(&scorer, &constant, PyramidDepth::Grid8).is_ok());
    }
}
