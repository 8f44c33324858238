//! Candidate rectangle generators.
//!
//! - [`GridWalk`]: exhaustive lattice of corners for each admissible size.
//! - [`RandomSampler`] / [`AnchoredSampler`]: seeded random draws over the
//!   feasible set, globally or per lattice anchor.
//! - [`RegionGrow`]: greedy growth towards the brightest unclaimed pixel.
//!
//! All generators only emit rectangles inside the image that satisfy the
//! active [`SizeConstraint`].

pub mod greedy;
pub mod grid;
pub mod random;

pub use greedy::{GrowOutcome, RegionGrow};
pub use grid::{default_step, GridWalk};
pub use random::{resolve_seed, AnchoredSampler, RandomSampler};

use crate::constraint::SizeConstraint;
use crate::types::Rect;

/// Produces candidate rectangles for a `width × height` image.
pub trait CandidateSource {
    fn generate(&mut self, constraint: &SizeConstraint, width: usize, height: usize) -> Vec<Rect>;
}
