#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod constraint;
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod search;
pub mod types;

// Building blocks of the search engine, public for tools and tests.
pub mod candidates;
pub mod edges;
pub mod integral;
pub mod scoring;

// --- High-level re-exports -------------------------------------------------

pub use crate::config::CropOptions;
pub use crate::constraint::CropMode;
pub use crate::diagnostics::CropReport;
pub use crate::error::{CropError, Result};
pub use crate::search::{
    CropDriver, FangDriver, FangParams, SearchInput, StentifordDriver, StentifordParams,
    SuhDriver, SuhParams,
};
pub use crate::types::{CropResult, DriverTag, Rect};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use autocrop::prelude::*;
///
/// # fn main() -> autocrop::Result<()> {
/// let (w, h) = (640usize, 480usize);
/// let saliency = vec![0u8; w * h];
/// let input = SearchInput::new(w, h, ImageU8::new(w, h, &saliency))?;
///
/// let options = CropOptions::new(CropMode::Scale { scale: 0.5 }).with_seed(1);
/// let report = SuhDriver::default().crop(&input, &options)?;
/// println!("crop={} fallback={}", report.rect(), report.fallback);
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::ImageU8;
    pub use crate::{
        CropDriver, CropMode, CropOptions, CropResult, FangDriver, SearchInput, StentifordDriver,
        SuhDriver,
    };
}
