//! Diagnostics returned alongside every crop.
//!
//! `CropReport` carries the winning `CropResult`, the amount of work done,
//! any downgraded errors (fallbacks) and a per-stage `TimingBreakdown`.

pub mod report;
pub mod timing;

pub(crate) use report::ReportBuilder;
pub use report::CropReport;
pub use timing::{StageTiming, TimingBreakdown};
