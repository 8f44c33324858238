//! Invocation options and the JSON runtime configuration of the binary.

pub mod options;
pub mod runtime;

pub use options::CropOptions;
pub use runtime::{load_config, OutputConfig, RuntimeConfig};
