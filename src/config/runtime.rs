use super::CropOptions;
use crate::edges::BlurPolicy;
use crate::error::Result;
use crate::image::io::read_json_file;
use crate::search::{FangParams, StentifordParams, SuhParams};
use crate::types::DriverTag;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving `crop_<driver>.<ext>` images.
    pub dir: PathBuf,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default)]
    pub report_json: Option<PathBuf>,
    /// Where to write the computed gradient map, if one was computed.
    #[serde(default)]
    pub gradient_image: Option<PathBuf>,
}

fn default_extension() -> String {
    "png".to_string()
}

impl OutputConfig {
    pub fn crop_path(&self, driver: DriverTag) -> PathBuf {
        self.dir
            .join(format!("crop_{}.{}", driver.as_str(), self.extension))
    }
}

/// JSON configuration of the `autocrop` binary.
#[derive(Clone, Debug, Deserialize)]
pub struct RuntimeConfig {
    /// Source photograph.
    pub input_path: PathBuf,
    /// Precomputed saliency map with the photograph's dimensions.
    pub saliency_path: PathBuf,
    /// Precomputed gradient map; derived from the photograph when absent.
    #[serde(default)]
    pub gradient_path: Option<PathBuf>,
    /// Linear composition model for the Fang driver.
    #[serde(default)]
    pub classifier_path: Option<PathBuf>,
    /// Drivers to run; all three when empty.
    #[serde(default)]
    pub drivers: Vec<DriverTag>,
    /// Stretch the saliency map to the full `[0, 255]` range first.
    #[serde(default)]
    pub normalize_saliency: bool,
    #[serde(default)]
    pub blur: BlurPolicy,
    #[serde(default)]
    pub options: CropOptions,
    #[serde(default)]
    pub suh: SuhParams,
    #[serde(default)]
    pub stentiford: StentifordParams,
    #[serde(default)]
    pub fang: FangParams,
    pub output: OutputConfig,
}

impl RuntimeConfig {
    pub fn drivers(&self) -> Vec<DriverTag> {
        if self.drivers.is_empty() {
            vec![DriverTag::Suh, DriverTag::Stentiford, DriverTag::Fang]
        } else {
            self.drivers.clone()
        }
    }
}

pub fn load_config(path: &Path) -> Result<RuntimeConfig> {
    let config: RuntimeConfig = read_json_file(path)?;
    config.options.validate()?;
    Ok(config)
}
