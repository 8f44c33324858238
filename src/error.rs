//! Error kinds surfaced by the crop-search engine and its I/O helpers.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CropError {
    /// The selected mode lacks a required option or a numeric option is out
    /// of range.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Saliency or gradient map dimensions do not match the source image.
    #[error("image mismatch: {0}")]
    Image(String),

    /// No rectangle satisfies the shape constraint and content threshold.
    /// Drivers report this as a warning and fall back to the full image.
    #[error("no rectangle satisfies the constraints: {0}")]
    InfeasibleConstraint(String),

    /// Composition classifier missing or incompatible with the feature layout.
    #[error("composition classifier: {0}")]
    Classifier(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {message}")]
    Decode { path: String, message: String },
}

pub type Result<T> = std::result::Result<T, CropError>;

impl CropError {
    pub fn config(msg: impl Into<String>) -> Self {
        CropError::Config(msg.into())
    }

    /// True for conditions that drivers downgrade to warnings.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CropError::InfeasibleConstraint(_) | CropError::Classifier(_)
        )
    }
}

impl serde::Serialize for CropError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
