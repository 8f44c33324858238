//! I/O helpers for grayscale maps, crops and JSON.
//!
//! - `load_grayscale_image` / `to_grayscale`: PNG/JPEG/etc. into an owned 8-bit gray buffer.
//! - `save_grayscale_u8`: write an owned 8-bit gray buffer to a PNG.
//! - `save_crop`: cut a rectangle out of the colour source and write it.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::GrayImageU8;
use crate::error::{CropError, Result};
use crate::types::Rect;
use image::{DynamicImage, GenericImageView, GrayImage};
use serde::Serialize;
use std::fs;
use std::path::Path;

fn decode_err(path: &Path, err: impl std::fmt::Display) -> CropError {
    CropError::Decode {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

fn io_err(path: &Path, source: std::io::Error) -> CropError {
    CropError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Load an image from disk, keeping all channels.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|e| decode_err(path, e))
}

/// Load an image from disk and convert to 8-bit grayscale.
pub fn load_grayscale_image(path: &Path) -> Result<GrayImageU8> {
    Ok(to_grayscale(&load_image(path)?))
}

/// Luma conversion of an already decoded image.
pub fn to_grayscale(image: &DynamicImage) -> GrayImageU8 {
    let luma = image.to_luma8();
    let width = luma.width() as usize;
    let height = luma.height() as usize;
    GrayImageU8::new(width, height, luma.into_raw())
}

/// Save an 8-bit grayscale buffer to a PNG.
pub fn save_grayscale_u8(buffer: &GrayImageU8, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let image = GrayImage::from_raw(
        buffer.width() as u32,
        buffer.height() as u32,
        buffer.clone().into_raw(),
    )
    .ok_or_else(|| decode_err(path, "buffer does not match its dimensions"))?;
    image.save(path).map_err(|e| decode_err(path, e))
}

/// Crop `rect` out of `source` and save it to `path`.
pub fn save_crop(source: &DynamicImage, rect: Rect, path: &Path) -> Result<()> {
    let (w, h) = source.dimensions();
    if !rect.fits_within(w as usize, h as usize) {
        return Err(CropError::Image(format!(
            "crop {rect} exceeds source {w}x{h}"
        )));
    }
    ensure_parent_dir(path)?;
    source
        .crop_imm(rect.x as u32, rect.y as u32, rect.w as u32, rect.h as u32)
        .save(path)
        .map_err(|e| decode_err(path, e))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value).map_err(|e| decode_err(path, e))?;
    fs::write(path, json).map_err(|e| io_err(path, e))
}

/// Read and parse a JSON document.
pub fn read_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_json::from_str(&data).map_err(|e| decode_err(path, e))
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
    }
    Ok(())
}
