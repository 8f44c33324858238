use autocrop::config::{load_config, RuntimeConfig};
use autocrop::edges::gradient_map;
use autocrop::image::io::{
    load_grayscale_image, load_image, save_crop, save_grayscale_u8, to_grayscale, write_json_file,
};
use autocrop::image::{GrayImageU8, ImageF32};
use autocrop::scoring::LinearClassifier;
use autocrop::{
    CropDriver, CropError, DriverTag, FangDriver, Result, SearchInput, StentifordDriver,
    SuhDriver,
};
use image::GenericImageView;
use std::env;
use std::path::Path;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn usage() -> CropError {
    CropError::config("usage: autocrop <config.json>")
}

fn run() -> Result<()> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;

    let source = load_image(&config.input_path)?;
    let (width, height) = source.dimensions();
    let (width, height) = (width as usize, height as usize);
    let saliency = load_saliency(&config)?;
    let gradient = match &config.gradient_path {
        Some(path) => load_grayscale_image(path)?,
        None => {
            let gray = to_grayscale(&source);
            let gm = gradient_map(&gray.as_view(), config.blur);
            if let Some(path) = &config.output.gradient_image {
                save_grayscale_u8(&gm, path)?;
            }
            gm
        }
    };
    let input =
        SearchInput::new(width, height, saliency.as_view())?.with_gradient(gradient.as_view())?;

    let mut reports = Vec::new();
    for tag in config.drivers() {
        let driver = build_driver(&config, tag)?;
        let report = driver.crop(&input, &config.options)?;
        let out_path = config.output.crop_path(tag);
        save_crop(&source, report.rect(), &out_path)?;
        println!(
            "{tag}: crop={} score={:.4} candidates={} fallback={} -> {}",
            report.rect(),
            report.result.score,
            report.candidates_evaluated,
            report.fallback,
            out_path.display()
        );
        reports.push(report);
    }

    let fallbacks = reports.iter().filter(|r| r.fallback).count();
    if fallbacks > 0 {
        log::warn!("{fallbacks} driver(s) returned the full image");
    }
    if let Some(path) = &config.output.report_json {
        write_json_file(path, &reports)?;
        println!("Saved report to {}", path.display());
    }
    Ok(())
}

fn load_saliency(config: &RuntimeConfig) -> Result<GrayImageU8> {
    let saliency = load_grayscale_image(&config.saliency_path)?;
    if config.normalize_saliency {
        Ok(ImageF32::from_u8(&saliency.as_view()).normalize_to_u8())
    } else {
        Ok(saliency)
    }
}

fn build_driver(config: &RuntimeConfig, tag: DriverTag) -> Result<Box<dyn CropDriver>> {
    let driver: Box<dyn CropDriver> = match tag {
        DriverTag::Suh => Box::new(SuhDriver::new(config.suh.clone())),
        DriverTag::Stentiford => Box::new(StentifordDriver::new(config.stentiford.clone())),
        DriverTag::Fang => {
            let driver = FangDriver::new(config.fang.clone());
            match &config.classifier_path {
                Some(path) => {
                    let model = LinearClassifier::load(path)?;
                    Box::new(driver.with_classifier(Box::new(model)))
                }
                None => Box::new(driver),
            }
        }
    };
    Ok(driver)
}
