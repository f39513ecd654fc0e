use std::path::Path;

use image::RgbaImage;
use log::info;

use crate::{
    error::{AssetError, Result},
    palette::{quantize, QuantizeConfig, Quantized},
    TILE_SIZE,
};

/// Alpha values above this become fully opaque, the rest fully transparent
pub const ALPHA_THRESHOLD: u8 = 127;

pub fn load_rgba(path: &Path) -> Result<RgbaImage> {
    info!("Preprocessing: {}", path.display());
    let image = image::io::Reader::open(path)?
        .with_guessed_format()?
        .decode()?
        .to_rgba8();
    return Ok(image);
}

pub fn binarize_alpha(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        pixel[3] = if pixel[3] > ALPHA_THRESHOLD { 255 } else { 0 };
    }
}

pub fn check_tileable(image: &RgbaImage) -> Result<()> {
    let (width, height) = image.dimensions();
    let tileable = |side: u32| side > 0 && side % TILE_SIZE == 0;
    if !tileable(width) || !tileable(height) {
        return Err(AssetError::Dimensions { width, height });
    }
    return Ok(());
}

/// Prepares an image for tiling: hard alpha, whole tiles, three colors
pub fn preprocess(mut image: RgbaImage, config: &QuantizeConfig) -> Result<Quantized> {
    binarize_alpha(&mut image);
    check_tileable(&image)?;
    return quantize(&image, config);
}
