use image::RgbaImage;
use log::info;

use crate::{
    error::Result,
    indexed::IndexedImage,
    palette::{Palette, QuantizeConfig},
    preprocess::preprocess,
    tile::{extract_tiles, Tile},
};

pub const DEFAULT_SPRITE_NAME: &str = "LanderData";

/// A sprite keeps every tile in row major order, duplicates included, so
/// tile `k` of the sprite is always the `k`th 8x8 block of the source.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub name: String,
    pub palette: Palette,
    pub tiles: Vec<Tile>,
    /// the quantized source, for previews
    pub image: IndexedImage,
}

pub fn convert_sprite(image: RgbaImage, name: &str, config: &QuantizeConfig) -> Result<Sprite> {
    let quantized = preprocess(image, config)?;
    let tiles: Vec<Tile> = extract_tiles(&quantized.image)
        .into_iter()
        .map(|(_, tile)| tile)
        .collect();
    info!("{}: {} sprite tiles", name, tiles.len());
    return Ok(Sprite {
        name: name.to_owned(),
        palette: quantized.palette,
        tiles,
        image: quantized.image,
    });
}
