use image::RgbaImage;
use log::{debug, info};

use crate::{
    error::{AssetError, Result},
    indexed::IndexedImage,
    palette::{Palette, QuantizeConfig},
    preprocess::preprocess,
    tile::{TileId, TileSet},
    Area, Grid, BACKGROUND_HEIGHT, BACKGROUND_WIDTH, TILE_SIZE,
};

pub const DEFAULT_BACKGROUND_NAME: &str = "BackgroundData";
pub const DEFAULT_MAX_TILES: usize = 160;
/// Tile map entries are single bytes
pub const MAX_TILE_BUDGET: usize = 256;
pub const TILE_MAP_LEN: usize = (BACKGROUND_WIDTH * BACKGROUND_HEIGHT) as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundConfig {
    /// upper bound on unique tiles, the image is coarsened until it fits
    pub max_tiles: usize,
    /// mirror tile columns in the map, matching the mirrored bit order of
    /// PPU tile rows
    pub flip_x: bool,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        return Self {
            max_tiles: DEFAULT_MAX_TILES,
            flip_x: true,
        };
    }
}

impl BackgroundConfig {
    pub fn with_max_tiles(mut self, max_tiles: usize) -> Self {
        self.max_tiles = max_tiles;
        return self;
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_tiles == 0 || self.max_tiles > MAX_TILE_BUDGET {
            return Err(AssetError::TileBudget(self.max_tiles));
        }
        return Ok(());
    }
}

#[derive(Debug, Clone)]
pub struct Background {
    pub name: String,
    pub palette: Palette,
    pub tiles: TileSet,
    /// power of two block size the image was coarsened by
    pub scale: u32,
    /// tile id for every cell of the 64x60 PPU background, bottom row first
    pub tile_map: Vec<u8>,
    /// the rescaled image the tiles were cut from, for previews
    pub image: IndexedImage,
}

impl Background {
    pub fn tile_count(&self) -> usize {
        return self.tiles.len();
    }
}

/// Doubles the block size until the image needs at most `max_tiles` unique
/// tiles. Returns the coarsened image, its unique tile count and the scale.
pub fn fit_tile_budget(image: &IndexedImage, max_tiles: usize) -> (IndexedImage, usize, u32) {
    let mut scale = 1;
    let mut rescaled = image.clone();
    let mut tiles = TileSet::from_image(&rescaled);
    let largest = image.width().max(image.height());
    // past the largest side the image is a single transparent block
    while tiles.len() > max_tiles && scale <= largest {
        scale *= 2;
        rescaled = image.pixelate(scale);
        tiles = TileSet::from_image(&rescaled);
        info!("scale {}: {} unique tiles", scale, tiles.len());
    }
    return (rescaled, tiles.len(), scale);
}

fn check_map_fits(grid: Grid) -> Result<()> {
    if grid.x > BACKGROUND_WIDTH || grid.y > BACKGROUND_HEIGHT {
        return Err(AssetError::MapOverflow {
            cols: grid.x,
            rows: grid.y,
            max_cols: BACKGROUND_WIDTH,
            max_rows: BACKGROUND_HEIGHT,
        });
    }
    return Ok(());
}

/// Deduplicates the tiles of `image` and places their ids into the PPU
/// background layout. Rows are stored bottom up; columns are mirrored when
/// `flip_x` is set. Cells outside the image stay 0.
pub fn build_tile_map(image: &IndexedImage, flip_x: bool) -> Result<(TileSet, Vec<u8>)> {
    let grid = image.tile_grid();
    check_map_fits(grid)?;

    let mut tiles = TileSet::new();
    let mut map = vec![0u8; TILE_MAP_LEN];
    for cell in grid.iter_locs() {
        let id = tiles.insert(image.tile_at(cell * TILE_SIZE));
        let row = grid.y - cell.y - 1;
        let col = if flip_x { grid.x - cell.x - 1 } else { cell.x };
        map[(row * BACKGROUND_WIDTH + col) as usize] = id as u8;
    }
    return Ok((tiles, map));
}

/// The tile covering the most map cells, lowest id on ties
pub fn most_common_tile(tiles: &TileSet) -> Option<(TileId, usize)> {
    let mut best: Option<(TileId, usize)> = None;
    for (id, &count) in tiles.frequencies().iter().enumerate() {
        if best.map_or(true, |(_, most)| count > most) {
            best = Some((id, count));
        }
    }
    return best;
}

pub fn convert_background(
    image: RgbaImage,
    name: &str,
    config: &BackgroundConfig,
    quantize: &QuantizeConfig,
) -> Result<Background> {
    config.validate()?;
    let quantized = preprocess(image, quantize)?;
    let grid: Grid = quantized.image.tile_grid();

    let (rescaled, unique, scale) = fit_tile_budget(&quantized.image, config.max_tiles);
    info!("Number of tiles: {}", unique);
    info!("Scale: {}", scale);
    info!(
        "rows: {}, cols: {} ({} cells)",
        rescaled.height(),
        rescaled.width(),
        grid.area()
    );

    let (tiles, tile_map) = build_tile_map(&rescaled, config.flip_x)?;
    debug_assert_eq!(tiles.len(), unique);
    if let Some((id, count)) = most_common_tile(&tiles) {
        debug!("most common tile: {} ({} of {} cells)", id, count, grid.area());
    }
    return Ok(Background {
        name: name.to_owned(),
        palette: quantized.palette,
        tiles,
        scale,
        tile_map,
        image: rescaled,
    });
}
