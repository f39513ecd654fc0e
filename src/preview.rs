use std::{
    fs,
    path::{Path, PathBuf},
};

use glam::UVec2;
use image::RgbaImage;
use log::info;

use crate::{
    background::Background, error::Result, palette::Palette, sprite::Sprite, tile::Tile, Asset,
    Grid, TILE_SIZE,
};

/// Tiles per row of a tile sheet
pub const SHEET_COLUMNS: u32 = 16;

/// Lays tiles out left to right, top to bottom, decoded from the bit planes
/// the PPU reads
pub fn tile_sheet(tiles: &[Tile], palette: &Palette) -> RgbaImage {
    let count = tiles.len() as u32;
    let cols = count.clamp(1, SHEET_COLUMNS);
    let rows = ((count + cols - 1) / cols).max(1);
    let mut sheet = RgbaImage::new(cols * TILE_SIZE, rows * TILE_SIZE);
    for (i, tile) in tiles.iter().enumerate() {
        let i = i as u32;
        let origin = UVec2::new(i % cols, i / cols) * TILE_SIZE;
        let planes = tile.to_bitplanes();
        for p in Grid(UVec2::splat(TILE_SIZE)).iter_locs() {
            let at = origin + p;
            sheet.put_pixel(at.x, at.y, palette.rgba(planes.index_at(p.x, p.y)));
        }
    }
    return sheet;
}

fn save(image: &RgbaImage, path: PathBuf) -> Result<PathBuf> {
    image.save(&path)?;
    info!("wrote preview {}", path.display());
    return Ok(path);
}

pub fn write_sprite_preview(dir: &Path, sprite: &Sprite) -> Result<Vec<PathBuf>> {
    let mut written = vec![save(
        &sprite.image.to_rgba(&sprite.palette),
        dir.join(format!("{}.png", sprite.name)),
    )?];
    for (k, tile) in sprite.tiles.iter().enumerate() {
        let image = tile_sheet(std::slice::from_ref(tile), &sprite.palette);
        written.push(save(&image, dir.join(format!("{}_tile{}.png", sprite.name, k)))?);
    }
    return Ok(written);
}

pub fn write_background_preview(dir: &Path, background: &Background) -> Result<Vec<PathBuf>> {
    let image = background.image.to_rgba(&background.palette);
    let sheet = tile_sheet(background.tiles.tiles(), &background.palette);
    return Ok(vec![
        save(&image, dir.join(format!("{}.png", background.name)))?,
        save(&sheet, dir.join(format!("{}_tiles.png", background.name)))?,
    ]);
}

/// Renders the asset through its palette into `dir`, returning the files written
pub fn write_preview(dir: &Path, asset: &Asset) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    return match asset {
        Asset::Sprite(sprite) => write_sprite_preview(dir, sprite),
        Asset::Background(background) => write_background_preview(dir, background),
    };
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::palette::TRANSPARENT;

    fn palette() -> Palette {
        return Palette {
            colors: [[255, 0, 0], [0, 255, 0], [0, 0, 255]],
        };
    }

    #[test]
    fn sheet_wraps_rows() {
        let tiles: Vec<Tile> = (0..20).map(|i| Tile([(i % 4) as u8; 64])).collect();
        let sheet = tile_sheet(&tiles, &palette());
        assert_eq!(sheet.dimensions(), (16 * 8, 2 * 8));
        assert_eq!(sheet.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(sheet.get_pixel(8, 0).0, [0, 255, 0, 255]);
        assert_eq!(sheet.get_pixel(3 * 8, 0).0, TRANSPARENT);
        // tile 17 is the second tile of the second row
        assert_eq!(sheet.get_pixel(8 + 4, 8 + 4).0, [0, 255, 0, 255]);
    }

    #[test]
    fn single_tile_sheet() {
        let mut tile = Tile([0; 64]);
        tile[9] = 2;
        let sheet = tile_sheet(&[tile], &palette());
        assert_eq!(sheet.dimensions(), (8, 8));
        assert_eq!(sheet.get_pixel(1, 1).0, [0, 0, 255, 255]);
    }

    #[test]
    fn sheet_keeps_tile_orientation() {
        let mut tile = Tile([0; 64]);
        // top right and bottom left corners
        tile[7] = 1;
        tile[56] = 2;
        let sheet = tile_sheet(&[tile], &palette());
        assert_eq!(sheet.get_pixel(7, 0).0, [0, 255, 0, 255]);
        assert_eq!(sheet.get_pixel(0, 7).0, [0, 0, 255, 255]);
        assert_eq!(sheet.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(sheet.get_pixel(7, 7).0, [255, 0, 0, 255]);
    }

    #[test]
    fn writes_sprite_files() {
        let dir = std::env::temp_dir().join(format!("ppu-tiles-preview-{}", std::process::id()));
        let sprite = Sprite {
            name: "Lander".to_owned(),
            palette: palette(),
            tiles: vec![Tile([1; 64]), Tile([2; 64])],
            image: crate::indexed::IndexedImage::filled(16, 8, 1),
        };
        let written = write_preview(&dir, &Asset::Sprite(sprite)).unwrap();
        assert_eq!(written.len(), 3);
        assert!(written.iter().all(|path| path.exists()));
        let tile = image::open(dir.join("Lander_tile1.png")).unwrap().to_rgba8();
        assert_eq!(tile.get_pixel(0, 0).0, [0, 0, 255, 255]);
        fs::remove_dir_all(&dir).unwrap();
    }
}
