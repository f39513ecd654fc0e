pub mod background;
pub mod emit;
pub mod error;
pub mod indexed;
pub mod kmeans;
pub mod layout;
pub mod manifest;
pub mod palette;
pub mod preprocess;
pub mod preview;
pub mod sprite;
pub mod tile;

pub use error::{AssetError, Result};

use background::Background;
use derive_more::{Deref, DerefMut, From, IsVariant};
use glam::UVec2;
use sprite::Sprite;

/// Side length in pixels of a PPU tile
pub const TILE_SIZE: u32 = 8;
/// Pixels per tile
pub const TILE_PIXELS: usize = (TILE_SIZE * TILE_SIZE) as usize;

/// Width of the PPU background in tiles
pub const BACKGROUND_WIDTH: u32 = 64;
/// Height of the PPU background in tiles
pub const BACKGROUND_HEIGHT: u32 = 60;

/// A converted image ready to be emitted
#[derive(Debug, Clone, From, IsVariant)]
pub enum Asset {
    Sprite(Sprite),
    Background(Background),
}

impl Asset {
    pub fn name(&self) -> &str {
        match self {
            Asset::Sprite(sprite) => &sprite.name,
            Asset::Background(background) => &background.name,
        }
    }

    /// Entries this asset occupies in the PPU tile table
    pub fn tile_count(&self) -> usize {
        match self {
            Asset::Sprite(sprite) => sprite.tiles.len(),
            Asset::Background(background) => background.tile_count(),
        }
    }
}

pub trait Area {
    type Output;
    fn area(&self) -> Self::Output;
}

impl Area for Grid {
    type Output = u32;

    fn area(&self) -> Self::Output {
        return self.x * self.y;
    }
}

/// Dimensions of a grid of cells, in cells
#[derive(Deref, DerefMut, From, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Grid(pub UVec2);

impl Grid {
    /// The grid of whole tiles covering an image of the given pixel size
    pub fn of_tiles<U: Into<UVec2>>(pixel_dims: U) -> Self {
        let dims: UVec2 = pixel_dims.into();
        return Grid(dims / TILE_SIZE);
    }

    /// Cell locations in row major order
    pub fn iter_locs(&self) -> impl Iterator<Item = UVec2> {
        return UVec2Iter::new(UVec2::ZERO, self.0);
    }
}

#[derive(Clone, Debug)]
pub struct UVec2Iter {
    pub cur: UVec2,
    pub end: UVec2,
}

impl UVec2Iter {
    pub fn new(start: UVec2, end: UVec2) -> Self {
        return Self { cur: start, end };
    }
}

impl Iterator for UVec2Iter {
    type Item = UVec2;

    fn next(&mut self) -> Option<Self::Item> {
        if self.end.x == 0 || self.cur.y >= self.end.y {
            return None;
        }
        let ret = self.cur;
        self.cur.x += 1;
        if self.cur.x == self.end.x {
            self.cur.x = 0;
            self.cur.y += 1;
        }
        return Some(ret);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn iter_locs_row_major() {
        let locs: Vec<UVec2> = Grid(UVec2::new(3, 2)).iter_locs().collect();
        assert_eq!(
            locs,
            vec![
                UVec2::new(0, 0),
                UVec2::new(1, 0),
                UVec2::new(2, 0),
                UVec2::new(0, 1),
                UVec2::new(1, 1),
                UVec2::new(2, 1),
            ]
        );
    }

    #[test]
    fn empty_grid_has_no_locs() {
        assert_eq!(Grid(UVec2::new(0, 4)).iter_locs().count(), 0);
        assert_eq!(Grid(UVec2::new(4, 0)).iter_locs().count(), 0);
    }

    #[test]
    fn tile_grid_area() {
        let grid = Grid::of_tiles((32u32, 16u32));
        assert_eq!(*grid, UVec2::new(4, 2));
        assert_eq!(grid.area(), 8);
    }
}
