use std::collections::HashMap;

use derive_more::{Deref, DerefMut, From};
use glam::UVec2;

use crate::{indexed::IndexedImage, TILE_PIXELS, TILE_SIZE};

/// A unique identifier for a tile
pub type TileId = usize;

/// A list of type T indexable by TileId
pub type IdMap<T> = Vec<T>;

/// Palette indices of an 8x8 tile, row major from the top left pixel
#[derive(Deref, DerefMut, From, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tile(pub [u8; TILE_PIXELS]);

impl Default for Tile {
    fn default() -> Self {
        return Tile([0; TILE_PIXELS]);
    }
}

/// The two bit planes of a tile as stored in the PPU tile table.
/// Row 0 is the bottom row, bit `b` of a row is the pixel `7 - b` columns
/// in from the left edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bitplanes {
    pub bit0: [u8; 8],
    pub bit1: [u8; 8],
}

impl Bitplanes {
    /// Palette index the PPU reads at column `x`, row `y` from the top left
    pub fn index_at(&self, x: u32, y: u32) -> u8 {
        let row = (TILE_SIZE - 1 - y) as usize;
        let shift = TILE_SIZE - 1 - x;
        return ((self.bit0[row] >> shift) & 1) | (((self.bit1[row] >> shift) & 1) << 1);
    }
}

impl Tile {
    pub fn to_bitplanes(&self) -> Bitplanes {
        let mut planes = Bitplanes::default();
        for (j, &index) in self.0.iter().enumerate() {
            let row = 7 - j / 8;
            let shift = 7 - j % 8;
            planes.bit0[row] |= (index & 1) << shift;
            planes.bit1[row] |= ((index >> 1) & 1) << shift;
        }
        return planes;
    }

}

/// Deduplicated tiles in the order they were first seen
#[derive(Debug, Default, Clone)]
pub struct TileSet {
    tiles: IdMap<Tile>,
    frequencies: IdMap<usize>,
    ids: HashMap<Tile, TileId>,
}

impl TileSet {
    pub fn new() -> Self {
        return Self::default();
    }

    /// Collects the unique tiles of an image
    pub fn from_image(image: &IndexedImage) -> Self {
        let mut set = Self::new();
        for (_, tile) in extract_tiles(image) {
            set.insert(tile);
        }
        return set;
    }

    /// Returns the id of `tile`, adding it if it is new
    pub fn insert(&mut self, tile: Tile) -> TileId {
        if let Some(&id) = self.ids.get(&tile) {
            self.frequencies[id] += 1;
            return id;
        }
        let id = self.tiles.len();
        self.tiles.push(tile);
        self.frequencies.push(1);
        self.ids.insert(tile, id);
        return id;
    }

    pub fn id_of(&self, tile: &Tile) -> Option<TileId> {
        return self.ids.get(tile).copied();
    }

    pub fn len(&self) -> usize {
        return self.tiles.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.tiles.is_empty();
    }

    pub fn tiles(&self) -> &[Tile] {
        return &self.tiles;
    }

    /// How many times each tile occurred in the source image
    pub fn frequencies(&self) -> &[usize] {
        return &self.frequencies;
    }
}

/// Every whole tile of the image paired with its pixel origin, row major
pub fn extract_tiles(image: &IndexedImage) -> Vec<(UVec2, Tile)> {
    return image
        .tile_locs()
        .map(|loc| (loc, image.tile_at(loc)))
        .collect();
}
