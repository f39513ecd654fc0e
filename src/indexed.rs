use glam::UVec2;
use image::RgbaImage;

use crate::{
    error::{AssetError, Result},
    palette::{Palette, TRANSPARENT_INDEX},
    tile::Tile,
    Grid, TILE_PIXELS, TILE_SIZE,
};

/// Palette indices of an image in row major order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedImage {
    width: u32,
    height: u32,
    indices: Vec<u8>,
}

impl IndexedImage {
    /// Fails unless there is exactly one index per pixel
    pub fn new(width: u32, height: u32, indices: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if indices.len() != expected {
            return Err(AssetError::IndexCount {
                expected,
                actual: indices.len(),
            });
        }
        return Ok(Self {
            width,
            height,
            indices,
        });
    }

    pub fn filled(width: u32, height: u32, index: u8) -> Self {
        return Self {
            width,
            height,
            indices: vec![index; width as usize * height as usize],
        };
    }

    pub fn width(&self) -> u32 {
        return self.width;
    }

    pub fn height(&self) -> u32 {
        return self.height;
    }

    pub fn dimensions(&self) -> UVec2 {
        return UVec2::new(self.width, self.height);
    }

    pub fn indices(&self) -> &[u8] {
        return &self.indices;
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        return self.indices[(y * self.width + x) as usize];
    }

    pub fn set(&mut self, x: u32, y: u32, index: u8) {
        self.indices[(y * self.width + x) as usize] = index;
    }

    /// Whole tiles covering the image, partial tiles at the edges are ignored
    pub fn tile_grid(&self) -> Grid {
        return Grid::of_tiles(self.dimensions());
    }

    /// Pixel origins of every whole tile in row major order
    pub fn tile_locs(&self) -> impl Iterator<Item = UVec2> {
        return self.tile_grid().iter_locs().map(|loc| loc * TILE_SIZE);
    }

    /// The tile whose top left pixel is `loc`
    pub fn tile_at(&self, loc: UVec2) -> Tile {
        let mut pixels = [0; TILE_PIXELS];
        for (i, offset) in Grid(UVec2::splat(TILE_SIZE)).iter_locs().enumerate() {
            let p = loc + offset;
            pixels[i] = self.get(p.x, p.y);
        }
        return Tile(pixels);
    }

    /// Nearest neighbour downscale by `scale` followed by an upscale back to
    /// the original size. Pixels past the last whole block are transparent.
    pub fn pixelate(&self, scale: u32) -> IndexedImage {
        if scale <= 1 {
            return self.clone();
        }
        let mut out = IndexedImage::filled(self.width, self.height, TRANSPARENT_INDEX);
        let blocks = Grid(self.dimensions() / scale);
        for block in blocks.iter_locs() {
            let origin = block * scale;
            let index = self.get(origin.x, origin.y);
            for offset in Grid(UVec2::splat(scale)).iter_locs() {
                let p = origin + offset;
                out.set(p.x, p.y, index);
            }
        }
        return out;
    }

    pub fn to_rgba(&self, palette: &Palette) -> RgbaImage {
        return RgbaImage::from_fn(self.width, self.height, |x, y| {
            palette.rgba(self.get(x, y))
        });
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ramp(width: u32, height: u32) -> IndexedImage {
        let indices = (0..width * height).map(|i| ((i % width + i / width) % 3) as u8).collect();
        return IndexedImage::new(width, height, indices).unwrap();
    }

    #[test]
    fn wrong_index_count_rejected() {
        assert!(matches!(
            IndexedImage::new(8, 8, vec![0; 63]),
            Err(AssetError::IndexCount {
                expected: 64,
                actual: 63
            })
        ));
        assert!(IndexedImage::new(8, 8, vec![0; 64]).is_ok());
    }

    #[test]
    fn tile_locs_row_major() {
        let image = IndexedImage::filled(16, 24, 0);
        let locs: Vec<UVec2> = image.tile_locs().collect();
        assert_eq!(locs.len(), 6);
        assert_eq!(locs[0], UVec2::new(0, 0));
        assert_eq!(locs[1], UVec2::new(8, 0));
        assert_eq!(locs[2], UVec2::new(0, 8));
        assert_eq!(locs[5], UVec2::new(8, 16));
    }

    #[test]
    fn tile_at_reads_rows() {
        let image = ramp(16, 16);
        let tile = image.tile_at(UVec2::new(8, 0));
        assert_eq!(tile[0], image.get(8, 0));
        assert_eq!(tile[1], image.get(9, 0));
        assert_eq!(tile[8], image.get(8, 1));
        assert_eq!(tile[63], image.get(15, 7));
    }

    #[test]
    fn pixelate_fills_blocks() {
        let image = ramp(16, 16);
        let out = image.pixelate(4);
        for y in 0..16 {
            for x in 0..16 {
                assert_eq!(out.get(x, y), image.get(x / 4 * 4, y / 4 * 4));
            }
        }
    }

    #[test]
    fn pixelate_leftover_is_transparent() {
        let image = IndexedImage::filled(24, 8, 1);
        let out = image.pixelate(16);
        assert_eq!(out.get(0, 0), TRANSPARENT_INDEX);
        assert!(out.indices().iter().all(|&i| i == TRANSPARENT_INDEX));

        let image = IndexedImage::filled(24, 16, 1);
        let out = image.pixelate(16);
        assert_eq!(out.get(15, 15), 1);
        assert_eq!(out.get(16, 0), TRANSPARENT_INDEX);
    }

    #[test]
    fn pixelate_by_one_is_identity() {
        let image = ramp(8, 8);
        assert_eq!(image.pixelate(1), image);
    }
}
