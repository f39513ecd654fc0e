use glam::Vec3;
use image::{Rgba, RgbaImage};
use log::{debug, warn};

use crate::{
    error::Result,
    indexed::IndexedImage,
    kmeans::{self, KMeans, DEFAULT_RESTARTS},
};

/// Opaque colors in a PPU palette, the fourth entry is always transparent
pub const PALETTE_COLORS: usize = 3;
pub const TRANSPARENT_INDEX: u8 = 3;
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Palette {
    pub colors: [[u8; 3]; PALETTE_COLORS],
}

impl Palette {
    /// Truncates cluster centers to 8 bit channels
    pub fn from_centers(centers: &[Vec3]) -> Self {
        let mut colors = [[0; 3]; PALETTE_COLORS];
        for (color, center) in colors.iter_mut().zip(centers) {
            *color = center.to_array().map(|c| c as u8);
        }
        return Self { colors };
    }

    /// The four entries as loaded into the PPU palette table
    pub fn entries(&self) -> [[u8; 4]; 4] {
        let [a, b, c] = self.colors.map(|[r, g, b]| [r, g, b, 255]);
        return [a, b, c, TRANSPARENT];
    }

    pub fn rgba(&self, index: u8) -> Rgba<u8> {
        return Rgba(self.entries()[(index & 0b11) as usize]);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizeConfig {
    pub seed: u64,
    pub restarts: usize,
}

impl Default for QuantizeConfig {
    fn default() -> Self {
        return Self {
            seed: 0,
            restarts: DEFAULT_RESTARTS,
        };
    }
}

impl QuantizeConfig {
    pub fn kmeans(&self) -> KMeans {
        return KMeans::new(PALETTE_COLORS)
            .with_seed(self.seed)
            .with_restarts(self.restarts);
    }
}

/// An image reduced to palette indices along with its palette
#[derive(Debug, Clone)]
pub struct Quantized {
    pub palette: Palette,
    pub image: IndexedImage,
}

fn rgb_of(pixel: &Rgba<u8>) -> Vec3 {
    let [r, g, b, _] = pixel.0;
    return Vec3::new(r as f32, g as f32, b as f32);
}

/// Clusters the opaque pixels into three colors and maps every pixel onto
/// the nearest one. Pixels with zero alpha map to the transparent entry.
pub fn quantize(image: &RgbaImage, config: &QuantizeConfig) -> Result<Quantized> {
    let opaque: Vec<Vec3> = image
        .pixels()
        .filter(|p| p[3] > 0)
        .map(rgb_of)
        .collect();

    let centers = config.kmeans().fit(&opaque);
    if centers.is_empty() {
        warn!("image has no opaque pixels, palette left black");
    }
    let palette = Palette::from_centers(&centers);
    debug!("palette: {:?}", palette.colors);

    let indices = image
        .pixels()
        .map(|p| {
            if p[3] == 0 {
                TRANSPARENT_INDEX
            } else {
                kmeans::nearest(&centers, rgb_of(p)) as u8
            }
        })
        .collect();
    let (width, height) = image.dimensions();
    return Ok(Quantized {
        palette,
        image: IndexedImage::new(width, height, indices)?,
    });
}

#[cfg(test)]
mod test {
    use super::*;

    const RED: [u8; 4] = [250, 10, 10, 255];
    const GREEN: [u8; 4] = [10, 250, 10, 255];
    const BLUE: [u8; 4] = [10, 10, 250, 255];

    fn stripes() -> RgbaImage {
        return RgbaImage::from_fn(8, 8, |x, _| match x {
            0..=1 => Rgba(RED),
            2..=3 => Rgba(GREEN),
            4..=5 => Rgba(BLUE),
            _ => Rgba(TRANSPARENT),
        });
    }

    #[test]
    fn exact_colors_survive() {
        let q = quantize(&stripes(), &QuantizeConfig::default()).unwrap();
        let mut colors = q.palette.colors.to_vec();
        colors.sort();
        let mut expected = vec![[250, 10, 10], [10, 250, 10], [10, 10, 250]];
        expected.sort();
        assert_eq!(colors, expected);

        for x in 0..8 {
            let index = q.image.get(x, 3);
            if x >= 6 {
                assert_eq!(index, TRANSPARENT_INDEX);
            } else {
                assert_eq!(q.palette.rgba(index), *stripes().get_pixel(x, 3));
            }
        }
    }

    #[test]
    fn near_colors_snap_to_cluster() {
        let mut image = stripes();
        image.put_pixel(0, 0, Rgba([245, 12, 8, 255]));
        let q = quantize(&image, &QuantizeConfig::default()).unwrap();
        assert_eq!(q.image.get(0, 0), q.image.get(1, 0));
    }

    #[test]
    fn transparent_image_is_all_transparent() {
        let image = RgbaImage::from_pixel(8, 8, Rgba(TRANSPARENT));
        let q = quantize(&image, &QuantizeConfig::default()).unwrap();
        assert_eq!(q.palette, Palette::default());
        assert!(q.image.indices().iter().all(|&i| i == TRANSPARENT_INDEX));
    }

    #[test]
    fn default_config_restarts_ten_times() {
        let config = QuantizeConfig::default();
        assert_eq!(config.restarts, 10);
        assert_eq!(config.kmeans().restarts, 10);
        assert_eq!(config.kmeans().k, PALETTE_COLORS);
    }

    #[test]
    fn centers_truncate() {
        let palette = Palette::from_centers(&[
            Vec3::new(10.9, 0.2, 254.99),
            Vec3::ZERO,
            Vec3::splat(255.0),
        ]);
        assert_eq!(palette.colors[0], [10, 0, 254]);
        assert_eq!(palette.entries()[3], TRANSPARENT);
        assert_eq!(palette.entries()[2], [255, 255, 255, 255]);
    }
}
