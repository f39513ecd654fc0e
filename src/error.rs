use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AssetError>;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("image is {width}x{height}, both sides must be non-zero multiples of 8")]
    Dimensions { width: u32, height: u32 },

    #[error("background is {cols}x{rows} tiles, the tile map holds at most {max_cols}x{max_rows}")]
    MapOverflow {
        cols: u32,
        rows: u32,
        max_cols: u32,
        max_rows: u32,
    },

    #[error("expected {expected} palette indices, got {actual}")]
    IndexCount { expected: usize, actual: usize },

    #[error("max_tiles must be between 1 and 256, got {0}")]
    TileBudget(usize),

    #[error("assets need {needed} tile table entries but only {available} are free")]
    TileTableOverflow { needed: usize, available: usize },

    #[error("{path}: {source}")]
    Asset {
        path: PathBuf,
        #[source]
        source: Box<AssetError>,
    },
}

impl AssetError {
    /// Attach the path of the asset being converted
    pub fn at(self, path: impl Into<PathBuf>) -> Self {
        return AssetError::Asset {
            path: path.into(),
            source: Box::new(self),
        };
    }
}
