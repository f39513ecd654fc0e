use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{
    background::{convert_background, BackgroundConfig, DEFAULT_BACKGROUND_NAME},
    emit::render_header,
    error::Result,
    kmeans::DEFAULT_RESTARTS,
    layout::TileTable,
    palette::QuantizeConfig,
    preprocess::load_rgba,
    sprite::{convert_sprite, DEFAULT_SPRITE_NAME},
    Asset,
};

pub const DEFAULT_OUTPUT: &str = "generated_assets.hpp";

fn default_output() -> PathBuf {
    return PathBuf::from(DEFAULT_OUTPUT);
}

fn default_restarts() -> usize {
    return DEFAULT_RESTARTS;
}

fn default_sprite_name() -> String {
    return DEFAULT_SPRITE_NAME.to_owned();
}

fn default_background_name() -> String {
    return DEFAULT_BACKGROUND_NAME.to_owned();
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", deny_unknown_fields)]
pub enum AssetSpec {
    Sprite {
        path: PathBuf,
        #[serde(default = "default_sprite_name")]
        struct_name: String,
    },
    Background {
        path: PathBuf,
        #[serde(default = "default_background_name")]
        struct_name: String,
        max_tiles: Option<usize>,
        flip_x: Option<bool>,
    },
}

impl AssetSpec {
    pub fn path(&self) -> &Path {
        match self {
            AssetSpec::Sprite { path, .. } | AssetSpec::Background { path, .. } => path,
        }
    }

    fn path_mut(&mut self) -> &mut PathBuf {
        match self {
            AssetSpec::Sprite { path, .. } | AssetSpec::Background { path, .. } => path,
        }
    }

    pub fn convert(&self, quantize: &QuantizeConfig) -> Result<Asset> {
        let path = self.path();
        let image = load_rgba(path).map_err(|e| e.at(path))?;
        let asset = match self {
            AssetSpec::Sprite { struct_name, .. } => {
                convert_sprite(image, struct_name, quantize).map(Asset::from)
            }
            AssetSpec::Background {
                struct_name,
                max_tiles,
                flip_x,
                ..
            } => {
                let defaults = BackgroundConfig::default();
                let config = BackgroundConfig {
                    max_tiles: max_tiles.unwrap_or(defaults.max_tiles),
                    flip_x: flip_x.unwrap_or(defaults.flip_x),
                };
                convert_background(image, struct_name, &config, quantize).map(Asset::from)
            }
        };
        return asset.map_err(|e| e.at(path));
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_restarts")]
    pub restarts: usize,
    pub assets: Vec<AssetSpec>,
}

impl Manifest {
    /// Parses a manifest, resolving relative paths against `base_dir`
    pub fn parse(text: &str, base_dir: &Path) -> Result<Self> {
        let mut manifest: Manifest = serde_json::from_str(text)?;
        if manifest.output.is_relative() {
            manifest.output = base_dir.join(&manifest.output);
        }
        for asset in manifest.assets.iter_mut() {
            let path = asset.path_mut();
            if path.is_relative() {
                *path = base_dir.join(&*path);
            }
        }
        return Ok(manifest);
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| crate::AssetError::from(e).at(path))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        return Self::parse(&text, base_dir).map_err(|e| e.at(path));
    }

    pub fn quantize_config(&self) -> QuantizeConfig {
        return QuantizeConfig {
            seed: self.seed,
            restarts: self.restarts,
        };
    }
}

/// Everything produced from one manifest
#[derive(Debug, Clone)]
pub struct Build {
    pub assets: Vec<Asset>,
    pub table: TileTable,
    pub header: String,
}

/// Converts every asset in order and checks they fit the tile table together
pub fn build(specs: &[AssetSpec], quantize: &QuantizeConfig) -> Result<Build> {
    let assets = specs
        .iter()
        .map(|spec| spec.convert(quantize))
        .collect::<Result<Vec<Asset>>>()?;
    let table = TileTable::allocate(&assets)?;
    let header = render_header(&assets);
    return Ok(Build {
        assets,
        table,
        header,
    });
}
