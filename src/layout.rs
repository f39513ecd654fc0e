use log::info;

use crate::{
    error::{AssetError, Result},
    Asset,
};

/// Entries in the PPU tile table
pub const TILE_TABLE_LEN: usize = 256;
/// The loader keeps the last two entries for its barrier and blank tiles
pub const RESERVED_TILES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub name: String,
    /// first tile table entry used by the asset
    pub base: usize,
    pub len: usize,
}

/// Where each asset's tiles land when loaded back to back into the PPU
/// tile table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileTable {
    pub slots: Vec<Slot>,
}

impl TileTable {
    pub fn allocate(assets: &[Asset]) -> Result<Self> {
        let available = TILE_TABLE_LEN - RESERVED_TILES;
        let mut slots = Vec::with_capacity(assets.len());
        let mut base = 0;
        for asset in assets {
            let len = asset.tile_count();
            info!("{}: tiles {}..{}", asset.name(), base, base + len);
            slots.push(Slot {
                name: asset.name().to_owned(),
                base,
                len,
            });
            base += len;
        }
        if base > available {
            return Err(AssetError::TileTableOverflow {
                needed: base,
                available,
            });
        }
        return Ok(Self { slots });
    }

    pub fn used(&self) -> usize {
        return self.slots.last().map_or(0, |slot| slot.base + slot.len);
    }

    pub fn base_of(&self, name: &str) -> Option<usize> {
        return self
            .slots
            .iter()
            .find(|slot| slot.name == name)
            .map(|slot| slot.base);
    }
}
