//! C++ struct literals consumed by the PPU466 loader.

use std::fmt::{self, Display, Formatter};

use crate::{
    background::Background, palette::Palette, sprite::Sprite, tile::Tile, Asset,
    BACKGROUND_WIDTH,
};

pub const INCLUDES: [&str; 2] = ["<glm/gtc/type_ptr.hpp>", "\"PPU466.hpp\""];

struct PaletteBlock<'a>(&'a Palette);

impl Display for PaletteBlock<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "  PPU466::Palette color = {{")?;
        for [r, g, b, a] in self.0.entries() {
            writeln!(f, "    glm::u8vec4({},{},{},{}),", r, g, b, a)?;
        }
        writeln!(f, "  }};")
    }
}

struct TileBlock<'a>(&'a [Tile]);

impl Display for TileBlock<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "  uint8_t tile_inds[{}][64] = {{", self.0.len())?;
        for tile in self.0 {
            write!(f, "    {{")?;
            write_joined(f, tile.iter())?;
            writeln!(f, "}},")?;
        }
        writeln!(f, "  }};")
    }
}

fn write_joined<'a>(f: &mut Formatter<'_>, values: impl Iterator<Item = &'a u8>) -> fmt::Result {
    for (i, value) in values.enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{}", value)?;
    }
    return Ok(());
}

impl Display for Sprite {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "struct {} {{", self.name)?;
        write!(f, "{}", PaletteBlock(&self.palette))?;
        write!(f, "{}", TileBlock(&self.tiles))?;
        writeln!(f, "}};")?;
        writeln!(f)
    }
}

impl Display for Background {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "struct {} {{", self.name)?;
        write!(f, "{}", PaletteBlock(&self.palette))?;
        writeln!(f, "  uint32_t tileCount = {};", self.tile_count())?;
        write!(f, "{}", TileBlock(self.tiles.tiles()))?;
        writeln!(f, "  uint8_t backgroundTileNum[64 * 60] = {{")?;
        for row in self.tile_map.chunks(BACKGROUND_WIDTH as usize) {
            write!(f, "    ")?;
            for id in row {
                write!(f, "{},", id)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "  }};")?;
        writeln!(f, "}};")
    }
}

impl Display for Asset {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Sprite(sprite) => Display::fmt(sprite, f),
            Asset::Background(background) => Display::fmt(background, f),
        }
    }
}

/// A complete generated header holding every asset in order
pub struct Header<'a>(pub &'a [Asset]);

impl Display for Header<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for include in INCLUDES {
            writeln!(f, "#include {}", include)?;
        }
        for asset in self.0 {
            write!(f, "{}", asset)?;
        }
        return Ok(());
    }
}

pub fn render_header(assets: &[Asset]) -> String {
    return Header(assets).to_string();
}
