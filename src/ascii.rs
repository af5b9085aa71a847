//! ASCII rendering of maps
//!
//! Text previews for the command line. Odd columns sit half a row lower in the
//! even-q layout, which a character grid cannot show; rows are printed as stored.

use crate::artifact::MapArtifact;
use crate::cell::{grass, Biome, HexCell};
use crate::generation::{quantize_height, MAX_HEIGHT_LEVEL};
use crate::tilemap::Tilemap;

/// ASCII rendering modes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AsciiMode {
    /// Show biome characters
    Biome,
    /// Show quantized height gradient
    Height,
}

impl AsciiMode {
    pub fn name(&self) -> &'static str {
        match self {
            AsciiMode::Biome => "Biome",
            AsciiMode::Height => "Height",
        }
    }
}

/// Get ASCII character for a cell's biome and cosmetic
pub fn cell_char(cell: &HexCell) -> char {
    match cell.biome() {
        Biome::Water => '~',
        Biome::Beach => '.',
        Biome::Grass if cell.cosmetic() == grass::TALL_GRASS => '"',
        Biome::Grass => ',',
        Biome::Forest => 'T',
        Biome::Mountain => '^',
    }
}

/// Get ASCII character for a normalized height
pub fn height_char(h: f64) -> char {
    const CHARS: &[char] = &['~', '.', '-', '=', '+', '*', '#', '%', '^', 'A', 'M'];
    let level = quantize_height(h) as usize;
    let idx = level * (CHARS.len() - 1) / MAX_HEIGHT_LEVEL as usize;
    CHARS[idx.min(CHARS.len() - 1)]
}

/// Render a map as text, one line per row.
///
/// `heights` is only needed for [`AsciiMode::Height`]; without it the biome view is used.
pub fn render_ascii_map(artifact: &MapArtifact, heights: Option<&Tilemap<f64>>, mode: AsciiMode) -> String {
    let dims = artifact.dimensions();
    let width = dims.width as usize;
    let mut result = String::with_capacity((width + 1) * dims.height as usize);

    for (index, cell) in artifact.cells().iter().enumerate() {
        let ch = match (mode, heights) {
            (AsciiMode::Height, Some(h)) => height_char(h.as_slice()[index]),
            _ => cell_char(cell),
        };
        result.push(ch);
        if (index + 1) % width == 0 {
            result.push('\n');
        }
    }

    result
}

/// Legend for [`AsciiMode::Biome`]
pub fn biome_legend() -> String {
    let mut legend = String::from("Legend:\n");
    legend.push_str("  ~ Water\n");
    legend.push_str("  . Beach\n");
    legend.push_str("  , Grass\n");
    legend.push_str("  \" Tall grass\n");
    legend.push_str("  T Forest\n");
    legend.push_str("  ^ Mountain\n");
    legend
}
