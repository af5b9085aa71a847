//! Generated map container
//!
//! Bundles dimensions, seed and the ordered cell array into the single unit that is
//! persisted and served.

use crate::cell::{Biome, HexCell};
use crate::config::MAX_DIMENSION;
use crate::coords::{from_index, to_index, CellCoordinate, GridDimensions};
use crate::error::ArtifactError;

/// A complete generated map. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapArtifact {
    dimensions: GridDimensions,
    seed: String,
    cells: Vec<HexCell>,
}

impl MapArtifact {
    /// Build an artifact, checking that `cells` is exactly the canonical row-major
    /// sequence for `dimensions` and that both dimensions fit the 16-bit wire header.
    pub fn new(
        dimensions: GridDimensions,
        seed: impl Into<String>,
        cells: Vec<HexCell>,
    ) -> Result<Self, ArtifactError> {
        let GridDimensions { width, height } = dimensions;
        if width == 0 || height == 0 {
            return Err(ArtifactError::ZeroDimension { width, height });
        }
        if let Some(value) = [width, height].into_iter().find(|&v| v > MAX_DIMENSION) {
            return Err(ArtifactError::DimensionTooLarge {
                value,
                max: MAX_DIMENSION,
            });
        }
        if cells.len() != dimensions.cell_count() {
            return Err(ArtifactError::CellCount {
                expected: dimensions.cell_count(),
                actual: cells.len(),
            });
        }
        for (index, cell) in cells.iter().enumerate() {
            let expected = from_index(index as u32, width);
            if cell.coord() != expected {
                return Err(ArtifactError::MisplacedCell {
                    index,
                    q: cell.q,
                    r: cell.r,
                    expected_q: expected.q,
                    expected_r: expected.r,
                });
            }
        }
        Ok(Self {
            dimensions,
            seed: seed.into(),
            cells,
        })
    }

    /// Wrap cells already known to be canonical: generated from a validated config
    /// or decoded from a 16-bit header.
    pub(crate) fn from_canonical(dimensions: GridDimensions, seed: String, cells: Vec<HexCell>) -> Self {
        debug_assert_eq!(cells.len(), dimensions.cell_count());
        debug_assert!(dimensions.width <= MAX_DIMENSION && dimensions.height <= MAX_DIMENSION);
        Self {
            dimensions,
            seed,
            cells,
        }
    }

    pub fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn cells(&self) -> &[HexCell] {
        &self.cells
    }

    /// Look up a cell by coordinate. `None` outside the grid.
    pub fn cell(&self, coord: CellCoordinate) -> Option<&HexCell> {
        if !self.dimensions.contains(coord) {
            return None;
        }
        self.cells.get(to_index(coord, self.dimensions.width) as usize)
    }

    /// Number of cells of each biome, in [`Biome::ALL`] order.
    pub fn biome_histogram(&self) -> BiomeHistogram {
        BiomeHistogram::from_cells(&self.cells)
    }
}

/// Cell counts per biome.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BiomeHistogram {
    counts: [usize; 5],
}

impl BiomeHistogram {
    pub fn from_cells(cells: &[HexCell]) -> Self {
        let mut counts = [0usize; 5];
        for cell in cells {
            counts[cell.biome().id() as usize] += 1;
        }
        Self { counts }
    }

    pub fn count(&self, biome: Biome) -> usize {
        self.counts[biome.id() as usize]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Biome, usize)> + '_ {
        Biome::ALL.iter().map(move |&b| (b, self.count(b)))
    }
}

impl std::fmt::Display for BiomeHistogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let total = self.total().max(1) as f64;
        let parts: Vec<String> = self
            .iter()
            .map(|(biome, n)| format!("{} {} ({:.1}%)", biome.name(), n, 100.0 * n as f64 / total))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}
