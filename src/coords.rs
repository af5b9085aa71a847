//! Hex grid coordinates.
//!
//! Cells are addressed by column `q` and row `r` in an even-q offset layout:
//! flat-top hexes where every odd column is pushed down by half a row.
//! Storage order is row-major, so the row varies slowest.

use serde::{Deserialize, Serialize};

/// Horizontal distance between neighbouring column centers (sqrt(3) / 2).
pub const COLUMN_SPACING: f64 = 0.866_025_403_784_438_6;

/// Size of a map in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDimensions {
    pub width: u32,
    pub height: u32,
}

impl GridDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of cells (`width * height`).
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn contains(&self, coord: CellCoordinate) -> bool {
        coord.q >= 0
            && coord.r >= 0
            && (coord.q as u32) < self.width
            && (coord.r as u32) < self.height
    }

    /// Extent of the grid in world units, used as the wrap period for toroidal sampling.
    pub fn world_extent(&self) -> (f64, f64) {
        (self.width as f64 * COLUMN_SPACING, self.height as f64)
    }

    /// Iterate over every coordinate in canonical index order.
    pub fn coords(&self) -> impl Iterator<Item = CellCoordinate> {
        let width = self.width;
        (0..self.cell_count() as u32).map(move |index| from_index(index, width))
    }
}

impl std::fmt::Display for GridDimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Column/row address of a single hex cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoordinate {
    /// Column
    pub q: i32,
    /// Row
    pub r: i32,
}

impl CellCoordinate {
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }
}

/// Continuous position on the plane the noise field is sampled from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldPos {
    pub x: f64,
    pub y: f64,
}

/// Project a cell onto the plane so that all six neighbours sit at distance 1.
pub fn to_world_space(coord: CellCoordinate) -> WorldPos {
    WorldPos {
        x: coord.q as f64 * COLUMN_SPACING,
        y: coord.r as f64 + (coord.q & 1) as f64 * 0.5,
    }
}

/// Linear index of a cell: `r * width + q`.
pub fn to_index(coord: CellCoordinate, width: u32) -> u32 {
    coord.r as u32 * width + coord.q as u32
}

/// Inverse of [`to_index`].
pub fn from_index(index: u32, width: u32) -> CellCoordinate {
    CellCoordinate {
        q: (index % width) as i32,
        r: (index / width) as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distance(a: WorldPos, b: WorldPos) -> f64 {
        ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
    }

    #[test]
    fn test_index_bijection() {
        for &(width, height) in &[(1u32, 1u32), (4, 3), (7, 5), (16, 1), (1, 9)] {
            let dims = GridDimensions::new(width, height);
            for index in 0..dims.cell_count() as u32 {
                let coord = from_index(index, width);
                assert!(dims.contains(coord));
                assert_eq!(to_index(coord, width), index);
            }
            for r in 0..height as i32 {
                for q in 0..width as i32 {
                    let coord = CellCoordinate::new(q, r);
                    assert_eq!(from_index(to_index(coord, width), width), coord);
                }
            }
        }
    }

    #[test]
    fn test_row_major_order() {
        assert_eq!(to_index(CellCoordinate::new(3, 0), 4), 3);
        assert_eq!(to_index(CellCoordinate::new(0, 1), 4), 4);
        assert_eq!(from_index(11, 4), CellCoordinate::new(3, 2));
    }

    #[test]
    fn test_coords_iterate_in_index_order() {
        let dims = GridDimensions::new(3, 2);
        let coords: Vec<_> = dims.coords().collect();
        assert_eq!(coords.len(), 6);
        for (i, coord) in coords.iter().enumerate() {
            assert_eq!(to_index(*coord, 3) as usize, i);
        }
    }

    #[test]
    fn test_even_q_stagger() {
        let even = to_world_space(CellCoordinate::new(2, 3));
        let odd = to_world_space(CellCoordinate::new(3, 3));
        assert!((even.y - 3.0).abs() < 1e-12);
        assert!((odd.y - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_neighbours_are_equidistant() {
        // Neighbours of an even and an odd column in even-q layout.
        let cases = [
            (CellCoordinate::new(2, 2), [(0, -1), (0, 1), (-1, 0), (1, 0), (-1, -1), (1, -1)]),
            (CellCoordinate::new(3, 2), [(0, -1), (0, 1), (-1, 0), (1, 0), (-1, 1), (1, 1)]),
        ];
        for (center, offsets) in cases {
            let c = to_world_space(center);
            for (dq, dr) in offsets {
                let n = to_world_space(CellCoordinate::new(center.q + dq, center.r + dr));
                assert!((distance(c, n) - 1.0).abs() < 1e-9, "{:?} -> {:?}", center, (dq, dr));
            }
        }
    }

    #[test]
    fn test_contains() {
        let dims = GridDimensions::new(4, 3);
        assert!(dims.contains(CellCoordinate::new(3, 2)));
        assert!(!dims.contains(CellCoordinate::new(4, 0)));
        assert!(!dims.contains(CellCoordinate::new(0, 3)));
        assert!(!dims.contains(CellCoordinate::new(-1, 0)));
    }
}
