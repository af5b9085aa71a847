use rayon::prelude::*;

use crate::coords::{from_index, CellCoordinate, GridDimensions};

/// A row-major grid of per-cell values, indexed the same way as map cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    dims: GridDimensions,
    data: Vec<T>,
}

impl<T> Tilemap<T> {
    /// Build a tilemap by evaluating `f` for every cell on the rayon pool.
    ///
    /// `f` receives the cell index and its coordinate; results land in index order
    /// regardless of which worker computed them.
    pub fn par_from_fn<F>(dims: GridDimensions, f: F) -> Self
    where
        T: Send,
        F: Fn(u32, CellCoordinate) -> T + Sync + Send,
    {
        let width = dims.width;
        let data = (0..dims.cell_count() as u32)
            .into_par_iter()
            .map(|index| f(index, from_index(index, width)))
            .collect();
        Self { dims, data }
    }

    pub fn dimensions(&self) -> GridDimensions {
        self.dims
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl Tilemap<f64> {
    /// Smallest and largest value in the map, computed as a parallel reduction.
    /// Returns `None` for an empty map.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        if self.data.is_empty() {
            return None;
        }
        let extrema = self
            .data
            .par_iter()
            .fold(
                || (f64::INFINITY, f64::NEG_INFINITY),
                |(lo, hi), &v| (lo.min(v), hi.max(v)),
            )
            .reduce(
                || (f64::INFINITY, f64::NEG_INFINITY),
                |(a_lo, a_hi), (b_lo, b_hi)| (a_lo.min(b_lo), a_hi.max(b_hi)),
            );
        Some(extrema)
    }
}
