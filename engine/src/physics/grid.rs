//! Uniform spatial grid
//!
//! A fixed 3D array of cells covering `0..world_bounds`, rebuilt from
//! scratch at the end of every tick. Each cell lists the handles of bodies
//! whose probe box overlaps it. Positions outside the bounds are clamped
//! into the border cells, never indexed out of range.
//!
//! Rebuilding every tick is fine for tens to low hundreds of bodies.

use glam::Vec3;
use tracing::warn;

use super::body::BodyHandle;

/// Cell coordinate `(x, y, z)`.
pub type CellIndex = [usize; 3];

/// Largest number of cells a grid may allocate.
pub const MAX_GRID_CELLS: usize = 1 << 20;

/// Broad-phase lookup structure over the world volume.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    bounds: Vec3,
    dims: CellIndex,
    cells: Vec<Vec<BodyHandle>>,
}

impl SpatialGrid {
    /// Create an empty grid.
    ///
    /// Parameters rejected by [`SpatialGrid::dimensions_for`] fall back to a
    /// single cell of size `1.0` at the origin.
    pub fn new(cell_size: f32, bounds: Vec3) -> Self {
        let bounds = bounds.max(Vec3::ZERO);
        let (cell_size, bounds, dims) = match Self::dimensions_for(cell_size, bounds) {
            Some(dims) => (cell_size, bounds, dims),
            None => {
                warn!(cell_size, ?bounds, "unusable grid parameters, using a single cell");
                (1.0, Vec3::ZERO, [1, 1, 1])
            }
        };
        let count = dims[0] * dims[1] * dims[2];
        Self {
            cell_size,
            bounds,
            dims,
            cells: vec![Vec::new(); count],
        }
    }

    /// Cells per axis for a grid covering `0..bounds`, or `None` when the
    /// cell size is not positive, a bound is not finite, or the grid would
    /// exceed [`MAX_GRID_CELLS`].
    pub fn dimensions_for(cell_size: f32, bounds: Vec3) -> Option<CellIndex> {
        if !(cell_size > 0.0) || !bounds.is_finite() {
            return None;
        }
        let axis = |extent: f32| {
            let n = (extent.max(0.0) / cell_size).floor();
            (n < MAX_GRID_CELLS as f32).then(|| n as usize + 1)
        };
        let dims = [axis(bounds.x)?, axis(bounds.y)?, axis(bounds.z)?];
        let count = dims[0].checked_mul(dims[1])?.checked_mul(dims[2])?;
        (count <= MAX_GRID_CELLS).then_some(dims)
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn bounds(&self) -> Vec3 {
        self.bounds
    }

    /// Number of cells along each axis.
    pub fn dimensions(&self) -> CellIndex {
        self.dims
    }

    /// Empty every cell, keeping allocations.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    /// Cell containing `position`, clamped to the grid.
    pub fn cell_of(&self, position: Vec3) -> CellIndex {
        [
            self.axis_index(position.x, 0),
            self.axis_index(position.y, 1),
            self.axis_index(position.z, 2),
        ]
    }

    /// Add `handle` to every cell touched by the box `center ± probe_radius`.
    pub fn insert(&mut self, handle: BodyHandle, center: Vec3, probe_radius: f32) {
        let r = Vec3::splat(probe_radius.max(0.0));
        let lo = self.cell_of(center - r);
        let hi = self.cell_of(center + r);
        for x in lo[0]..=hi[0] {
            for y in lo[1]..=hi[1] {
                for z in lo[2]..=hi[2] {
                    let flat = self.flatten([x, y, z]);
                    self.cells[flat].push(handle);
                }
            }
        }
    }

    /// Handles stored in one cell.
    pub fn cell(&self, index: CellIndex) -> &[BodyHandle] {
        let clamped = [
            index[0].min(self.dims[0] - 1),
            index[1].min(self.dims[1] - 1),
            index[2].min(self.dims[2] - 1),
        ];
        &self.cells[self.flatten(clamped)]
    }

    /// Iterate over the non-empty cells.
    pub fn occupied_cells(&self) -> impl Iterator<Item = &[BodyHandle]> {
        self.cells.iter().filter(|c| !c.is_empty()).map(|c| c.as_slice())
    }

    /// Total number of handle entries across all cells.
    pub fn entry_count(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    fn axis_index(&self, coord: f32, axis: usize) -> usize {
        let raw = (coord / self.cell_size).floor();
        if raw.is_nan() || raw < 0.0 {
            0
        } else {
            (raw as usize).min(self.dims[axis] - 1)
        }
    }

    fn flatten(&self, index: CellIndex) -> usize {
        (index[0] * self.dims[1] + index[1]) * self.dims[2] + index[2]
    }
}
