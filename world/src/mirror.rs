//! Mirror synchronisation helpers and an in-memory mirror.

use torus_life_core::{CellCoord, CellMirror, GridSize, DEAD};

use crate::life::Life;

/// Copies the whole current generation into the mirror.
pub(crate) fn sync_all<M: CellMirror>(life: &Life, mirror: &mut M) {
    mirror.write_all(life.cells());
}

/// Copies a single cell into the mirror.
pub(crate) fn sync_cell<M: CellMirror>(life: &Life, mirror: &mut M, cell: CellCoord) {
    mirror.write_cell(cell, life.at(cell.column(), cell.row()));
}

/// Reallocates the mirror for the grid's dimensions and fills it.
pub(crate) fn reallocate<M: CellMirror>(life: &Life, mirror: &mut M) {
    mirror.reallocate(life.size(), life.cells());
}

/// CPU-side mirror that keeps a byte copy of the grid.
///
/// Used by headless runs and tests; it also counts how it was updated so
/// callers can verify the synchronisation pattern.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ByteMirror {
    size: Option<GridSize>,
    cells: Vec<u8>,
    full_writes: usize,
    cell_writes: usize,
    reallocations: usize,
}

impl ByteMirror {
    /// Creates an empty mirror with no storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dimensions of the mirrored grid, if storage was allocated.
    #[must_use]
    pub const fn size(&self) -> Option<GridSize> {
        self.size
    }

    /// Mirrored cell bytes, row-major with row zero at the bottom.
    #[must_use]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Reports whether the mirrored cell is alive.
    #[must_use]
    pub fn is_alive(&self, cell: CellCoord) -> bool {
        self.size
            .and_then(|size| size.index(cell))
            .and_then(|index| self.cells.get(index))
            .is_some_and(|&value| value != DEAD)
    }

    /// Number of whole-grid writes received.
    #[must_use]
    pub const fn full_writes(&self) -> usize {
        self.full_writes
    }

    /// Number of single-cell writes received.
    #[must_use]
    pub const fn cell_writes(&self) -> usize {
        self.cell_writes
    }

    /// Number of reallocations received.
    #[must_use]
    pub const fn reallocations(&self) -> usize {
        self.reallocations
    }
}

impl CellMirror for ByteMirror {
    fn reallocate(&mut self, size: GridSize, cells: &[u8]) {
        self.size = Some(size);
        self.cells = cells.to_vec();
        self.reallocations += 1;
    }

    fn write_all(&mut self, cells: &[u8]) {
        self.cells.clear();
        self.cells.extend_from_slice(cells);
        self.full_writes += 1;
    }

    fn write_cell(&mut self, cell: CellCoord, value: u8) {
        let Some(index) = self.size.and_then(|size| size.index(cell)) else {
            return;
        };
        if let Some(slot) = self.cells.get_mut(index) {
            *slot = value;
            self.cell_writes += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{reallocate, sync_all, sync_cell, ByteMirror};
    use crate::life::Life;
    use torus_life_core::{CellCoord, GridSize, ALIVE};

    #[test]
    fn helpers_keep_the_mirror_equal_to_the_grid() {
        let mut life = Life::new(GridSize::new(4, 3).expect("valid size"));
        let mut mirror = ByteMirror::new();
        reallocate(&life, &mut mirror);
        assert_eq!(mirror.cells(), life.cells());
        assert_eq!(mirror.reallocations(), 1);

        *life.at_mut(2, 1) = ALIVE;
        sync_cell(&life, &mut mirror, CellCoord::new(2, 1));
        assert!(mirror.is_alive(CellCoord::new(2, 1)));
        assert_eq!(mirror.cell_writes(), 1);

        life.clear();
        sync_all(&life, &mut mirror);
        assert_eq!(mirror.cells(), life.cells());
        assert_eq!(mirror.full_writes(), 1);
    }

    #[test]
    fn cell_writes_before_allocation_are_ignored() {
        let mut mirror = ByteMirror::new();
        torus_life_core::CellMirror::write_cell(&mut mirror, CellCoord::new(0, 0), ALIVE);
        assert!(mirror.cells().is_empty());
        assert_eq!(mirror.cell_writes(), 0);
        assert!(!mirror.is_alive(CellCoord::new(0, 0)));
    }
}
