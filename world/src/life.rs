//! Double-buffered Game of Life grid living on a torus.

use torus_life_core::{CellCoord, GridSize, ALIVE, DEAD};

/// Cell state for a toroidal grid with a scratch buffer for the next generation.
///
/// Cells are stored row-major with row zero at the bottom. Neighbour lookups
/// wrap around both axes, so the grid has no edges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Life {
    size: GridSize,
    current: Vec<u8>,
    next: Vec<u8>,
}

impl Life {
    /// Allocates an all-dead grid of the requested dimensions.
    #[must_use]
    pub fn new(size: GridSize) -> Self {
        let len = size.cell_count();
        Self {
            size,
            current: vec![DEAD; len],
            next: vec![DEAD; len],
        }
    }

    /// Dimensions of the grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Current generation, row-major, one byte per cell.
    #[must_use]
    pub fn cells(&self) -> &[u8] {
        &self.current
    }

    /// Kills every cell.
    pub fn clear(&mut self) {
        self.current.fill(DEAD);
    }

    /// Returns the state byte of the cell at column `x`, row `y`.
    ///
    /// # Panics
    ///
    /// Panics when the coordinate lies outside the grid.
    #[must_use]
    pub fn at(&self, x: u32, y: u32) -> u8 {
        self.current[self.index(x, y)]
    }

    /// Mutable access to the state byte of the cell at column `x`, row `y`.
    ///
    /// # Panics
    ///
    /// Panics when the coordinate lies outside the grid.
    pub fn at_mut(&mut self, x: u32, y: u32) -> &mut u8 {
        let index = self.index(x, y);
        &mut self.current[index]
    }

    /// Reports whether the cell is alive.
    #[must_use]
    pub fn is_alive(&self, cell: CellCoord) -> bool {
        self.at(cell.column(), cell.row()) != DEAD
    }

    /// Number of live cells in the current generation.
    #[must_use]
    pub fn population(&self) -> usize {
        self.current.iter().filter(|&&cell| cell != DEAD).count()
    }

    /// Counts live cells among the eight toroidal neighbours of `(x, y)`.
    #[must_use]
    pub fn live_neighbours(&self, x: u32, y: u32) -> u8 {
        let width = self.size.columns();
        let height = self.size.rows();
        let left = wrap_decrement(x, width);
        let right = wrap_increment(x, width);
        let below = wrap_decrement(y, height);
        let above = wrap_increment(y, height);

        [
            (left, below),
            (x, below),
            (right, below),
            (left, y),
            (right, y),
            (left, above),
            (x, above),
            (right, above),
        ]
        .into_iter()
        .map(|(column, row)| self.at(column, row))
        .sum()
    }

    /// Computes the next generation.
    ///
    /// Every cell reads only the current buffer and writes only the scratch
    /// buffer; the two are swapped once all cells are written.
    pub fn step(&mut self) {
        for y in 0..self.size.rows() {
            for x in 0..self.size.columns() {
                let index = self.index(x, y);
                let neighbours = self.live_neighbours(x, y);
                let survives = if self.current[index] != DEAD {
                    neighbours == 2 || neighbours == 3
                } else {
                    neighbours == 3
                };
                self.next[index] = if survives { ALIVE } else { DEAD };
            }
        }

        std::mem::swap(&mut self.current, &mut self.next);
    }

    /// Builds an all-dead grid of `size` and copies the overlap with this grid
    /// into it.
    ///
    /// Columns are copied from zero. Rows are anchored at the high end: the
    /// last `overlap` rows of the source land in the last `overlap` rows of
    /// the destination.
    #[must_use]
    pub fn resized(&self, size: GridSize) -> Self {
        let mut resized = Self::new(size);

        let copy_width = self.size.columns().min(size.columns());
        let copy_height = self.size.rows().min(size.rows());
        let source_row = self.size.rows() - copy_height;
        let destination_row = size.rows() - copy_height;

        for y in 0..copy_height {
            for x in 0..copy_width {
                *resized.at_mut(x, destination_row + y) = self.at(x, source_row + y);
            }
        }

        resized
    }

    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(
            x < self.size.columns() && y < self.size.rows(),
            "cell ({x}, {y}) outside {}x{} grid",
            self.size.columns(),
            self.size.rows()
        );
        y as usize * self.size.columns() as usize + x as usize
    }
}

// Neighbour offsets never exceed one, so a single conditional wrap suffices.
fn wrap_decrement(index: u32, length: u32) -> u32 {
    if index == 0 {
        length - 1
    } else {
        index - 1
    }
}

fn wrap_increment(index: u32, length: u32) -> u32 {
    if index + 1 >= length {
        0
    } else {
        index + 1
    }
}

#[cfg(test)]
mod tests {
    use super::{wrap_decrement, wrap_increment, Life};
    use torus_life_core::{GridSize, ALIVE, DEAD};

    fn grid(columns: u32, rows: u32) -> Life {
        Life::new(GridSize::new(columns, rows).expect("valid size"))
    }

    fn live_cells(life: &Life) -> Vec<(u32, u32)> {
        let size = life.size();
        let mut cells = Vec::new();
        for y in 0..size.rows() {
            for x in 0..size.columns() {
                if life.at(x, y) == ALIVE {
                    cells.push((x, y));
                }
            }
        }
        cells
    }

    #[test]
    fn wrap_helpers_only_touch_the_edges() {
        assert_eq!(wrap_decrement(0, 5), 4);
        assert_eq!(wrap_decrement(3, 5), 2);
        assert_eq!(wrap_increment(4, 5), 0);
        assert_eq!(wrap_increment(2, 5), 3);
    }

    #[test]
    fn new_grid_is_dead_and_sized() {
        let life = grid(7, 4);
        assert_eq!(life.cells().len(), 28);
        assert!(life.cells().iter().all(|&cell| cell == DEAD));
        assert_eq!(life.population(), 0);
    }

    #[test]
    fn corner_cell_is_seen_by_every_cell_of_a_three_by_three_torus() {
        let mut life = grid(3, 3);
        *life.at_mut(0, 0) = ALIVE;

        for y in 0..3 {
            for x in 0..3 {
                if (x, y) == (0, 0) {
                    assert_eq!(life.live_neighbours(x, y), 0);
                } else {
                    assert_eq!(
                        life.live_neighbours(x, y),
                        1,
                        "cell ({x}, {y}) should see the wrapped corner exactly once"
                    );
                }
            }
        }

        life.step();
        assert_eq!(life.population(), 0, "a lone cell dies of underpopulation");
    }

    #[test]
    fn opposite_edges_give_birth_to_the_far_corner() {
        let mut life = grid(5, 5);
        *life.at_mut(0, 0) = ALIVE;
        *life.at_mut(4, 0) = ALIVE;
        *life.at_mut(0, 4) = ALIVE;

        assert_eq!(life.live_neighbours(4, 4), 3);

        life.step();
        assert_eq!(life.at(4, 4), ALIVE);
    }

    #[test]
    fn block_is_a_still_life() {
        let mut life = grid(8, 8);
        for (x, y) in [(3, 3), (4, 3), (3, 4), (4, 4)] {
            *life.at_mut(x, y) = ALIVE;
        }
        let initial = live_cells(&life);

        for y in 0..8 {
            for x in 0..8 {
                let neighbours = life.live_neighbours(x, y);
                if life.at(x, y) == ALIVE {
                    assert_eq!(neighbours, 3, "live block cell ({x}, {y})");
                } else {
                    assert_ne!(neighbours, 3, "dead cell ({x}, {y}) must not be born");
                }
            }
        }

        for _ in 0..25 {
            life.step();
            assert_eq!(live_cells(&life), initial);
        }
    }

    #[test]
    fn blinker_has_period_two() {
        let mut life = grid(5, 5);
        for x in 1..=3 {
            *life.at_mut(x, 2) = ALIVE;
        }
        let horizontal = live_cells(&life);

        life.step();
        assert_eq!(live_cells(&life), vec![(2, 1), (2, 2), (2, 3)]);

        life.step();
        assert_eq!(live_cells(&life), horizontal);
    }

    #[test]
    fn glider_returns_to_its_shape_after_crossing_the_seam() {
        let mut life = grid(8, 8);
        // Glider travelling towards +x, -y.
        for (x, y) in [(1, 7), (2, 6), (0, 5), (1, 5), (2, 5)] {
            *life.at_mut(x, y) = ALIVE;
        }
        let initial = live_cells(&life);

        // One diagonal cell every four generations; eight moves wrap an 8x8 torus.
        for _ in 0..32 {
            life.step();
            assert_eq!(life.population(), 5);
        }
        assert_eq!(live_cells(&life), initial);
    }

    #[test]
    fn clear_kills_everything() {
        let mut life = grid(4, 4);
        *life.at_mut(1, 1) = ALIVE;
        *life.at_mut(2, 3) = ALIVE;
        life.clear();
        assert_eq!(life.population(), 0);
    }

    #[test]
    fn shrinking_keeps_the_anchored_window() {
        let mut life = grid(10, 10);
        for y in 0..10 {
            for x in 0..10 {
                if (x * 3 + y * 7) % 4 == 0 {
                    *life.at_mut(x, y) = ALIVE;
                }
            }
        }

        let small = life.resized(GridSize::new(6, 6).expect("valid size"));
        for y in 0..6 {
            for x in 0..6 {
                assert_eq!(small.at(x, y), life.at(x, y + 4), "cell ({x}, {y})");
            }
        }

        let restored = small.resized(GridSize::new(10, 10).expect("valid size"));
        for y in 0..10 {
            for x in 0..10 {
                let expected = if x < 6 && y >= 4 {
                    small.at(x, y - 4)
                } else {
                    DEAD
                };
                assert_eq!(restored.at(x, y), expected, "cell ({x}, {y})");
            }
        }
    }

    #[test]
    fn axes_resize_independently() {
        let mut life = grid(4, 3);
        *life.at_mut(3, 2) = ALIVE;
        *life.at_mut(0, 0) = ALIVE;

        let wider = life.resized(GridSize::new(6, 2).expect("valid size"));
        assert_eq!(wider.size(), GridSize::new(6, 2).expect("valid size"));
        assert_eq!(live_cells(&wider), vec![(3, 1)]);
    }

    #[test]
    #[should_panic]
    fn out_of_range_access_panics() {
        let life = grid(3, 3);
        let _ = life.at(0, 3);
    }
}
