#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Torus Life engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then reports [`Event`] values
//! describing what actually changed. Presentation layers never read the
//! world's cell buffers directly; they consume a [`CellMirror`] that the world
//! keeps synchronised after every mutation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Title used by the window that hosts both views.
pub const WINDOW_TITLE: &str = "Game Of Life";

/// Byte stored for a dead cell in grid buffers and mirrors.
pub const DEAD: u8 = 0;

/// Byte stored for a live cell in grid buffers and mirrors.
pub const ALIVE: u8 = 1;

/// Grid dimensions used when nothing else is configured.
pub const DEFAULT_GRID_SIZE: GridSize = GridSize {
    columns: 50,
    rows: 50,
};

/// Simulation frequency used when nothing else is configured.
pub const DEFAULT_STEPS_PER_SECOND: f32 = 5.0;

/// Smallest simulation frequency accepted; lower requests clamp to this value.
pub const MIN_STEPS_PER_SECOND: f32 = 0.0001;

/// Upper bound on grid steps executed by a single tick.
pub const MAX_CATCH_UP_STEPS: u32 = 240;

/// Longest frame delta adapters may forward to the simulation in one tick.
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

/// Describes whether the simulation advances with wall-clock time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Time does not advance the grid; only explicit steps do.
    #[default]
    Paused,
    /// Elapsed time is converted into grid steps at a fixed frequency.
    Running,
}

impl PlaybackState {
    /// Returns the opposite state.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Paused => Self::Running,
            Self::Running => Self::Paused,
        }
    }

    /// Reports whether the state is [`PlaybackState::Running`].
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Flips between paused and running playback.
    ToggleRun,
    /// Executes exactly one grid step regardless of the playback state.
    StepOnce,
    /// Kills every cell.
    Clear,
    /// Flips the state of a single cell.
    ToggleCell {
        /// Cell whose state should flip.
        cell: CellCoord,
    },
    /// Replaces the grid with one of the requested dimensions, keeping the
    /// anchored overlap. A request for the current dimensions is ignored.
    Resize {
        /// Dimensions of the replacement grid.
        size: GridSize,
    },
    /// Changes the fixed simulation frequency.
    SetStepsPerSecond {
        /// Requested frequency; non-positive values clamp to
        /// [`MIN_STEPS_PER_SECOND`].
        steps_per_second: f32,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Wall-clock time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that playback switched state.
    PlaybackChanged {
        /// State that became active.
        state: PlaybackState,
    },
    /// Confirms the frequency that is now in effect after clamping.
    SpeedChanged {
        /// Effective steps per second.
        steps_per_second: f32,
    },
    /// Reports that one or more generations were computed.
    GenerationAdvanced {
        /// Number of grid steps executed by the command.
        steps: u32,
        /// Generation counter after the last executed step.
        generation: u64,
    },
    /// Reports that a tick hit the catch-up cap and left time owed.
    CatchUpLimited {
        /// Number of steps executed before the cap stopped the loop.
        steps: u32,
        /// Simulated time still owed to the next tick.
        backlog: Duration,
    },
    /// Confirms that every cell was killed.
    Cleared,
    /// Confirms that a single cell flipped.
    CellToggled {
        /// Cell that flipped.
        cell: CellCoord,
        /// Whether the cell is alive after the flip.
        alive: bool,
    },
    /// Reports that a toggle request addressed a cell outside the grid.
    CellToggleRejected {
        /// Cell provided in the request.
        cell: CellCoord,
    },
    /// Confirms that the grid was replaced with new dimensions.
    GridResized {
        /// Dimensions before the resize.
        from: GridSize,
        /// Dimensions after the resize.
        to: GridSize,
    },
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Row zero is the bottom row of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell, counted from the bottom.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Dimensions of a grid measured in whole cells. Both axes are positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridSize {
    columns: u32,
    rows: u32,
}

impl GridSize {
    /// Creates a size descriptor, returning `None` when either axis is zero.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Option<Self> {
        if columns == 0 || rows == 0 {
            None
        } else {
            Some(Self { columns, rows })
        }
    }

    /// Number of columns (grid width).
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows (grid height).
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of cells covered by the grid.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column < self.columns && cell.row < self.rows
    }

    /// Row-major buffer index of the cell, or `None` when it lies outside.
    #[must_use]
    pub const fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            Some(cell.row as usize * self.columns as usize + cell.column as usize)
        } else {
            None
        }
    }
}

/// Axis-aligned screen rectangle in window pixels, origin at the top-left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Left edge in window coordinates.
    pub x: f32,
    /// Top edge in window coordinates.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Viewport {
    /// Creates a new viewport rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Reports whether the rectangle has a positive area.
    #[must_use]
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Reports whether the point lies inside the half-open rectangle.
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Presentation-facing copy of the grid, one byte per cell (0 or 1),
/// row-major with row zero at the bottom.
///
/// The world calls these hooks synchronously after each mutation, so a
/// mirror never observes an intermediate generation.
pub trait CellMirror {
    /// Discards the current contents and allocates storage for `size`,
    /// initialised from `cells`.
    fn reallocate(&mut self, size: GridSize, cells: &[u8]);

    /// Overwrites the whole mirror with `cells`. The dimensions are unchanged.
    fn write_all(&mut self, cells: &[u8]);

    /// Overwrites a single cell.
    fn write_cell(&mut self, cell: CellCoord, value: u8);
}

#[cfg(test)]
mod tests {
    use super::{CellCoord, GridSize, PlaybackState, Viewport};
    use serde::Deserialize;

    #[test]
    fn grid_size_rejects_zero_axes() {
        assert!(GridSize::new(0, 4).is_none());
        assert!(GridSize::new(4, 0).is_none());
        assert!(GridSize::new(1, 1).is_some());
    }

    #[test]
    fn grid_index_is_row_major() {
        let size = GridSize::new(4, 3).expect("valid size");
        assert_eq!(size.index(CellCoord::new(0, 0)), Some(0));
        assert_eq!(size.index(CellCoord::new(3, 0)), Some(3));
        assert_eq!(size.index(CellCoord::new(1, 2)), Some(9));
        assert_eq!(size.index(CellCoord::new(4, 0)), None);
        assert_eq!(size.index(CellCoord::new(0, 3)), None);
        assert_eq!(size.cell_count(), 12);
    }

    #[test]
    fn playback_state_toggles() {
        assert_eq!(PlaybackState::default(), PlaybackState::Paused);
        assert_eq!(PlaybackState::Paused.toggled(), PlaybackState::Running);
        assert!(PlaybackState::Paused.toggled().is_running());
        assert!(!PlaybackState::Running.toggled().is_running());
    }

    #[test]
    fn playback_state_reads_lowercase_names() {
        #[derive(Deserialize)]
        struct Section {
            state: PlaybackState,
        }

        let section: Section = toml::from_str("state = \"running\"").expect("parse");
        assert_eq!(section.state, PlaybackState::Running);
        assert!(toml::from_str::<Section>("state = \"Sprinting\"").is_err());
    }

    #[test]
    fn viewport_contains_is_half_open() {
        let viewport = Viewport::new(10.0, 20.0, 100.0, 50.0);
        assert!(viewport.contains(10.0, 20.0));
        assert!(viewport.contains(109.9, 69.9));
        assert!(!viewport.contains(110.0, 30.0));
        assert!(!viewport.contains(50.0, 70.0));
        assert!(!viewport.contains(9.9, 30.0));
        assert!(viewport.has_area());
        assert!(!Viewport::new(0.0, 0.0, 0.0, 10.0).has_area());
    }
}
