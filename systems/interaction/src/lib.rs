#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure interaction system that maps the pointer onto the 2D grid view and
//! emits cell toggle commands.

use glam::Vec2;
use torus_life_core::{CellCoord, Command, GridSize, Viewport};

/// Pointer snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerInput {
    /// Cursor position in window pixels, or `None` when unavailable.
    pub position: Option<Vec2>,
    /// Indicates whether the primary button is held on this frame.
    pub primary_down: bool,
    /// Indicates whether the cursor is captured by the control panel.
    pub over_ui: bool,
}

impl PointerInput {
    /// Creates a new pointer snapshot with explicit field values.
    #[must_use]
    pub const fn new(position: Option<Vec2>, primary_down: bool, over_ui: bool) -> Self {
        Self {
            position,
            primary_down,
            over_ui,
        }
    }
}

/// Maps a window-space pointer position onto the grid drawn inside `viewport`.
///
/// Row zero is drawn at the bottom of the viewport, so the vertical axis is
/// flipped. Returns `None` when the pointer lies outside the viewport or the
/// computed cell falls outside the grid.
#[must_use]
pub fn map_pointer_to_cell(pointer: Vec2, viewport: Viewport, size: GridSize) -> Option<CellCoord> {
    if !viewport.has_area() {
        return None;
    }

    let local_x = f64::from(pointer.x) - f64::from(viewport.x);
    let local_y = f64::from(pointer.y) - f64::from(viewport.y);
    let width = f64::from(viewport.width);
    let height = f64::from(viewport.height);

    if local_x < 0.0 || local_y < 0.0 || local_x >= width || local_y >= height {
        return None;
    }

    let column = (local_x * f64::from(size.columns()) / width).floor();
    let row = ((height - 1.0 - local_y) * f64::from(size.rows()) / height).floor();

    // The one-pixel flip pushes fractional positions on the last pixel row
    // below zero.
    if column < 0.0 || row < 0.0 {
        return None;
    }

    let cell = CellCoord::new(column as u32, row as u32);
    size.contains(cell).then_some(cell)
}

/// Edge-triggered toggle gesture for the 2D grid view.
///
/// A held button toggles exactly one cell: the command is emitted on the
/// frame the button goes down, never while it stays down.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InteractionSession {
    was_down: bool,
    hovered: Option<CellCoord>,
}

impl InteractionSession {
    /// Creates a session with the button released and nothing hovered.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            was_down: false,
            hovered: None,
        }
    }

    /// Cell hovered on the most recent frame.
    #[must_use]
    pub const fn hovered(&self) -> Option<CellCoord> {
        self.hovered
    }

    /// Consumes one frame of pointer input and emits toggle commands.
    ///
    /// Returns the hovered cell. Hover is suppressed while the control panel
    /// captures the pointer. The button state is recorded every frame, so a
    /// press that starts over the panel does not toggle when the pointer
    /// later moves onto the grid.
    pub fn handle(
        &mut self,
        input: PointerInput,
        viewport: Viewport,
        size: GridSize,
        out: &mut Vec<Command>,
    ) -> Option<CellCoord> {
        self.hovered = if input.over_ui {
            None
        } else {
            input
                .position
                .and_then(|pointer| map_pointer_to_cell(pointer, viewport, size))
        };

        if input.primary_down && !self.was_down {
            if let Some(cell) = self.hovered {
                out.push(Command::ToggleCell { cell });
            }
        }
        self.was_down = input.primary_down;

        self.hovered
    }
}

#[cfg(test)]
mod tests {
    use super::map_pointer_to_cell;
    use glam::Vec2;
    use torus_life_core::{CellCoord, GridSize, Viewport};

    #[test]
    fn top_pixel_row_maps_to_the_top_grid_row() {
        let size = GridSize::new(10, 10).expect("valid size");
        let viewport = Viewport::new(0.0, 0.0, 100.0, 100.0);

        assert_eq!(
            map_pointer_to_cell(Vec2::new(0.0, 0.0), viewport, size),
            Some(CellCoord::new(0, 9))
        );
        assert_eq!(
            map_pointer_to_cell(Vec2::new(99.0, 99.0), viewport, size),
            Some(CellCoord::new(9, 0))
        );
    }

    #[test]
    fn degenerate_viewport_maps_nothing() {
        let size = GridSize::new(10, 10).expect("valid size");
        let viewport = Viewport::new(0.0, 0.0, 0.0, 100.0);
        assert_eq!(map_pointer_to_cell(Vec2::ZERO, viewport, size), None);
    }
}
