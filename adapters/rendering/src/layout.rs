//! Window layout shared by backends and the frame session.

use glam::Vec2;
use torus_life_core::Viewport;

/// Gap kept between the control panel and the window's bottom-right corner.
pub const CONTROL_PANEL_MARGIN: f32 = 12.0;

/// Side-by-side split of the window: grid view on the left, torus on the right.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitLayout {
    /// Left half showing the flat grid.
    pub grid_view: Viewport,
    /// Right half showing the torus.
    pub torus_view: Viewport,
}

impl SplitLayout {
    /// Splits a window of the provided size. The left half is rounded down to
    /// whole pixels and the right half takes the remainder.
    #[must_use]
    pub fn for_window(window_size: Vec2) -> Self {
        let width = window_size.x.max(0.0).floor();
        let height = window_size.y.max(0.0).floor();
        let left = (width / 2.0).floor();

        Self {
            grid_view: Viewport::new(0.0, 0.0, left, height),
            torus_view: Viewport::new(left, 0.0, width - left, height),
        }
    }
}

/// Places a panel of `panel_size` in the window's bottom-right corner, inset by
/// [`CONTROL_PANEL_MARGIN`]. The panel never extends past the top-left corner.
#[must_use]
pub fn control_panel_rect(window_size: Vec2, panel_size: Vec2) -> Viewport {
    let x = (window_size.x - CONTROL_PANEL_MARGIN - panel_size.x).max(0.0);
    let y = (window_size.y - CONTROL_PANEL_MARGIN - panel_size.y).max(0.0);
    Viewport::new(x, y, panel_size.x, panel_size.y)
}
