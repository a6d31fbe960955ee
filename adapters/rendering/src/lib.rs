#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Torus Life adapters.
//!
//! Backends own the window, the input devices and the GPU resources. They
//! hand a freshly created [`CellMirror`] to a [`FrameSession`], which builds
//! the simulation around it, and then drive the session once per frame with
//! the elapsed time and a [`FrameInput`] snapshot.

pub mod layout;
pub mod toolbar;
pub mod torus;

use std::time::Duration;

use anyhow::Result as AnyResult;
use glam::{Vec2, Vec3};
use torus_life_core::{CellCoord, CellMirror, GridSize, PlaybackState};

pub use layout::SplitLayout;
pub use toolbar::{FieldObservation, ToolbarActions, ToolbarObservation, ToolbarState};
pub use torus::{TorusMesh, TorusVertex};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque grey of the given intensity.
    #[must_use]
    pub const fn grey(level: f32) -> Self {
        Self::new(level, level, level, 1.0)
    }

    /// Returns the color with `amount` added to every channel, saturating at 1.
    #[must_use]
    pub fn boosted(self, amount: f32) -> Self {
        Self {
            red: (self.red + amount).clamp(0.0, 1.0),
            green: (self.green + amount).clamp(0.0, 1.0),
            blue: (self.blue + amount).clamp(0.0, 1.0),
            alpha: self.alpha,
        }
    }
}

/// Colors and stroke widths used by the 2D grid view.
pub mod palette {
    use super::Color;

    /// Fill of a dead cell.
    pub const DEAD: Color = Color::grey(0.92);
    /// Fill of a live cell.
    pub const ALIVE: Color = Color::grey(0.12);
    /// Grid line color.
    pub const GRID_LINE: Color = Color::grey(0.76);
    /// Grid line width in pixels.
    pub const GRID_LINE_WIDTH: f32 = 0.5;
    /// Amount added to the hovered cell's fill.
    pub const HOVER_BOOST: f32 = 0.25;
    /// Seam where the left and right edges meet on the torus.
    pub const U_SEAM: Color = Color::new(0.30, 0.50, 1.00, 1.0);
    /// Seam where the top and bottom edges meet on the torus.
    pub const V_SEAM: Color = Color::new(1.00, 0.35, 0.35, 1.0);
    /// Seam width in pixels.
    pub const SEAM_WIDTH: f32 = 1.5;
    /// Window clear color behind both views.
    pub const BACKGROUND: Color = Color::grey(0.2);
}

/// Keyboard shortcuts observed during a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShortcutRequests {
    /// Play or pause the simulation.
    pub toggle_run: bool,
    /// Execute a single step.
    pub step: bool,
    /// Kill every cell.
    pub clear: bool,
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Window size in pixels.
    pub window_size: Vec2,
    /// Cursor position in window pixels, origin at the top-left.
    pub cursor: Option<Vec2>,
    /// Whether the primary mouse button is held.
    pub primary_down: bool,
    /// Whether the cursor is over the control panel.
    pub cursor_over_ui: bool,
    /// Vertical scroll accumulated since the previous frame.
    pub scroll: f32,
    /// Requests issued by the control panel.
    pub toolbar: ToolbarActions,
    /// Requests issued by keyboard shortcuts.
    pub shortcuts: ShortcutRequests,
}

/// Perspective camera parameters for the 3D view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    /// Eye position in world space.
    pub eye: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    /// Up direction.
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Near clipping distance.
    pub near: f32,
    /// Far clipping distance.
    pub far: f32,
}

impl CameraPose {
    /// Vertical field of view used by the torus view.
    pub const FOV_Y_DEGREES: f32 = 25.0;
    /// Near clipping distance used by the torus view.
    pub const NEAR: f32 = 0.1;
    /// Far clipping distance used by the torus view.
    pub const FAR: f32 = 200.0;

    /// Creates a Y-up pose with the torus view's projection parameters.
    #[must_use]
    pub const fn looking_at(eye: Vec3, target: Vec3) -> Self {
        Self {
            eye,
            target,
            up: Vec3::Y,
            fov_y_degrees: Self::FOV_Y_DEGREES,
            near: Self::NEAR,
            far: Self::FAR,
        }
    }
}

/// Grid parameters for both views. Cell contents come from the mirror.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridPresentation {
    /// Dimensions of the grid.
    pub size: GridSize,
    /// Cell under the cursor in the 2D view.
    pub hovered: Option<CellCoord>,
}

/// Values shown by the control panel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlPanelView {
    /// Current playback state.
    pub playback: PlaybackState,
    /// Effective simulation frequency.
    pub steps_per_second: f32,
    /// Dimensions of the grid.
    pub size: GridSize,
    /// Number of live cells.
    pub population: usize,
    /// Steps executed since the last clear.
    pub generation: u64,
}

/// Scene description combining both views and the control panel.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Split of the window into the grid and torus views.
    pub layout: SplitLayout,
    /// Grid parameters.
    pub grid: GridPresentation,
    /// Camera used by the torus view.
    pub camera: CameraPose,
    /// Values shown by the control panel.
    pub control_panel: ControlPanelView,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Initial window width in pixels.
    pub window_width: u32,
    /// Initial window height in pixels.
    pub window_height: u32,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(
        window_title: T,
        window_width: u32,
        window_height: u32,
        clear_color: Color,
    ) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            window_width,
            window_height,
            clear_color,
        }
    }
}

/// Simulation driven by a rendering backend.
pub trait FrameSession<M: CellMirror> {
    /// Builds the simulation around the backend's mirror and returns the
    /// first scene. `window_size` is the drawable size in pixels.
    fn start(&mut self, mirror: M, window_size: Vec2) -> AnyResult<Scene>;

    /// Advances the simulation by one frame and refreshes the scene.
    fn update(&mut self, dt: Duration, input: FrameInput, scene: &mut Scene);

    /// Mirror kept in sync with the simulation, once started.
    fn mirror(&self) -> Option<&M>;
}

/// Rendering backend capable of presenting Torus Life scenes.
pub trait RenderingBackend {
    /// Mirror type the backend draws from.
    type Mirror: CellMirror;

    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The backend creates its mirror once the graphics context exists,
    /// passes it to [`FrameSession::start`], and then calls
    /// [`FrameSession::update`] once per frame before drawing.
    fn run<S>(self, presentation: Presentation, session: S) -> AnyResult<()>
    where
        S: FrameSession<Self::Mirror> + 'static;
}

/// Errors that can occur when building rendering resources.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RenderingError {
    /// The torus mesh would need more vertices than 16-bit indices address.
    #[error(
        "a {columns}x{rows} grid needs {vertices} torus vertices, more than 16-bit indices allow"
    )]
    MeshTooLarge {
        /// Grid columns.
        columns: u32,
        /// Grid rows.
        rows: u32,
        /// Vertex count the mesh would need.
        vertices: usize,
    },
    /// A grid texture side does not fit the backend's texture dimensions.
    #[error("a {columns}x{rows} grid does not fit in a single texture")]
    TextureTooLarge {
        /// Grid columns.
        columns: u32,
        /// Grid rows.
        rows: u32,
    },
}

/// Applies the grid view's palette to a cell state.
#[must_use]
pub fn cell_fill(alive: bool, hovered: bool) -> Color {
    let base = if alive { palette::ALIVE } else { palette::DEAD };
    if hovered {
        base.boosted(palette::HOVER_BOOST)
    } else {
        base
    }
}
