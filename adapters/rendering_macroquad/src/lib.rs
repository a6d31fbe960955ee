#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Torus Life.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The left half of the window shows the flat grid drawn with shapes, the
//! right half shows the torus textured with the [`TextureMirror`]. All UI
//! calls live inside the local `ui` module.

mod mirror;
mod ui;

pub use self::mirror::TextureMirror;

use self::ui::{draw_control_panel_ui, ControlPanelUiContext, CONTROL_PANEL_SIZE};
use anyhow::{Context, Result};
use glam::{Vec2, Vec3};
use macroquad::{
    camera::{set_camera, set_default_camera, Camera3D, Projection},
    color::WHITE,
    input::{
        is_key_pressed, is_mouse_button_down, is_mouse_button_pressed, mouse_position,
        mouse_wheel, KeyCode, MouseButton,
    },
    math::{Vec2 as MacroquadVec2, Vec3 as MacroquadVec3},
    models::{draw_mesh, Mesh, Vertex},
    shapes::{draw_line, draw_rectangle},
    texture::Texture2D,
};
use std::{
    collections::VecDeque,
    sync::mpsc,
    time::{Duration, Instant},
};
use torus_life_core::{CellCoord, GridSize, Viewport, MAX_FRAME_DELTA};
use torus_life_rendering::{
    cell_fill, layout::control_panel_rect, palette, torus::model_matrix, CameraPose, Color,
    FrameInput, FrameSession, Presentation, RenderingBackend, RenderingError, Scene,
    ShortcutRequests, ToolbarActions, ToolbarObservation, ToolbarState, TorusMesh,
};

/// Tracks UI-sourced interactions so they can be merged with physical input on the next frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct ControlPanelInputState {
    latched: ToolbarActions,
    shortcuts: ShortcutRequests,
}

impl ControlPanelInputState {
    /// Returns the latched control panel requests and clears the latch so
    /// each request fires only once.
    pub fn take_actions(&mut self) -> ToolbarActions {
        std::mem::take(&mut self.latched)
    }

    /// Records the control panel requests made this frame. Requests made
    /// before the latch was taken are kept; later values win.
    pub fn register_actions(&mut self, actions: ToolbarActions) {
        let latched = &mut self.latched;
        latched.toggle_run |= actions.toggle_run;
        latched.step |= actions.step;
        latched.clear |= actions.clear;
        if actions.speed.is_some() {
            latched.speed = actions.speed;
        }
        if actions.resize.is_some() {
            latched.resize = actions.resize;
        }
    }

    /// Returns the latched keyboard shortcuts and clears them.
    pub fn take_shortcuts(&mut self) -> ShortcutRequests {
        std::mem::take(&mut self.shortcuts)
    }

    /// Records keyboard shortcuts resolved after the panel consumed the
    /// frame's keys.
    pub fn register_shortcuts(&mut self, shortcuts: ShortcutRequests) {
        let latched = &mut self.shortcuts;
        latched.toggle_run |= shortcuts.toggle_run;
        latched.step |= shortcuts.step;
        latched.clear |= shortcuts.clear;
    }
}

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Escape` quits the render loop.
    quit_requested: bool,
    /// `Space` plays or pauses the simulation.
    toggle_run: bool,
    /// `S` or `Right` executes a single step.
    step: bool,
    /// `C` clears the grid.
    clear: bool,
    /// `Enter` commits the grid size fields.
    confirm: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape),
            toggle_run: is_key_pressed(KeyCode::Space),
            step: is_key_pressed(KeyCode::S) || is_key_pressed(KeyCode::Right),
            clear: is_key_pressed(KeyCode::C),
            confirm: is_key_pressed(KeyCode::Enter) || is_key_pressed(KeyCode::KpEnter),
        }
    }

    /// Simulation requests, suppressed while the panel holds uncommitted text.
    ///
    /// Must be resolved after the panel is drawn so a key typed into a
    /// field this frame already counts as an edit.
    fn requests(self, toolbar: &ToolbarState) -> ShortcutRequests {
        if toolbar.has_pending_edits() {
            return ShortcutRequests::default();
        }
        ShortcutRequests {
            toggle_run: self.toggle_run,
            step: self.step,
            clear: self.clear,
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
        }
    }
}

impl MacroquadBackend {
    /// Creates a backend with the platform's default presentation settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the swap interval requested from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Enables or disables vertical sync.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Enables or disables the once-per-second frame timing report.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

/// Durations measured for one rendered frame.
#[derive(Clone, Copy, Debug, Default)]
struct FrameBreakdown {
    frame: Duration,
    simulation: Duration,
    render: Duration,
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
    simulation_accum: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
    avg_simulation: Duration,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsMetrics> {
        self.elapsed += breakdown.frame;
        self.frames = self.frames.saturating_add(1);
        self.simulation_accum += breakdown.simulation;
        self.render_accum += breakdown.render;

        self.frame_times.push_back(breakdown.frame);
        self.window_duration += breakdown.frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            if let Some(removed) = self.frame_times.pop_front() {
                self.window_duration = self.window_duration.saturating_sub(removed);
            } else {
                break;
            }
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames;
        let per_second = frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        let metrics = FpsMetrics {
            per_second,
            trailing_ten_seconds,
            avg_simulation: self.simulation_accum / frames,
            avg_render: self.render_accum / frames,
        };

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.simulation_accum = Duration::ZERO;
        self.render_accum = Duration::ZERO;
        Some(metrics)
    }
}

/// Torus geometry converted to macroquad's vertex format.
struct TorusModel {
    size: GridSize,
    mesh: Mesh,
}

impl TorusModel {
    fn build(size: GridSize) -> Result<Self, RenderingError> {
        let torus = TorusMesh::tessellate(size)?;
        let model = model_matrix();
        let vertices = torus
            .vertices
            .iter()
            .map(|vertex| Vertex {
                position: to_macroquad_vec3(model.transform_point3(vertex.position)),
                uv: MacroquadVec2::new(vertex.uv.x, vertex.uv.y),
                color: WHITE,
            })
            .collect();

        Ok(Self {
            size,
            mesh: Mesh {
                vertices,
                indices: torus.indices,
                texture: None,
            },
        })
    }

    /// Rebuilds the geometry when the grid no longer matches it. A failed
    /// rebuild keeps the previous geometry.
    fn follow(&mut self, size: GridSize) {
        if self.size == size {
            return;
        }
        match Self::build(size) {
            Ok(rebuilt) => {
                tracing::debug!(
                    columns = size.columns(),
                    rows = size.rows(),
                    "rebuilt torus mesh"
                );
                *self = rebuilt;
            }
            Err(error) => {
                tracing::error!(%error, "keeping previous torus mesh");
                self.size = size;
            }
        }
    }
}

impl RenderingBackend for MacroquadBackend {
    type Mirror = TextureMirror;

    fn run<S>(self, presentation: Presentation, mut session: S) -> Result<()>
    where
        S: FrameSession<TextureMirror> + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            window_width,
            window_height,
            clear_color,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: i32::try_from(window_width).context("window width out of range")?,
            window_height: i32::try_from(window_height).context("window height out of range")?,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let (init_sender, init_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let window_size = screen_size();
            let started = session
                .start(TextureMirror::new(), window_size)
                .context("failed to start the simulation")
                .and_then(|scene| {
                    let torus = TorusModel::build(scene.grid.size)
                        .context("failed to build the torus mesh")?;
                    Ok((scene, torus))
                });
            let (mut scene, mut torus) = match started {
                Ok(started) => started,
                Err(error) => {
                    let _ = init_sender.send(Err(error));
                    return;
                }
            };
            let _ = init_sender.send(Ok(()));

            let background = to_macroquad_color(clear_color);
            let panel_background = macroquad::color::Color::from_rgba(36, 36, 40, 235);
            let mut toolbar = ToolbarState::new(scene.control_panel.size);
            let mut fps_counter = FpsCounter::default();
            let mut control_panel_input = ControlPanelInputState::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let window_size = screen_size();
                let panel = control_panel_rect(window_size, CONTROL_PANEL_SIZE);

                let frame_dt = frame_delta(macroquad::time::get_frame_time());
                let frame_input = gather_frame_input(
                    window_size,
                    panel,
                    control_panel_input.take_actions(),
                    control_panel_input.take_shortcuts(),
                );

                let simulation_start = Instant::now();
                session.update(frame_dt, frame_input, &mut scene);
                let simulation_duration = simulation_start.elapsed();

                torus.follow(scene.grid.size);

                let render_start = Instant::now();
                if let Some(mirror) = session.mirror() {
                    draw_grid_view(&scene, mirror);
                    draw_torus_view(
                        scene.layout.torus_view,
                        scene.camera,
                        window_size.y,
                        &mut torus,
                        mirror.texture(),
                    );
                }

                let mut observation = draw_control_panel_ui(
                    &mut macroquad::ui::root_ui(),
                    ControlPanelUiContext {
                        origin: MacroquadVec2::new(panel.x, panel.y),
                        size: MacroquadVec2::new(panel.width, panel.height),
                        background: panel_background,
                        view: scene.control_panel,
                    },
                    &mut toolbar,
                );
                control_panel_input.register_shortcuts(keyboard.requests(&toolbar));
                apply_commit_keys(&mut observation, keyboard.confirm, clicked_outside(panel));
                control_panel_input.register_actions(toolbar.resolve(observation));

                let render_duration = render_start.elapsed();

                let fps_metrics = fps_counter.record_frame(FrameBreakdown {
                    frame: frame_dt,
                    simulation: simulation_duration,
                    render: render_duration,
                });
                if show_fps {
                    if let Some(FpsMetrics {
                        per_second,
                        trailing_ten_seconds,
                        avg_simulation,
                        avg_render,
                    }) = fps_metrics
                    {
                        tracing::info!(
                            fps = per_second,
                            fps_10s = trailing_ten_seconds,
                            sim_ms = avg_simulation.as_secs_f64() * 1_000.0,
                            render_ms = avg_render.as_secs_f64() * 1_000.0,
                            "frame timings"
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        init_receiver.recv().unwrap_or_else(|_| Ok(()))?;

        Ok(())
    }
}

/// Converts macroquad's frame time into the simulation delta, capped at
/// [`MAX_FRAME_DELTA`]. Negative or NaN readings count as no time passing.
fn frame_delta(seconds: f32) -> Duration {
    if seconds.is_nan() {
        return Duration::ZERO;
    }
    Duration::from_secs_f32(seconds.clamp(0.0, MAX_FRAME_DELTA.as_secs_f32()))
}

fn screen_size() -> Vec2 {
    Vec2::new(
        macroquad::window::screen_width(),
        macroquad::window::screen_height(),
    )
}

fn clicked_outside(panel: Viewport) -> bool {
    let (x, y) = mouse_position();
    is_mouse_button_pressed(MouseButton::Left) && !panel.contains(x, y)
}

/// Enter confirms both grid size fields; a click away from the panel counts
/// as the fields losing focus.
fn apply_commit_keys(observation: &mut ToolbarObservation, confirm: bool, focus_lost: bool) {
    for field in [&mut observation.columns, &mut observation.rows] {
        field.confirm |= confirm;
        field.focus_lost |= focus_lost;
    }
}

fn gather_frame_input(
    window_size: Vec2,
    panel: Viewport,
    toolbar: ToolbarActions,
    shortcuts: ShortcutRequests,
) -> FrameInput {
    let (cursor_x, cursor_y) = mouse_position();
    let (_, wheel) = mouse_wheel();
    frame_input_from_observations(
        window_size,
        panel,
        Vec2::new(cursor_x, cursor_y),
        is_mouse_button_down(MouseButton::Left),
        wheel,
        toolbar,
        shortcuts,
    )
}

fn frame_input_from_observations(
    window_size: Vec2,
    panel: Viewport,
    cursor_position: Vec2,
    primary_down: bool,
    wheel: f32,
    toolbar: ToolbarActions,
    shortcuts: ShortcutRequests,
) -> FrameInput {
    let window = Viewport::new(0.0, 0.0, window_size.x, window_size.y);
    let cursor = window
        .contains(cursor_position.x, cursor_position.y)
        .then_some(cursor_position);

    FrameInput {
        window_size,
        cursor,
        primary_down,
        cursor_over_ui: cursor.is_some_and(|position| panel.contains(position.x, position.y)),
        scroll: normalise_wheel(wheel),
        toolbar,
        shortcuts,
    }
}

/// Wheel deltas differ by platform (lines or pixels); one notch maps to one
/// unit of scroll.
fn normalise_wheel(wheel: f32) -> f32 {
    if wheel.is_finite() {
        wheel.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Screen rectangle covered by `cell` in the grid view. Row zero is drawn at
/// the bottom.
fn cell_rect(view: Viewport, size: GridSize, cell: CellCoord) -> Viewport {
    let cell_width = view.width / size.columns() as f32;
    let cell_height = view.height / size.rows() as f32;
    let flipped_row = size.rows() - 1 - cell.row();
    Viewport::new(
        view.x + cell.column() as f32 * cell_width,
        view.y + flipped_row as f32 * cell_height,
        cell_width,
        cell_height,
    )
}

fn draw_grid_view(scene: &Scene, mirror: &TextureMirror) {
    let view = scene.layout.grid_view;
    if !view.has_area() {
        return;
    }
    let size = scene.grid.size;

    draw_rectangle(
        view.x,
        view.y,
        view.width,
        view.height,
        to_macroquad_color(palette::DEAD),
    );

    for row in 0..size.rows() {
        for column in 0..size.columns() {
            let cell = CellCoord::new(column, row);
            let alive = mirror.is_alive(cell);
            let hovered = scene.grid.hovered == Some(cell);
            if !alive && !hovered {
                continue;
            }
            let rect = cell_rect(view, size, cell);
            draw_rectangle(
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                to_macroquad_color(cell_fill(alive, hovered)),
            );
        }
    }

    draw_grid_lines(view, size);
    draw_seams(view);
}

fn draw_grid_lines(view: Viewport, size: GridSize) {
    let color = to_macroquad_color(palette::GRID_LINE);
    let width = palette::GRID_LINE_WIDTH;
    let cell_width = view.width / size.columns() as f32;
    let cell_height = view.height / size.rows() as f32;
    let bottom = view.y + view.height;
    let right = view.x + view.width;

    for column in 1..size.columns() {
        let x = view.x + column as f32 * cell_width;
        draw_line(x, view.y, x, bottom, width, color);
    }
    for row in 1..size.rows() {
        let y = view.y + row as f32 * cell_height;
        draw_line(view.x, y, right, y, width, color);
    }
}

/// Left and right edges meet along the U seam, top and bottom along the V seam.
fn draw_seams(view: Viewport) {
    let width = palette::SEAM_WIDTH;
    let inset = width / 2.0;
    let left = view.x + inset;
    let right = view.x + view.width - inset;
    let top = view.y + inset;
    let bottom = view.y + view.height - inset;

    let u_seam = to_macroquad_color(palette::U_SEAM);
    draw_line(left, view.y, left, view.y + view.height, width, u_seam);
    draw_line(right, view.y, right, view.y + view.height, width, u_seam);

    let v_seam = to_macroquad_color(palette::V_SEAM);
    draw_line(view.x, top, view.x + view.width, top, width, v_seam);
    draw_line(view.x, bottom, view.x + view.width, bottom, width, v_seam);
}

fn draw_torus_view(
    view: Viewport,
    camera: CameraPose,
    screen_height: f32,
    torus: &mut TorusModel,
    texture: Option<Texture2D>,
) {
    if !view.has_area() {
        return;
    }

    set_camera(&Camera3D {
        position: to_macroquad_vec3(camera.eye),
        target: to_macroquad_vec3(camera.target),
        up: to_macroquad_vec3(camera.up),
        fovy: camera.fov_y_degrees.to_radians(),
        aspect: Some(view.width / view.height),
        projection: Projection::Perspective,
        render_target: None,
        viewport: Some(gl_viewport(view, screen_height)),
    });
    torus.mesh.texture = texture;
    draw_mesh(&torus.mesh);
    set_default_camera();
}

/// Converts a top-left based viewport into GL's bottom-left convention.
fn gl_viewport(view: Viewport, screen_height: f32) -> (i32, i32, i32, i32) {
    let bottom = screen_height - view.y - view.height;
    (
        view.x.round() as i32,
        bottom.round() as i32,
        view.width.round() as i32,
        view.height.round() as i32,
    )
}

fn to_macroquad_vec3(vector: Vec3) -> MacroquadVec3 {
    MacroquadVec3::new(vector.x, vector.y, vector.z)
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
