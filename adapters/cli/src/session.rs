//! Frame session tying the world and the interaction systems to a backend.

use std::time::Duration;

use anyhow::{bail, Result};
use glam::Vec2;
use torus_life_core::{CellCoord, CellMirror, Command, Event, GridSize, PlaybackState};
use torus_life_rendering::{
    CameraPose, ControlPanelView, FrameInput, FrameSession, GridPresentation, Scene,
    ShortcutRequests, SplitLayout,
};
use torus_life_system_interaction::{InteractionSession, PointerInput};
use torus_life_system_orbit_camera::{OrbitCamera, OrbitDrag, OrbitInput};
use torus_life_world::{apply, query, World};

/// Simulation state owned by the render loop.
///
/// Each frame applies panel and shortcut requests, advances the scheduler,
/// resolves hover and toggles in the grid view, then orbits the camera.
#[derive(Debug)]
pub(crate) struct LifeSession<M: CellMirror> {
    size: GridSize,
    steps_per_second: f32,
    playback: PlaybackState,
    world: Option<World<M>>,
    interaction: InteractionSession,
    camera: OrbitCamera,
    orbit: OrbitDrag,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl<M: CellMirror> LifeSession<M> {
    /// Creates a session that builds its world once the backend starts it.
    pub(crate) fn new(size: GridSize, steps_per_second: f32, playback: PlaybackState) -> Self {
        Self {
            size,
            steps_per_second,
            playback,
            world: None,
            interaction: InteractionSession::new(),
            camera: OrbitCamera::new(),
            orbit: OrbitDrag::new(),
            commands: Vec::new(),
            events: Vec::new(),
        }
    }
}

impl<M: CellMirror> FrameSession<M> for LifeSession<M> {
    fn start(&mut self, mirror: M, window_size: Vec2) -> Result<Scene> {
        if self.world.is_some() {
            bail!("simulation already started");
        }

        let world = World::with_mirror(self.size, self.steps_per_second, self.playback, mirror);
        tracing::info!(
            columns = self.size.columns(),
            rows = self.size.rows(),
            steps_per_second = query::steps_per_second(&world),
            running = self.playback.is_running(),
            "simulation started"
        );

        let scene = build_scene(
            &world,
            SplitLayout::for_window(window_size),
            None,
            &self.camera,
        );
        self.world = Some(world);
        Ok(scene)
    }

    fn update(&mut self, dt: Duration, input: FrameInput, scene: &mut Scene) {
        let Self {
            world,
            interaction,
            camera,
            orbit,
            commands,
            events,
            ..
        } = self;
        let Some(world) = world.as_mut() else {
            return;
        };
        let layout = SplitLayout::for_window(input.window_size);

        input.toolbar.push_commands(commands);
        push_shortcut_commands(input.shortcuts, commands);
        commands.push(Command::Tick { dt });
        apply_all(world, commands, events);

        let hovered = interaction.handle(
            PointerInput::new(input.cursor, input.primary_down, input.cursor_over_ui),
            layout.grid_view,
            query::grid_size(world),
            commands,
        );
        apply_all(world, commands, events);

        orbit.handle(
            OrbitInput {
                position: input.cursor,
                primary_down: input.primary_down,
                over_ui: input.cursor_over_ui,
                scroll: input.scroll,
            },
            layout.torus_view,
            camera,
        );

        *scene = build_scene(world, layout, hovered, camera);
    }

    fn mirror(&self) -> Option<&M> {
        self.world.as_ref().map(query::mirror)
    }
}

fn push_shortcut_commands(shortcuts: ShortcutRequests, out: &mut Vec<Command>) {
    if shortcuts.toggle_run {
        out.push(Command::ToggleRun);
    }
    if shortcuts.step {
        out.push(Command::StepOnce);
    }
    if shortcuts.clear {
        out.push(Command::Clear);
    }
}

fn apply_all<M: CellMirror>(
    world: &mut World<M>,
    commands: &mut Vec<Command>,
    events: &mut Vec<Event>,
) {
    for command in commands.drain(..) {
        apply(world, command, events);
    }
    // The scene is rebuilt from queries, so events are only logged by the world.
    events.clear();
}

fn build_scene<M: CellMirror>(
    world: &World<M>,
    layout: SplitLayout,
    hovered: Option<CellCoord>,
    camera: &OrbitCamera,
) -> Scene {
    let size = query::grid_size(world);
    Scene {
        layout,
        grid: GridPresentation { size, hovered },
        camera: CameraPose::looking_at(camera.eye(), camera.target()),
        control_panel: ControlPanelView {
            playback: query::playback_state(world),
            steps_per_second: query::steps_per_second(world),
            size,
            population: query::population(world),
            generation: query::generation(world),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use torus_life_rendering::ToolbarActions;
    use torus_life_world::ByteMirror;

    const WINDOW: Vec2 = Vec2::new(1000.0, 500.0);

    fn started(columns: u32, rows: u32) -> (LifeSession<ByteMirror>, Scene) {
        let size = GridSize::new(columns, rows).expect("valid size");
        let mut session = LifeSession::new(size, 5.0, PlaybackState::Paused);
        let scene = session
            .start(ByteMirror::new(), WINDOW)
            .expect("session starts");
        (session, scene)
    }

    fn frame(cursor: Option<Vec2>, primary_down: bool) -> FrameInput {
        FrameInput {
            window_size: WINDOW,
            cursor,
            primary_down,
            ..FrameInput::default()
        }
    }

    fn mirror(session: &LifeSession<ByteMirror>) -> &ByteMirror {
        session.mirror().expect("session started")
    }

    #[test]
    fn start_describes_the_initial_scene() {
        let (session, scene) = started(20, 10);
        assert_eq!(scene.layout.grid_view.width, 500.0);
        assert_eq!(scene.layout.torus_view.x, 500.0);
        assert_eq!(scene.grid.hovered, None);
        assert_eq!(scene.control_panel.playback, PlaybackState::Paused);
        assert_eq!(scene.control_panel.steps_per_second, 5.0);
        assert_eq!(scene.control_panel.population, 0);
        assert_eq!(scene.control_panel.generation, 0);
        assert_eq!(mirror(&session).cells().len(), 200);
    }

    #[test]
    fn starting_twice_is_rejected() {
        let (mut session, _) = started(10, 10);
        assert!(session.start(ByteMirror::new(), WINDOW).is_err());
    }

    #[test]
    fn updates_before_start_are_ignored() {
        let size = GridSize::new(10, 10).expect("valid size");
        let mut session: LifeSession<ByteMirror> =
            LifeSession::new(size, 5.0, PlaybackState::Running);
        let (_, mut scene) = started(10, 10);
        let before = scene.clone();

        session.update(Duration::from_secs(1), frame(None, false), &mut scene);

        assert_eq!(scene, before);
        assert!(session.mirror().is_none());
    }

    #[test]
    fn holding_the_button_toggles_the_hovered_cell_once() {
        let (mut session, mut scene) = started(10, 10);
        // Left view is 500x500, so cells are 50 pixels; row 0 is at the bottom.
        let bottom_left = Some(Vec2::new(25.0, 475.0));

        for _ in 0..3 {
            session.update(Duration::ZERO, frame(bottom_left, true), &mut scene);
        }

        let cell = CellCoord::new(0, 0);
        assert_eq!(scene.grid.hovered, Some(cell));
        assert!(mirror(&session).is_alive(cell));
        assert_eq!(scene.control_panel.population, 1);

        session.update(Duration::ZERO, frame(bottom_left, false), &mut scene);
        session.update(Duration::ZERO, frame(bottom_left, true), &mut scene);
        assert!(!mirror(&session).is_alive(cell));
    }

    #[test]
    fn pointer_over_the_panel_neither_hovers_nor_toggles() {
        let (mut session, mut scene) = started(10, 10);
        let input = FrameInput {
            cursor_over_ui: true,
            ..frame(Some(Vec2::new(25.0, 475.0)), true)
        };

        session.update(Duration::ZERO, input, &mut scene);

        assert_eq!(scene.grid.hovered, None);
        assert_eq!(scene.control_panel.population, 0);
    }

    #[test]
    fn shortcuts_start_playback_before_time_advances() {
        let (mut session, mut scene) = started(10, 10);
        let input = FrameInput {
            shortcuts: ShortcutRequests {
                toggle_run: true,
                ..ShortcutRequests::default()
            },
            ..frame(None, false)
        };

        // 0.5 s at 5 steps per second owes two steps and leaves 0.1 s over.
        session.update(Duration::from_millis(500), input, &mut scene);

        assert_eq!(scene.control_panel.playback, PlaybackState::Running);
        assert_eq!(scene.control_panel.generation, 2);
    }

    #[test]
    fn toolbar_resize_reaches_the_mirror_and_the_scene() {
        let (mut session, mut scene) = started(10, 10);
        let resized = GridSize::new(30, 20).expect("valid size");
        let input = FrameInput {
            toolbar: ToolbarActions {
                resize: Some(resized),
                speed: Some(8.0),
                ..ToolbarActions::default()
            },
            ..frame(None, false)
        };

        session.update(Duration::ZERO, input, &mut scene);

        assert_eq!(scene.grid.size, resized);
        assert_eq!(scene.control_panel.size, resized);
        assert_eq!(scene.control_panel.steps_per_second, 8.0);
        assert_eq!(mirror(&session).size(), Some(resized));
        assert_eq!(mirror(&session).reallocations(), 2);
    }

    #[test]
    fn step_and_clear_shortcuts_apply_in_order() {
        let (mut session, mut scene) = started(10, 10);
        let input = FrameInput {
            shortcuts: ShortcutRequests {
                step: true,
                clear: true,
                ..ShortcutRequests::default()
            },
            ..frame(None, false)
        };

        session.update(Duration::ZERO, input, &mut scene);

        // The step runs first, then clear resets the counter.
        assert_eq!(scene.control_panel.generation, 0);
    }

    #[test]
    fn dragging_in_the_torus_view_orbits_the_camera() {
        let (mut session, mut scene) = started(10, 10);
        let initial_eye = scene.camera.eye;

        session.update(
            Duration::ZERO,
            frame(Some(Vec2::new(700.0, 250.0)), true),
            &mut scene,
        );
        session.update(
            Duration::ZERO,
            frame(Some(Vec2::new(760.0, 250.0)), true),
            &mut scene,
        );

        assert_ne!(scene.camera.eye, initial_eye);
        assert_eq!(scene.camera.target, glam::Vec3::ZERO);
        assert_eq!(scene.control_panel.population, 0);
    }

    #[test]
    fn scrolling_over_the_torus_view_zooms() {
        let (mut session, mut scene) = started(10, 10);
        let initial_distance = scene.camera.eye.length();
        let input = FrameInput {
            scroll: 1.0,
            ..frame(Some(Vec2::new(750.0, 250.0)), false)
        };

        session.update(Duration::ZERO, input, &mut scene);

        assert!(scene.camera.eye.length() < initial_distance);
    }
}
