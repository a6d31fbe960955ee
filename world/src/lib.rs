#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Torus Life.
//!
//! The world owns the grid, the playback scheduler and the presentation
//! mirror. Every mutation goes through [`apply`], which resynchronises the
//! mirror before returning so presentation never sees a stale generation.

mod life;
mod mirror;
mod playback;

use std::time::Duration;

use torus_life_core::{
    CellMirror, Command, Event, GridSize, PlaybackState, ALIVE, DEAD, DEFAULT_GRID_SIZE,
    DEFAULT_STEPS_PER_SECOND, MAX_CATCH_UP_STEPS,
};

pub use life::Life;
pub use mirror::ByteMirror;
pub use playback::{AdvanceOutcome, Playback};

/// Represents the authoritative Torus Life world state.
#[derive(Debug)]
pub struct World<M: CellMirror = ByteMirror> {
    life: Life,
    playback: Playback,
    mirror: M,
}

impl World<ByteMirror> {
    /// Creates a paused 50x50 world backed by an in-memory mirror.
    #[must_use]
    pub fn new() -> Self {
        Self::with_mirror(
            DEFAULT_GRID_SIZE,
            DEFAULT_STEPS_PER_SECOND,
            PlaybackState::Paused,
            ByteMirror::new(),
        )
    }
}

impl Default for World<ByteMirror> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: CellMirror> World<M> {
    /// Creates an all-dead world and allocates the provided mirror for it.
    #[must_use]
    pub fn with_mirror(
        size: GridSize,
        steps_per_second: f32,
        state: PlaybackState,
        mut mirror: M,
    ) -> Self {
        let life = Life::new(size);
        let mut playback = Playback::new(steps_per_second);
        playback.set_state(state);
        mirror::reallocate(&life, &mut mirror);
        Self {
            life,
            playback,
            mirror,
        }
    }

    fn step(&mut self) {
        self.life.step();
        self.playback.record_step();
        mirror::sync_all(&self.life, &mut self.mirror);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply<M: CellMirror>(world: &mut World<M>, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ToggleRun => {
            let state = world.playback.toggle();
            tracing::info!(?state, "playback toggled");
            out_events.push(Event::PlaybackChanged { state });
        }
        Command::StepOnce => {
            world.step();
            world.playback.reset_accumulator();
            let generation = world.playback.generation();
            tracing::debug!(generation, "single step");
            out_events.push(Event::GenerationAdvanced {
                steps: 1,
                generation,
            });
        }
        Command::Clear => {
            world.life.clear();
            world.playback.reset_generation();
            mirror::sync_all(&world.life, &mut world.mirror);
            tracing::debug!("grid cleared");
            out_events.push(Event::Cleared);
        }
        Command::ToggleCell { cell } => {
            if !world.life.size().contains(cell) {
                tracing::debug!(?cell, "toggle outside the grid ignored");
                out_events.push(Event::CellToggleRejected { cell });
                return;
            }

            let value = world.life.at_mut(cell.column(), cell.row());
            *value = if *value == DEAD { ALIVE } else { DEAD };
            let alive = *value != DEAD;
            mirror::sync_cell(&world.life, &mut world.mirror, cell);
            tracing::debug!(?cell, alive, "cell toggled");
            out_events.push(Event::CellToggled { cell, alive });
        }
        Command::Resize { size } => {
            let from = world.life.size();
            if from == size {
                return;
            }

            world.life = world.life.resized(size);
            world.playback.reset_accumulator();
            mirror::reallocate(&world.life, &mut world.mirror);
            tracing::info!(
                from_columns = from.columns(),
                from_rows = from.rows(),
                columns = size.columns(),
                rows = size.rows(),
                "grid resized"
            );
            out_events.push(Event::GridResized { from, to: size });
        }
        Command::SetStepsPerSecond { steps_per_second } => {
            let steps_per_second = world.playback.set_steps_per_second(steps_per_second);
            tracing::debug!(steps_per_second, "speed changed");
            out_events.push(Event::SpeedChanged { steps_per_second });
        }
        Command::Tick { dt } => {
            let World {
                life,
                playback,
                mirror: target,
            } = world;
            let outcome = playback.advance(dt.as_secs_f64(), || {
                life.step();
                mirror::sync_all(life, target);
            });

            if outcome.steps > 0 {
                out_events.push(Event::GenerationAdvanced {
                    steps: outcome.steps,
                    generation: playback.generation(),
                });
            }

            if outcome.capped {
                let backlog = Duration::from_secs_f64(playback.accumulator().max(0.0));
                tracing::warn!(
                    steps = MAX_CATCH_UP_STEPS,
                    backlog_secs = backlog.as_secs_f64(),
                    "simulation fell behind; catch-up capped"
                );
                out_events.push(Event::CatchUpLimited {
                    steps: outcome.steps,
                    backlog,
                });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use torus_life_core::{CellCoord, CellMirror, GridSize, PlaybackState};

    use super::World;

    /// Dimensions of the grid.
    #[must_use]
    pub fn grid_size<M: CellMirror>(world: &World<M>) -> GridSize {
        world.life.size()
    }

    /// Current generation, row-major with row zero at the bottom.
    #[must_use]
    pub fn cells<M: CellMirror>(world: &World<M>) -> &[u8] {
        world.life.cells()
    }

    /// Reports whether the cell is alive; cells outside the grid are dead.
    #[must_use]
    pub fn is_alive<M: CellMirror>(world: &World<M>, cell: CellCoord) -> bool {
        world.life.size().contains(cell) && world.life.is_alive(cell)
    }

    /// Current playback state.
    #[must_use]
    pub fn playback_state<M: CellMirror>(world: &World<M>) -> PlaybackState {
        world.playback.state()
    }

    /// Effective simulation frequency.
    #[must_use]
    pub fn steps_per_second<M: CellMirror>(world: &World<M>) -> f32 {
        world.playback.steps_per_second()
    }

    /// Seconds of simulated time owed to the grid.
    #[must_use]
    pub fn accumulator<M: CellMirror>(world: &World<M>) -> f64 {
        world.playback.accumulator()
    }

    /// Steps executed since the grid was last cleared.
    #[must_use]
    pub fn generation<M: CellMirror>(world: &World<M>) -> u64 {
        world.playback.generation()
    }

    /// Number of live cells.
    #[must_use]
    pub fn population<M: CellMirror>(world: &World<M>) -> usize {
        world.life.population()
    }

    /// Presentation mirror kept in sync with the grid.
    #[must_use]
    pub fn mirror<M: CellMirror>(world: &World<M>) -> &M {
        &world.mirror
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use torus_life_core::CellCoord;

    #[test]
    fn new_world_matches_defaults() {
        let world = World::new();
        assert_eq!(query::grid_size(&world), DEFAULT_GRID_SIZE);
        assert_eq!(query::playback_state(&world), PlaybackState::Paused);
        assert_eq!(query::steps_per_second(&world), DEFAULT_STEPS_PER_SECOND);
        assert_eq!(query::population(&world), 0);
        assert_eq!(query::mirror(&world).reallocations(), 1);
        assert_eq!(query::mirror(&world).cells(), query::cells(&world));
    }

    #[test]
    fn toggle_cell_flips_and_syncs_one_cell() {
        let mut world = World::new();
        let mut events = Vec::new();
        let cell = CellCoord::new(3, 4);

        apply(&mut world, Command::ToggleCell { cell }, &mut events);
        apply(&mut world, Command::ToggleCell { cell }, &mut events);

        assert_eq!(
            events,
            vec![
                Event::CellToggled { cell, alive: true },
                Event::CellToggled { cell, alive: false },
            ]
        );
        assert!(!query::is_alive(&world, cell));
        assert_eq!(query::mirror(&world).cell_writes(), 2);
        assert_eq!(query::mirror(&world).full_writes(), 0);
    }

    #[test]
    fn toggle_outside_the_grid_is_rejected() {
        let mut world = World::new();
        let mut events = Vec::new();
        let cell = CellCoord::new(50, 0);

        apply(&mut world, Command::ToggleCell { cell }, &mut events);

        assert_eq!(events, vec![Event::CellToggleRejected { cell }]);
        assert_eq!(query::population(&world), 0);
        assert!(!query::is_alive(&world, cell));
    }

    #[test]
    fn tick_while_paused_emits_nothing() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(2),
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert_eq!(query::generation(&world), 0);
    }
}
