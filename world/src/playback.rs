//! Fixed-step scheduler that converts wall-clock time into grid steps.

use torus_life_core::{PlaybackState, MAX_CATCH_UP_STEPS, MIN_STEPS_PER_SECOND};

/// Playback state, simulation frequency and the time owed to the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Playback {
    state: PlaybackState,
    steps_per_second: f32,
    accumulator: f64,
    generation: u64,
}

/// Summary of a single [`Playback::advance`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdvanceOutcome {
    /// Number of steps executed.
    pub steps: u32,
    /// Whether the loop stopped at [`MAX_CATCH_UP_STEPS`] with time still owed.
    pub capped: bool,
}

impl Playback {
    /// Creates a paused scheduler running at the provided frequency.
    #[must_use]
    pub fn new(steps_per_second: f32) -> Self {
        Self {
            state: PlaybackState::Paused,
            steps_per_second: clamp_steps_per_second(steps_per_second),
            accumulator: 0.0,
            generation: 0,
        }
    }

    /// Current playback state.
    #[must_use]
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    /// Effective simulation frequency.
    #[must_use]
    pub const fn steps_per_second(&self) -> f32 {
        self.steps_per_second
    }

    /// Seconds of simulated time not yet converted into steps.
    #[must_use]
    pub const fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Number of steps executed since the grid was last cleared.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Seconds between two consecutive steps.
    #[must_use]
    pub fn period(&self) -> f64 {
        1.0 / f64::from(self.steps_per_second)
    }

    /// Flips between paused and running and returns the new state.
    pub fn toggle(&mut self) -> PlaybackState {
        self.state = self.state.toggled();
        self.state
    }

    /// Replaces the playback state.
    pub fn set_state(&mut self, state: PlaybackState) {
        self.state = state;
    }

    /// Changes the frequency and returns the value in effect after clamping.
    pub fn set_steps_per_second(&mut self, steps_per_second: f32) -> f32 {
        self.steps_per_second = clamp_steps_per_second(steps_per_second);
        self.steps_per_second
    }

    /// Drops any time owed to the grid.
    pub fn reset_accumulator(&mut self) {
        self.accumulator = 0.0;
    }

    /// Records one step executed outside [`Playback::advance`].
    pub fn record_step(&mut self) {
        self.generation = self.generation.saturating_add(1);
    }

    /// Restarts the generation counter.
    pub fn reset_generation(&mut self) {
        self.generation = 0;
    }

    /// Adds `dt` seconds to the accumulator and invokes `step` once per
    /// elapsed period, at most [`MAX_CATCH_UP_STEPS`] times.
    ///
    /// Does nothing while paused. Negative or non-finite deltas count as zero.
    /// Time left over after the loop stays in the accumulator.
    pub fn advance<F>(&mut self, dt: f64, mut step: F) -> AdvanceOutcome
    where
        F: FnMut(),
    {
        if !self.state.is_running() {
            return AdvanceOutcome::default();
        }

        if dt.is_finite() && dt > 0.0 {
            self.accumulator += dt;
        }

        let period = self.period();
        let mut steps = 0;
        while self.accumulator >= period && steps < MAX_CATCH_UP_STEPS {
            step();
            self.accumulator -= period;
            self.record_step();
            steps += 1;
        }

        AdvanceOutcome {
            steps,
            capped: steps == MAX_CATCH_UP_STEPS && self.accumulator >= period,
        }
    }
}

fn clamp_steps_per_second(steps_per_second: f32) -> f32 {
    if steps_per_second > MIN_STEPS_PER_SECOND {
        steps_per_second
    } else {
        // Also catches NaN, which fails every comparison.
        MIN_STEPS_PER_SECOND
    }
}

#[cfg(test)]
mod tests {
    use super::Playback;
    use torus_life_core::{PlaybackState, MIN_STEPS_PER_SECOND};

    fn running(steps_per_second: f32) -> Playback {
        let mut playback = Playback::new(steps_per_second);
        playback.set_state(PlaybackState::Running);
        playback
    }

    #[test]
    fn starts_paused_at_generation_zero() {
        let playback = Playback::new(5.0);
        assert_eq!(playback.state(), PlaybackState::Paused);
        assert_eq!(playback.generation(), 0);
        assert_eq!(playback.accumulator(), 0.0);
    }

    #[test]
    fn paused_playback_ignores_time() {
        let mut playback = Playback::new(5.0);
        let mut calls = 0;
        let outcome = playback.advance(3.0, || calls += 1);
        assert_eq!(outcome.steps, 0);
        assert_eq!(calls, 0);
        assert_eq!(playback.accumulator(), 0.0);
    }

    #[test]
    fn leftover_time_carries_into_the_next_call() {
        let mut playback = running(4.0);
        let mut calls = 0;

        assert_eq!(playback.advance(0.2, || calls += 1).steps, 0);
        assert_eq!(playback.advance(0.1, || calls += 1).steps, 1);
        assert_eq!(calls, 1);
        assert!((playback.accumulator() - 0.05).abs() < 1e-9);
        assert_eq!(playback.generation(), 1);
    }

    #[test]
    fn catch_up_stops_at_the_cap() {
        let mut playback = running(1000.0);
        let mut calls = 0;

        let outcome = playback.advance(10.0, || calls += 1);

        assert_eq!(outcome.steps, 240);
        assert!(outcome.capped);
        assert_eq!(calls, 240);
        let period = f64::from(1000.0_f32).recip();
        let expected = 10.0 - 240.0 * period;
        assert!(
            (playback.accumulator() - expected).abs() < 1e-9,
            "accumulator {} != {expected}",
            playback.accumulator()
        );
    }

    #[test]
    fn exact_cap_without_backlog_is_not_reported_as_capped() {
        let mut playback = running(4.0);
        let outcome = playback.advance(60.0, || {});
        assert_eq!(outcome.steps, 240);
        assert!(!outcome.capped);
    }

    #[test]
    fn non_positive_frequencies_clamp_to_the_minimum() {
        let mut playback = Playback::new(0.0);
        assert_eq!(playback.steps_per_second(), MIN_STEPS_PER_SECOND);
        assert_eq!(playback.set_steps_per_second(-3.0), MIN_STEPS_PER_SECOND);
        assert_eq!(playback.set_steps_per_second(f32::NAN), MIN_STEPS_PER_SECOND);
        assert_eq!(playback.set_steps_per_second(7.5), 7.5);
    }

    #[test]
    fn negative_and_non_finite_deltas_are_ignored() {
        let mut playback = running(10.0);
        assert_eq!(playback.advance(-1.0, || {}).steps, 0);
        assert_eq!(playback.advance(f64::INFINITY, || {}).steps, 0);
        assert_eq!(playback.accumulator(), 0.0);
    }

    #[test]
    fn toggle_flips_state() {
        let mut playback = Playback::new(5.0);
        assert_eq!(playback.toggle(), PlaybackState::Running);
        assert_eq!(playback.toggle(), PlaybackState::Paused);
    }
}
