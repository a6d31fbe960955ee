//! Control panel state and the rules that turn widget activity into commands.
//!
//! Backends draw the widgets and report what happened through a
//! [`ToolbarObservation`]; [`ToolbarState::resolve`] applies the commit
//! rules and yields the [`ToolbarActions`] for the frame.

use torus_life_core::{Command, GridSize};

/// Smallest grid side the control panel accepts.
pub const MIN_GRID_SIDE: u32 = 10;

/// Largest grid side the control panel accepts.
pub const MAX_GRID_SIDE: u32 = 100;

/// Slowest speed offered by the speed slider.
pub const MIN_SLIDER_SPEED: f32 = 0.5;

/// Fastest speed offered by the speed slider.
pub const MAX_SLIDER_SPEED: f32 = 10.0;

/// Clamps a requested grid side into `[MIN_GRID_SIDE, MAX_GRID_SIDE]`.
#[must_use]
pub fn clamp_grid_side(value: i64) -> u32 {
    // The clamp keeps the value inside u32 range.
    value.clamp(i64::from(MIN_GRID_SIDE), i64::from(MAX_GRID_SIDE)) as u32
}

/// What happened to one numeric field during a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldObservation {
    /// Enter was pressed.
    pub confirm: bool,
    /// The field lost keyboard focus.
    pub focus_lost: bool,
    /// The `-` button next to the field was pressed.
    pub decrement: bool,
    /// The `+` button next to the field was pressed.
    pub increment: bool,
}

/// Widget activity reported by a backend for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ToolbarObservation {
    /// Play/Pause button pressed.
    pub toggle_run: bool,
    /// Step button pressed.
    pub step: bool,
    /// Clear button pressed.
    pub clear: bool,
    /// Slider value when it moved this frame.
    pub speed: Option<f32>,
    /// Activity on the columns field.
    pub columns: FieldObservation,
    /// Activity on the rows field.
    pub rows: FieldObservation,
}

/// Requests produced by the control panel for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ToolbarActions {
    /// Flip between paused and running.
    pub toggle_run: bool,
    /// Execute a single step.
    pub step: bool,
    /// Kill every cell.
    pub clear: bool,
    /// New simulation frequency.
    pub speed: Option<f32>,
    /// New grid dimensions.
    pub resize: Option<GridSize>,
}

impl ToolbarActions {
    /// Reports whether no request was made.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Appends the equivalent commands in the order the panel applies them:
    /// playback, step, clear, speed, resize.
    pub fn push_commands(&self, out: &mut Vec<Command>) {
        if self.toggle_run {
            out.push(Command::ToggleRun);
        }
        if self.step {
            out.push(Command::StepOnce);
        }
        if self.clear {
            out.push(Command::Clear);
        }
        if let Some(steps_per_second) = self.speed {
            out.push(Command::SetStepsPerSecond { steps_per_second });
        }
        if let Some(size) = self.resize {
            out.push(Command::Resize { size });
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct NumericField {
    text: String,
    seen: String,
    value: u32,
    edited: bool,
}

impl NumericField {
    fn new(value: u32) -> Self {
        let text = value.to_string();
        Self {
            seen: text.clone(),
            text,
            value,
            edited: false,
        }
    }

    /// Value currently typed, or the last committed value when the text does
    /// not parse.
    fn typed(&self) -> i64 {
        self.text
            .trim()
            .parse::<i64>()
            .unwrap_or_else(|_| i64::from(self.value))
    }

    fn set(&mut self, value: u32) {
        self.value = value;
        self.text = value.to_string();
        self.seen.clone_from(&self.text);
        self.edited = false;
    }

    /// Applies one frame of activity and reports whether a commit is due.
    fn observe(&mut self, observation: FieldObservation) -> bool {
        if self.text != self.seen {
            self.edited = true;
            self.seen.clone_from(&self.text);
        }

        let mut commit = false;
        if observation.decrement {
            let value = clamp_grid_side(self.typed().saturating_sub(1));
            self.set(value);
            commit = true;
        }
        if observation.increment {
            let value = clamp_grid_side(self.typed().saturating_add(1));
            self.set(value);
            commit = true;
        }
        if (observation.confirm || observation.focus_lost) && self.edited {
            commit = true;
        }
        commit
    }
}

/// Persistent state of the control panel's numeric fields.
///
/// The text buffers are edited in place by the backend's widgets. Edits only
/// reach the grid when committed: Enter or focus loss after an edit, or a
/// `+`/`-` press. A commit applies both fields at once, each clamped to
/// `[MIN_GRID_SIDE, MAX_GRID_SIDE]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolbarState {
    columns: NumericField,
    rows: NumericField,
}

impl ToolbarState {
    /// Creates fields showing the provided grid dimensions.
    #[must_use]
    pub fn new(size: GridSize) -> Self {
        Self {
            columns: NumericField::new(size.columns()),
            rows: NumericField::new(size.rows()),
        }
    }

    /// Text buffer behind the columns field.
    pub fn columns_text_mut(&mut self) -> &mut String {
        &mut self.columns.text
    }

    /// Text buffer behind the rows field.
    pub fn rows_text_mut(&mut self) -> &mut String {
        &mut self.rows.text
    }

    /// Text currently shown in the columns field.
    #[must_use]
    pub fn columns_text(&self) -> &str {
        &self.columns.text
    }

    /// Text currently shown in the rows field.
    #[must_use]
    pub fn rows_text(&self) -> &str {
        &self.rows.text
    }

    /// Reports whether either field holds uncommitted edits.
    #[must_use]
    pub fn has_pending_edits(&self) -> bool {
        self.columns.edited
            || self.rows.edited
            || self.columns.text != self.columns.seen
            || self.rows.text != self.rows.seen
    }

    /// Applies the commit rules to one frame of widget activity.
    pub fn resolve(&mut self, observation: ToolbarObservation) -> ToolbarActions {
        let commit_columns = self.columns.observe(observation.columns);
        let commit_rows = self.rows.observe(observation.rows);

        let resize = if commit_columns || commit_rows {
            let columns = clamp_grid_side(self.columns.typed());
            let rows = clamp_grid_side(self.rows.typed());
            self.columns.set(columns);
            self.rows.set(rows);
            GridSize::new(columns, rows)
        } else {
            None
        };

        ToolbarActions {
            toggle_run: observation.toggle_run,
            step: observation.step,
            clear: observation.clear,
            speed: observation
                .speed
                .map(|speed| speed.clamp(MIN_SLIDER_SPEED, MAX_SLIDER_SPEED)),
            resize,
        }
    }
}
