//! Immediate-mode UI helpers for the Macroquad rendering backend.
//!
//! This module hosts all uses of `macroquad::ui` so the rest of the adapter can
//! remain agnostic of Macroquad's UI types.

use macroquad::{
    color::{Color, WHITE},
    math::{vec2, RectOffset, Vec2},
    ui::{hash, widgets, Id, Ui},
};
use torus_life_core::PlaybackState;
use torus_life_rendering::{
    toolbar::{MAX_SLIDER_SPEED, MIN_SLIDER_SPEED},
    ControlPanelView, FieldObservation, ToolbarObservation, ToolbarState,
};

/// Size of the control panel window in pixels.
pub(crate) const CONTROL_PANEL_SIZE: glam::Vec2 = glam::Vec2::new(560.0, 132.0);

const FIELD_SIZE: Vec2 = Vec2::new(64.0, 22.0);

/// Snapshot of the control panel's layout and data for the current frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ControlPanelUiContext {
    /// Top-left corner of the panel in screen coordinates.
    pub(crate) origin: Vec2,
    /// Panel dimensions in screen space.
    pub(crate) size: Vec2,
    /// Window background.
    pub(crate) background: Color,
    /// Values shown by the panel.
    pub(crate) view: ControlPanelView,
}

/// Draws the control panel and reports the widget activity.
///
/// Keyboard confirmation and focus loss are not observable through the
/// widgets, so the caller fills those flags in.
pub(crate) fn draw_control_panel_ui(
    ui: &mut Ui,
    context: ControlPanelUiContext,
    toolbar: &mut ToolbarState,
) -> ToolbarObservation {
    let mut skin = ui.default_skin();

    let window_style = ui
        .style_builder()
        .color(context.background)
        .color_hovered(context.background)
        .color_clicked(context.background)
        .color_selected(context.background)
        .color_selected_hovered(context.background)
        .color_inactive(context.background)
        .text_color(WHITE)
        .margin(RectOffset::new(10.0, 10.0, 8.0, 8.0))
        .build();
    skin.window_style = window_style;

    let label_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .margin(RectOffset::new(0.0, 0.0, 4.0, 4.0))
        .build();
    skin.label_style = label_style;

    let button_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .color(Color::from_rgba(70, 70, 70, 255))
        .color_hovered(Color::from_rgba(96, 96, 96, 255))
        .color_clicked(Color::from_rgba(56, 56, 56, 255))
        .margin(RectOffset::new(8.0, 8.0, 4.0, 4.0))
        .build();
    skin.button_style = button_style;

    ui.push_skin(&skin);

    let view = context.view;
    let mut observation = ToolbarObservation::default();
    let _ = ui.window(hash!("control_panel"), context.origin, context.size, |ui| {
        let run_label = match view.playback {
            PlaybackState::Paused => "Play",
            PlaybackState::Running => "Pause",
        };
        observation.toggle_run = ui.button(None, run_label);
        ui.same_line(0.0);
        observation.step = ui.button(None, "Step");
        ui.same_line(0.0);
        observation.clear = ui.button(None, "Clear");
        ui.same_line(0.0);
        ui.label(
            None,
            &format!(
                "Population: {}   Generation: {}",
                view.population, view.generation
            ),
        );

        let mut speed = view.steps_per_second;
        ui.slider(
            hash!("steps_per_second"),
            "Steps / s",
            MIN_SLIDER_SPEED..MAX_SLIDER_SPEED,
            &mut speed,
        );
        if speed != view.steps_per_second {
            observation.speed = Some(speed);
        }

        observation.columns = grid_side_field(
            ui,
            hash!("columns"),
            "Columns",
            toolbar.columns_text_mut(),
        );
        ui.same_line(0.0);
        observation.rows = grid_side_field(ui, hash!("rows"), "Rows", toolbar.rows_text_mut());
    });

    ui.pop_skin();

    observation
}

fn grid_side_field(ui: &mut Ui, id: Id, label: &str, text: &mut String) -> FieldObservation {
    ui.label(None, label);
    ui.same_line(0.0);
    widgets::InputText::new(id).size(FIELD_SIZE).ui(ui, text);
    ui.same_line(0.0);
    let decrement = widgets::Button::new("-").size(vec2(22.0, 22.0)).ui(ui);
    ui.same_line(0.0);
    let increment = widgets::Button::new("+").size(vec2(22.0, 22.0)).ui(ui);

    FieldObservation {
        decrement,
        increment,
        ..FieldObservation::default()
    }
}
