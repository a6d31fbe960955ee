#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Orbit camera for the 3D torus view and the drag gesture that steers it.

use glam::{Vec2, Vec3};
use torus_life_core::Viewport;

/// Radians of rotation per pixel of pointer travel.
pub const ROTATION_PER_PIXEL: f32 = 0.005;

/// Largest pitch magnitude in degrees.
pub const PITCH_LIMIT_DEGREES: f32 = 89.0;

/// Exponential zoom rate applied per unit of scroll.
pub const ZOOM_RATE: f32 = 0.15;

/// Closest permitted camera distance.
pub const MIN_DISTANCE: f32 = 1.0;

/// Farthest permitted camera distance.
pub const MAX_DISTANCE: f32 = 150.0;

/// Camera that circles a target point at a fixed distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCamera {
    target: Vec3,
    distance: f32,
    yaw: f32,
    pitch: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 15.0,
            yaw: 0.0,
            pitch: (-20.0_f32).to_radians(),
        }
    }
}

impl OrbitCamera {
    /// Creates a camera looking at the origin from 15 units, pitched 20° down.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the camera circles.
    #[must_use]
    pub const fn target(&self) -> Vec3 {
        self.target
    }

    /// Distance between the eye and the target.
    #[must_use]
    pub const fn distance(&self) -> f32 {
        self.distance
    }

    /// Rotation about the vertical axis, in radians.
    #[must_use]
    pub const fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Elevation angle, in radians.
    #[must_use]
    pub const fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Unit vector pointing from the eye towards the target.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vec3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw)
    }

    /// Position of the eye in world space.
    #[must_use]
    pub fn eye(&self) -> Vec3 {
        self.target - self.direction() * self.distance
    }

    /// Rotates the camera by a pointer delta in pixels.
    ///
    /// Moving right increases yaw; moving down decreases pitch.
    pub fn orbit_by(&mut self, delta: Vec2) {
        let limit = PITCH_LIMIT_DEGREES.to_radians();
        self.yaw += delta.x * ROTATION_PER_PIXEL;
        self.pitch = (self.pitch - delta.y * ROTATION_PER_PIXEL).clamp(-limit, limit);
    }

    /// Moves the camera closer for positive scroll and farther for negative.
    pub fn zoom_by(&mut self, scroll: f32) {
        let scaled = self.distance * (-scroll * ZOOM_RATE).exp();
        self.distance = scaled.clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}

/// Pointer snapshot consumed by [`OrbitDrag`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrbitInput {
    /// Cursor position in window pixels, or `None` when unavailable.
    pub position: Option<Vec2>,
    /// Indicates whether the primary button is held on this frame.
    pub primary_down: bool,
    /// Indicates whether the cursor is captured by the control panel.
    pub over_ui: bool,
    /// Vertical scroll accumulated since the previous frame.
    pub scroll: f32,
}

/// Drag and scroll gesture for the 3D view.
///
/// Dragging starts when the button is held inside the viewport and stops as
/// soon as the button is released or the pointer leaves the viewport. Scroll
/// is applied only while the pointer is inside; otherwise it is discarded.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrbitDrag {
    rotating: bool,
    last: Vec2,
}

impl OrbitDrag {
    /// Creates an idle gesture.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rotating: false,
            last: Vec2::ZERO,
        }
    }

    /// Reports whether a drag is in progress.
    #[must_use]
    pub const fn is_rotating(&self) -> bool {
        self.rotating
    }

    /// Consumes one frame of pointer input and updates the camera.
    pub fn handle(&mut self, input: OrbitInput, viewport: Viewport, camera: &mut OrbitCamera) {
        let inside = match input.position {
            Some(position) => !input.over_ui && viewport.contains(position.x, position.y),
            None => false,
        };

        if !inside || !input.primary_down {
            self.rotating = false;
        }

        if let (true, Some(position)) = (inside, input.position) {
            if input.primary_down && !self.rotating {
                self.rotating = true;
                self.last = position;
            }

            if self.rotating {
                camera.orbit_by(position - self.last);
                self.last = position;
            }

            if input.scroll != 0.0 {
                camera.zoom_by(input.scroll);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::OrbitCamera;
    use glam::Vec3;

    #[test]
    fn default_eye_sits_above_the_torus_plane() {
        let camera = OrbitCamera::new();
        let eye = camera.eye();
        assert!((eye.length() - 15.0).abs() < 1e-4);
        assert!(eye.y > 0.0, "pitching down places the eye above the target");
        assert!(eye.x < 0.0);
        assert!(eye.z.abs() < 1e-5);
        assert_eq!(camera.target(), Vec3::ZERO);
    }
}
