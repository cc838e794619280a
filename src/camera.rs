//! Orbit camera.
//!
//! The camera is stored as orbit angles plus a distance from the world
//! origin. The eye position is always derived from them.

use glam::{Vec2, Vec3};

use crate::input::{Input, MouseButton};

/// Limits and sensitivities for the orbit rig.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraLimits {
    /// Pitch limit in degrees, applied symmetrically.
    pub max_pitch: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Degrees per pixel of drag.
    pub orbit_sensitivity: f32,
    /// Distance per wheel line.
    pub zoom_step: f32,
}

impl Default for CameraLimits {
    fn default() -> Self {
        Self {
            max_pitch: 89.0,
            min_distance: 2.0,
            max_distance: 20.0,
            orbit_sensitivity: 0.2,
            zoom_step: 0.5,
        }
    }
}

/// Orbit camera around the world origin.
#[derive(Debug, Clone)]
pub struct CameraRig {
    /// Vertical angle in degrees.
    pitch: f32,
    /// Horizontal angle in degrees.
    yaw: f32,
    distance: f32,
    limits: CameraLimits,
    /// Right button was held during the last `apply_input`.
    orbiting: bool,
}

impl CameraRig {
    pub fn new(limits: CameraLimits) -> Self {
        let mut rig = Self {
            pitch: 0.0,
            yaw: 0.0,
            distance: 5.0,
            limits,
            orbiting: false,
        };
        rig.clamp();
        rig
    }

    #[inline]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[inline]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    #[inline]
    pub fn is_orbiting(&self) -> bool {
        self.orbiting
    }

    /// The point the camera looks at.
    #[inline]
    pub fn target(&self) -> Vec3 {
        Vec3::ZERO
    }

    /// Eye position from the current angles and distance.
    pub fn position(&self) -> Vec3 {
        let pitch = self.pitch.to_radians();
        let yaw = self.yaw.to_radians();
        self.target()
            + self.distance * Vec3::new(pitch.cos() * yaw.sin(), pitch.sin(), pitch.cos() * yaw.cos())
    }

    /// Rotate by a drag of `delta` pixels.
    pub fn orbit(&mut self, delta: Vec2) {
        self.pitch -= delta.y * self.limits.orbit_sensitivity;
        self.yaw -= delta.x * self.limits.orbit_sensitivity;
        self.clamp();
    }

    /// Move in (positive) or out (negative) by wheel lines.
    pub fn zoom(&mut self, lines: f32) {
        self.distance -= lines * self.limits.zoom_step;
        self.clamp();
    }

    /// Apply this tick's mouse input.
    pub fn apply_input(&mut self, input: &Input) {
        self.orbiting = input.mouse_held(MouseButton::Right);
        if self.orbiting {
            self.orbit(input.mouse_delta());
        }
        let wheel = input.scroll_delta();
        if wheel != 0.0 {
            self.zoom(wheel);
        }
    }

    fn clamp(&mut self) {
        let limit = self.limits.max_pitch;
        // NaN from a bogus delta would survive `clamp`; reset it instead.
        if !self.pitch.is_finite() {
            self.pitch = 0.0;
        }
        if !self.yaw.is_finite() {
            self.yaw = 0.0;
        }
        if !self.distance.is_finite() {
            self.distance = self.limits.min_distance;
        }
        self.pitch = self.pitch.clamp(-limit, limit);
        self.yaw %= 360.0;
        self.distance = self
            .distance
            .clamp(self.limits.min_distance, self.limits.max_distance);
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(CameraLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn default_looks_down_positive_z() {
        let cam = CameraRig::default();
        assert!(approx(cam.position(), Vec3::new(0.0, 0.0, 5.0)));
        assert_eq!(cam.target(), Vec3::ZERO);
    }

    #[test]
    fn position_follows_spherical_formula() {
        let mut cam = CameraRig::default();
        // Drag up by 150px -> pitch -30°, left by 450px -> yaw +90°
        cam.orbit(Vec2::new(-450.0, 150.0));
        assert!((cam.pitch() + 30.0).abs() < 1e-4);
        assert!((cam.yaw() - 90.0).abs() < 1e-4);

        let p = (-30.0f32).to_radians();
        let expected = 5.0 * Vec3::new(p.cos(), p.sin(), 0.0);
        assert!(approx(cam.position(), expected));
    }

    #[test]
    fn pitch_and_distance_are_clamped() {
        let mut cam = CameraRig::default();
        cam.orbit(Vec2::new(0.0, -10_000.0));
        assert_eq!(cam.pitch(), 89.0);
        cam.orbit(Vec2::new(0.0, 20_000.0));
        assert_eq!(cam.pitch(), -89.0);

        cam.zoom(1000.0);
        assert_eq!(cam.distance(), 2.0);
        cam.zoom(-1000.0);
        assert_eq!(cam.distance(), 20.0);

        cam.orbit(Vec2::new(f32::NAN, f32::INFINITY));
        assert!(cam.pitch().is_finite());
        assert!(cam.yaw().is_finite());
    }

    #[test]
    fn focus_loss_mid_drag_stops_orbit() {
        use winit::event::WindowEvent;

        let mut cam = CameraRig::default();
        let mut input = Input::new();
        input.button_down(MouseButton::Right);
        cam.apply_input(&input);
        assert!(cam.is_orbiting());
        input.begin_tick();

        input.handle_event(&WindowEvent::Focused(false));
        assert!(input.mouse_released(MouseButton::Right));
        // The real release arrives while unfocused and finds nothing held
        input.button_up(MouseButton::Right);
        cam.apply_input(&input);
        assert!(!cam.is_orbiting());
        input.begin_tick();

        input.move_mouse(Vec2::new(0.0, 50.0));
        cam.apply_input(&input);
        assert!(!cam.is_orbiting());
        assert_eq!(cam.pitch(), 0.0);
    }

    #[test]
    fn drag_only_orbits_while_right_button_held() {
        let mut cam = CameraRig::default();
        let mut input = Input::new();

        input.move_mouse(Vec2::new(10.0, 10.0));
        cam.apply_input(&input);
        assert_eq!(cam.pitch(), 0.0);
        input.begin_tick();

        input.button_down(MouseButton::Right);
        input.move_mouse(Vec2::new(10.0, 10.0));
        cam.apply_input(&input);
        assert!(cam.is_orbiting());
        assert!((cam.pitch() + 2.0).abs() < 1e-5);
        assert!((cam.yaw() + 2.0).abs() < 1e-5);
        input.begin_tick();

        input.button_up(MouseButton::Right);
        cam.apply_input(&input);
        assert!(!cam.is_orbiting());
    }
}
