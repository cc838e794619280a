//! CPU half of a frame.
//!
//! [`World`] owns all simulation state and is passed by `&mut` into
//! [`World::tick`] once per frame. The tick applies input, advances the
//! sphere, reacts to its contact with the water, applies the ripple keys
//! (after the contact, so they take precedence), and captures the
//! [`FrameSnapshot`] the GPU side uploads.

use glam::{Vec2, Vec3};

use crate::camera::{CameraLimits, CameraRig};
use crate::input::{Input, KeyCode};
use crate::motion::{Contact, MotionConfig, MotionSimulator};
use crate::ripple::RippleEffect;
use crate::scene::SceneState;
use crate::uniforms::FrameSnapshot;

const RIPPLE_CENTER_STEP: f32 = 0.1;
const RIPPLE_AMPLITUDE_STEP: f32 = 0.01;
const RIPPLE_DURATION_STEP: f32 = 0.2;
const RIPPLE_DECAY_STEP: f32 = 0.01;

/// Result of one tick.
#[derive(Debug, Clone)]
pub struct TickOutput {
    pub snapshot: FrameSnapshot,
    /// Set on the single tick where the sphere hits the water.
    pub contact: Option<Contact>,
    /// New viewport size, if a resize was applied this tick.
    pub resized: Option<(u32, u32)>,
}

#[derive(Debug, Clone)]
pub struct World {
    pub camera: CameraRig,
    pub scene: SceneState,
    pub motion: MotionSimulator,
    pub ripple: RippleEffect,
    resolution: Vec2,
}

impl World {
    pub fn new(width: u32, height: u32, motion: MotionConfig) -> Self {
        let scene = SceneState::new();
        let ball = scene.spheres()[0];
        Self {
            camera: CameraRig::new(CameraLimits::default()),
            motion: MotionSimulator::new(motion, ball.position, ball.radius),
            scene,
            ripple: RippleEffect::new(),
            resolution: Vec2::new(width as f32, height as f32),
        }
    }

    /// Viewport size in pixels as pushed to the shaders.
    #[inline]
    pub fn resolution(&self) -> Vec2 {
        self.resolution
    }

    /// Run the CPU side of one frame at run time `now`.
    pub fn tick(&mut self, input: &mut Input, now: f32, dt: f32) -> TickOutput {
        let resized = input.take_resize();
        if let Some((width, height)) = resized {
            self.resolution = Vec2::new(width as f32, height as f32);
        }

        self.camera.apply_input(input);
        self.scene.apply_controls(input, dt);

        let contact = self.motion.step(now, dt);
        if let Some(contact) = contact {
            log::info!(
                "sphere hit the water at t={:.3}s ({:.2}, {:.2}, {:.2})",
                contact.time,
                contact.position.x,
                contact.position.y,
                contact.position.z
            );
            self.ripple.activate(contact.position, now);
        }
        // Key commands run after the contact so a V on the contact tick wins.
        self.apply_ripple_controls(input, now);

        if let Some(ball) = self.scene.sphere_mut(0) {
            ball.position = self.motion.position();
        }

        let snapshot = FrameSnapshot::capture(&self.camera, &self.scene, &self.ripple, self.resolution, now);
        TickOutput { snapshot, contact, resized }
    }

    fn apply_ripple_controls(&mut self, input: &Input, now: f32) {
        let held = |key| input.key_held(key);
        let ripple = &mut self.ripple;
        let object = self.motion.position();

        if input.key_pressed(KeyCode::V) {
            let on = ripple.toggle(object, now);
            log::info!("ripple {}", if on { "on" } else { "off" });
        }
        if input.key_pressed(KeyCode::R) {
            ripple.activate(object, now);
        }

        if held(KeyCode::LeftControl) {
            let mut nudge = Vec3::ZERO;
            if held(KeyCode::W) {
                nudge.z -= RIPPLE_CENTER_STEP;
            }
            if held(KeyCode::S) {
                nudge.z += RIPPLE_CENTER_STEP;
            }
            if held(KeyCode::A) {
                nudge.x -= RIPPLE_CENTER_STEP;
            }
            if held(KeyCode::D) {
                nudge.x += RIPPLE_CENTER_STEP;
            }
            ripple.nudge_center(nudge.x, nudge.z);
        }

        if held(KeyCode::LeftAlt) {
            if held(KeyCode::Up) {
                ripple.set_amplitude(ripple.amplitude() + RIPPLE_AMPLITUDE_STEP);
            }
            if held(KeyCode::Down) {
                ripple.set_amplitude(ripple.amplitude() - RIPPLE_AMPLITUDE_STEP);
            }
            if held(KeyCode::Right) {
                ripple.set_duration(ripple.duration() + RIPPLE_DURATION_STEP);
            }
            if held(KeyCode::Left) {
                ripple.set_duration(ripple.duration() - RIPPLE_DURATION_STEP);
            }
        }
        if held(KeyCode::RightAlt) {
            if held(KeyCode::Up) {
                ripple.set_decay_rate(ripple.decay_rate() + RIPPLE_DECAY_STEP);
            }
            if held(KeyCode::Down) {
                ripple.set_decay_rate(ripple.decay_rate() - RIPPLE_DECAY_STEP);
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(1280, 720, MotionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_zero_follows_motion() {
        let mut world = World::default();
        let mut input = Input::new();
        let out = world.tick(&mut input, 0.1, 0.1);
        assert!(out.contact.is_none());
        assert_eq!(world.scene.spheres()[0].position, world.motion.position());
        assert!(world.motion.position().y < 10.0);
        assert_eq!(out.snapshot.spheres[0].position, world.motion.position().to_array());
    }

    #[test]
    fn restart_uses_object_position() {
        let mut world = World::default();
        let mut input = Input::new();
        input.key_down(KeyCode::R);
        world.tick(&mut input, 1.0, 0.0);
        assert!(world.ripple.is_active(1.0));
        assert_eq!(world.ripple.center(), Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(world.ripple.start_time(), 1.0);
    }

    #[test]
    fn ripple_parameter_keys() {
        let mut world = World::default();
        let mut input = Input::new();
        input.key_down(KeyCode::LeftAlt);
        input.key_down(KeyCode::Up);
        input.key_down(KeyCode::Right);
        world.tick(&mut input, 0.0, 0.0);
        assert!((world.ripple.amplitude() - 0.51).abs() < 1e-6);
        assert!((world.ripple.duration() - 5.2).abs() < 1e-6);
        assert_eq!(world.ripple.decay_rate(), 0.9);

        input.key_up(KeyCode::LeftAlt);
        input.key_down(KeyCode::RightAlt);
        input.begin_tick();
        world.tick(&mut input, 0.0, 0.0);
        assert!((world.ripple.decay_rate() - 0.91).abs() < 1e-6);
        assert!((world.ripple.amplitude() - 0.51).abs() < 1e-6);
    }

    #[test]
    fn toggle_on_contact_tick_overrides_contact() {
        let mut world = World::default();
        let mut input = Input::new();
        let dt = 1.0 / 60.0;
        for tick in 1..62 {
            assert!(world.tick(&mut input, tick as f32 * dt, dt).contact.is_none());
        }

        let now = 62.0 * dt;
        input.key_down(KeyCode::V);
        let out = world.tick(&mut input, now, dt);
        assert!(out.contact.is_some());
        assert!(!world.ripple.is_active(now));
        assert_eq!(out.snapshot.enable_waves, 0);
    }

    #[test]
    fn ctrl_moves_ripple_center() {
        let mut world = World::default();
        let mut input = Input::new();
        input.key_down(KeyCode::LeftControl);
        input.key_down(KeyCode::W);
        input.key_down(KeyCode::D);
        world.tick(&mut input, 0.0, 0.0);
        let c = world.ripple.center();
        assert!((c.x - 0.1).abs() < 1e-6);
        assert!((c.z + 0.1).abs() < 1e-6);
        // Ctrl+W must not steer the beam
        assert_eq!(world.scene.beam.direction, SceneState::new().beam.direction);
    }
}
