//! Expanding surface ripples.
//!
//! A ripple runs for `duration` seconds from its start time, then fades out
//! over a fixed [`FADE_WINDOW`]. Amplitude, duration and decay rate can be
//! changed at any time; they are read fresh every frame and are never
//! snapshotted at activation. Only the start time and center are captured.

use glam::Vec3;

/// Length of the fade tail after `duration`, in seconds.
pub const FADE_WINDOW: f32 = 2.0;

/// Height of the water plane the ripples live on.
pub const WATER_LEVEL: f32 = -1.0;

pub const AMPLITUDE_RANGE: (f32, f32) = (0.0, 1.0);
pub const DURATION_RANGE: (f32, f32) = (1.0, 20.0);
pub const DECAY_RANGE: (f32, f32) = (0.5, 0.99);

/// Where a ripple is in its timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RippleStatus {
    /// Never activated, or switched off.
    Inactive,
    /// Within `duration`; seconds remaining.
    Running { time_left: f32 },
    /// Within the fade tail; seconds of fade remaining.
    Fading { fade_left: f32 },
    /// Past the fade tail. Still switched on, but has no visible effect.
    Stopped,
}

#[derive(Debug, Clone)]
pub struct RippleEffect {
    enabled: bool,
    start_time: f32,
    center: Vec3,
    amplitude: f32,
    duration: f32,
    /// Fraction of amplitude kept per second.
    decay_rate: f32,
}

impl RippleEffect {
    pub fn new() -> Self {
        Self {
            enabled: false,
            start_time: 0.0,
            center: Vec3::new(0.0, WATER_LEVEL, 0.0),
            amplitude: 0.5,
            duration: 5.0,
            decay_rate: 0.9,
        }
    }

    /// Start (or restart) the ripple at `center`, projected onto the water.
    pub fn activate(&mut self, center: Vec3, now: f32) {
        self.enabled = true;
        self.start_time = now;
        self.center = Vec3::new(center.x, WATER_LEVEL, center.z);
    }

    pub fn deactivate(&mut self) {
        self.enabled = false;
    }

    /// Switch off if currently active, otherwise activate at `center`.
    /// Returns whether the ripple is active afterwards.
    pub fn toggle(&mut self, center: Vec3, now: f32) -> bool {
        if self.is_active(now) {
            self.deactivate();
            false
        } else {
            self.activate(center, now);
            true
        }
    }

    /// Switched on and not yet past `duration + FADE_WINDOW`.
    pub fn is_active(&self, now: f32) -> bool {
        self.enabled && now - self.start_time <= self.duration + FADE_WINDOW
    }

    pub fn status(&self, now: f32) -> RippleStatus {
        if !self.enabled {
            return RippleStatus::Inactive;
        }
        let elapsed = now - self.start_time;
        let time_left = self.duration - elapsed;
        if time_left > 0.0 {
            return RippleStatus::Running { time_left };
        }
        let fade_left = FADE_WINDOW - (elapsed - self.duration);
        if fade_left > 0.0 {
            RippleStatus::Fading { fade_left }
        } else {
            RippleStatus::Stopped
        }
    }

    #[inline]
    pub fn start_time(&self) -> f32 {
        self.start_time
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        self.center
    }

    #[inline]
    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[inline]
    pub fn decay_rate(&self) -> f32 {
        self.decay_rate
    }

    pub fn set_amplitude(&mut self, amplitude: f32) {
        self.amplitude = clamp_finite(amplitude, AMPLITUDE_RANGE, self.amplitude);
    }

    pub fn set_duration(&mut self, duration: f32) {
        self.duration = clamp_finite(duration, DURATION_RANGE, self.duration);
    }

    pub fn set_decay_rate(&mut self, decay_rate: f32) {
        self.decay_rate = clamp_finite(decay_rate, DECAY_RANGE, self.decay_rate);
    }

    /// Move the center along the water plane.
    pub fn nudge_center(&mut self, dx: f32, dz: f32) {
        self.center.x += dx;
        self.center.z += dz;
    }
}

impl Default for RippleEffect {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_finite(value: f32, (min, max): (f32, f32), fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}
