//! One-line status readout.
//!
//! Shown in the window title and logged at `info` level, at most once per
//! [`StatusThrottle`] interval.

use std::fmt::Write as _;

use crate::ripple::RippleStatus;
use crate::world::World;

/// Format the status line for the current state.
pub fn status_line(world: &World, now: f32, fps: f32) -> String {
    let mut line = String::with_capacity(160);
    let light = &world.scene.light;
    let beam = &world.scene.beam;
    let ripple = &world.ripple;
    let status = ripple.status(now);

    let _ = write!(line, "{fps:.0} FPS | Light Intensity: {:.1}", light.intensity);
    let _ = write!(
        line,
        " | Beam: {} | Angle: {:.2} | Intensity: {:.1}",
        on_off(beam.enabled),
        beam.angle,
        beam.intensity
    );
    let _ = write!(
        line,
        " | Waves: {} | Amp: {:.2} | Dur: {:.1}s | Decay: {:.0}%",
        on_off(status != RippleStatus::Inactive),
        ripple.amplitude(),
        ripple.duration(),
        ripple.decay_rate() * 100.0
    );
    match status {
        RippleStatus::Running { time_left } => {
            let _ = write!(line, " | Wave time left: {time_left:.1}s");
        }
        RippleStatus::Fading { fade_left } => {
            let _ = write!(line, " | Fading out: {fade_left:.1}s");
        }
        RippleStatus::Stopped => line.push_str(" | Waves stopped"),
        RippleStatus::Inactive => {}
    }
    let _ = write!(line, " | Sphere: {}", world.motion.phase().name());
    line
}

fn on_off(on: bool) -> &'static str {
    if on {
        "ON"
    } else {
        "OFF"
    }
}

/// Rate limiter for the status line.
#[derive(Debug, Clone)]
pub struct StatusThrottle {
    interval: f32,
    last: Option<f32>,
}

impl StatusThrottle {
    pub fn new(interval: f32) -> Self {
        Self { interval, last: None }
    }

    /// True on the first call and then whenever `interval` seconds have
    /// passed since the last `true`.
    pub fn ready(&mut self, now: f32) -> bool {
        match self.last {
            Some(last) if now - last < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn reports_ripple_timeline() {
        let mut world = World::default();
        let line = status_line(&world, 0.0, 59.6);
        assert!(line.starts_with("60 FPS"));
        assert!(line.contains("Beam: ON | Angle: 0.10 | Intensity: 100.0"));
        assert!(line.contains("Waves: OFF"));
        assert!(line.contains("Sphere: free-fall"));

        world.ripple.activate(Vec3::ZERO, 0.0);
        assert!(status_line(&world, 1.0, 60.0).contains("Wave time left: 4.0s"));
        assert!(status_line(&world, 6.0, 60.0).contains("Fading out: 1.0s"));
        let stopped = status_line(&world, 9.0, 60.0);
        assert!(stopped.contains("Waves: ON"));
        assert!(stopped.contains("Waves stopped"));
        assert!(stopped.contains("Decay: 90%"));
    }

    #[test]
    fn throttle() {
        let mut throttle = StatusThrottle::new(0.5);
        assert!(throttle.ready(0.0));
        assert!(!throttle.ready(0.2));
        assert!(throttle.ready(0.5));
        assert!(!throttle.ready(0.9));
        assert!(throttle.ready(1.1));
    }
}
