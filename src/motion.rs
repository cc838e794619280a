//! Falling-sphere motion.
//!
//! The dynamic sphere goes through three phases, strictly in order:
//!
//! | Phase      | Kinematics                                               | Leaves when                           |
//! |------------|----------------------------------------------------------|---------------------------------------|
//! | `FreeFall` | `v += g·dt`, `y -= 2·v·dt`                               | `y <= surface` (fires [`Contact`])    |
//! | `Settling` | damped bob between `bottom` and `surface`                | slow at surface, late, or timed out   |
//! | `Resting`  | pinned to `surface`, `v = 0`                             | never                                 |
//!
//! Velocity is measured downwards (`y -= v·dt`), so a positive velocity
//! sinks the sphere.
//!
//! [`integrate`] is the whole state machine as a pure function of
//! `(phase, body, elapsed, dt)`; [`MotionSimulator`] adds the phase clock and
//! the contact latch on top of it.

use glam::Vec3;

/// Current phase of the sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionPhase {
    FreeFall,
    /// Bobbing after impact. The first half-cycle after impact is the
    /// ascending (buoyancy) one.
    Settling { descending: bool },
    Resting,
}

impl MotionPhase {
    /// Position in the FreeFall → Settling → Resting order.
    pub fn rank(&self) -> u8 {
        match self {
            MotionPhase::FreeFall => 0,
            MotionPhase::Settling { .. } => 1,
            MotionPhase::Resting => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MotionPhase::FreeFall => "free-fall",
            MotionPhase::Settling { descending: true } => "settling (sinking)",
            MotionPhase::Settling { descending: false } => "settling (rising)",
            MotionPhase::Resting => "resting",
        }
    }
}

/// What happens when the settle duration runs out while the sphere is still
/// bobbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettleTimeout {
    /// Pin the sphere at the surface on the first tick past the duration.
    #[default]
    ForceRest,
    /// Keep bobbing with the damping factor held at its floor until the
    /// slow-at-surface exit fires.
    KeepOscillating,
}

/// Physical constants for the motion. Defaults reproduce the reference feel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionConfig {
    pub gravity: f32,
    /// Height where the sphere floats; also the impact threshold.
    pub water_surface: f32,
    /// Lowest point of a bob.
    pub water_bottom: f32,
    pub float_strength: f32,
    pub damping: f32,
    /// Length of the settling phase in seconds.
    pub settle_duration: f32,
    /// Fraction of velocity kept on impact.
    pub impact_retention: f32,
    /// Gravity scale while sinking through water.
    pub water_gravity_scale: f32,
    /// Below this speed at the surface the sphere comes to rest.
    pub rest_speed: f32,
    /// Past this fraction of the settle duration the sphere rests at the
    /// next surface hit regardless of speed.
    pub rest_progress: f32,
    pub timeout: SettleTimeout,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            gravity: 10.0,
            water_surface: -0.8,
            water_bottom: -1.0,
            float_strength: 3.0,
            damping: 0.7,
            settle_duration: 5.0,
            impact_retention: 0.5,
            water_gravity_scale: 0.3,
            rest_speed: 0.5,
            rest_progress: 0.8,
            timeout: SettleTimeout::ForceRest,
        }
    }
}

/// Vertical state of the sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub y: f32,
    /// Downward velocity.
    pub velocity: f32,
}

/// Result of one integration step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub phase: MotionPhase,
    pub body: Body,
    /// The sphere crossed the surface from above during this step.
    pub impact: bool,
}

/// Damping factor for a settling phase that has run for `elapsed` seconds:
/// 1.0 at entry, 0.2 at the end of the duration, held at 0.2 afterwards.
pub fn damping_factor(elapsed: f32, duration: f32) -> f32 {
    let progress = (elapsed / duration).clamp(0.0, 1.0);
    1.0 - 0.8 * progress
}

/// Advance the state machine by `dt`.
///
/// `elapsed` is the time spent in `Settling` so far (ignored in other
/// phases).
pub fn integrate(phase: MotionPhase, body: Body, cfg: &MotionConfig, elapsed: f32, dt: f32) -> Step {
    let Body { mut y, mut velocity } = body;

    match phase {
        MotionPhase::FreeFall => {
            velocity += cfg.gravity * dt;
            y -= velocity * dt * 2.0;

            if y <= cfg.water_surface {
                return Step {
                    phase: MotionPhase::Settling { descending: false },
                    body: Body {
                        y: cfg.water_surface,
                        velocity: velocity * cfg.impact_retention,
                    },
                    impact: true,
                };
            }
            Step { phase, body: Body { y, velocity }, impact: false }
        }

        MotionPhase::Settling { descending } => {
            if elapsed >= cfg.settle_duration && cfg.timeout == SettleTimeout::ForceRest {
                return rest(cfg);
            }

            let progress = elapsed / cfg.settle_duration;
            let factor = damping_factor(elapsed, cfg.settle_duration);

            if descending {
                velocity += cfg.gravity * cfg.water_gravity_scale * factor * dt;
                y -= velocity * dt * 2.0;

                if y <= cfg.water_bottom {
                    y = cfg.water_bottom;
                    velocity = -velocity * cfg.damping * factor;
                    return Step {
                        phase: MotionPhase::Settling { descending: false },
                        body: Body { y, velocity },
                        impact: false,
                    };
                }
            } else {
                velocity -= cfg.float_strength * 2.0 * factor * dt;
                y -= velocity * dt;

                if y >= cfg.water_surface {
                    y = cfg.water_surface;
                    velocity = -velocity * cfg.damping * (0.3 + factor * 0.2);

                    if velocity.abs() < cfg.rest_speed || progress > cfg.rest_progress {
                        return rest(cfg);
                    }
                    return Step {
                        phase: MotionPhase::Settling { descending: true },
                        body: Body { y, velocity },
                        impact: false,
                    };
                }
            }
            Step { phase, body: Body { y, velocity }, impact: false }
        }

        MotionPhase::Resting => rest(cfg),
    }
}

fn rest(cfg: &MotionConfig) -> Step {
    Step {
        phase: MotionPhase::Resting,
        body: Body { y: cfg.water_surface, velocity: 0.0 },
        impact: false,
    }
}

/// One-shot impact notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Sphere position at impact (already clamped to the surface).
    pub position: Vec3,
    /// Run time of the impact tick.
    pub time: f32,
}

/// Owns the dynamic sphere's position and drives it through the phases.
#[derive(Debug, Clone)]
pub struct MotionSimulator {
    config: MotionConfig,
    phase: MotionPhase,
    position: Vec3,
    velocity: f32,
    radius: f32,
    /// Run time at which `Settling` began.
    settle_start: Option<f32>,
    /// Set once the contact event has fired.
    contact_latched: bool,
}

impl MotionSimulator {
    pub fn new(config: MotionConfig, start: Vec3, radius: f32) -> Self {
        Self {
            config,
            phase: MotionPhase::FreeFall,
            position: start,
            velocity: 0.0,
            radius,
            settle_start: None,
            contact_latched: false,
        }
    }

    #[inline]
    pub fn phase(&self) -> MotionPhase {
        self.phase
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Downward velocity.
    #[inline]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    #[inline]
    pub fn has_contacted(&self) -> bool {
        self.contact_latched
    }

    /// Time spent in `Settling` at run time `now`.
    pub fn settle_elapsed(&self, now: f32) -> f32 {
        self.settle_start.map_or(0.0, |start| (now - start).max(0.0))
    }

    /// Advance to run time `now` by `dt`. Returns the contact event on the
    /// one tick where the sphere first reaches the surface.
    pub fn step(&mut self, now: f32, dt: f32) -> Option<Contact> {
        if !(dt.is_finite() && dt > 0.0) {
            return None;
        }

        let body = Body { y: self.position.y, velocity: self.velocity };
        let step = integrate(self.phase, body, &self.config, self.settle_elapsed(now), dt);

        if step.phase != self.phase {
            log::debug!(
                "sphere {} -> {} at t={:.3} (y={:.3}, v={:.3})",
                self.phase.name(),
                step.phase.name(),
                now,
                step.body.y,
                step.body.velocity
            );
        }
        if matches!(self.phase, MotionPhase::FreeFall) && matches!(step.phase, MotionPhase::Settling { .. }) {
            self.settle_start = Some(now);
        }

        self.phase = step.phase;
        self.position.y = step.body.y;
        self.velocity = step.body.velocity;

        if step.impact && !self.contact_latched {
            self.contact_latched = true;
            return Some(Contact { position: self.position, time: now });
        }
        None
    }
}

impl Default for MotionSimulator {
    fn default() -> Self {
        Self::new(MotionConfig::default(), Vec3::new(0.0, 10.0, 0.0), 1.0)
    }
}
