//! Frame timing.
//!
//! Run time is the sum of all deltas handed to the simulation, not the wall
//! clock. With a fixed step the whole scene (motion, ripples, shader time) is
//! therefore reproducible tick for tick.
//!
//! # Example
//!
//! ```ignore
//! use tidewave::time::Time;
//!
//! let mut time = Time::new();
//! time.set_fixed_delta(Some(1.0 / 60.0));
//!
//! // In the tick loop:
//! let (run_time, dt) = time.update();
//! ```

use std::time::{Duration, Instant};

/// Upper bound on a single variable step, so a stalled frame (window drag,
/// debugger pause) does not launch the sphere through the floor.
pub const MAX_DELTA: f32 = 0.1;

/// Time tracking for the tick loop.
#[derive(Debug)]
pub struct Time {
    /// When the last tick occurred.
    last_tick: Instant,
    /// Accumulated simulation time in seconds.
    run_time: f32,
    /// Step used by the most recent tick.
    delta: f32,
    /// Number of ticks taken so far.
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    /// Fixed step for deterministic runs.
    fixed_delta: Option<f32>,
}

impl Time {
    /// Create a new time tracker starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_tick: now,
            run_time: 0.0,
            delta: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            fixed_delta: None,
        }
    }

    /// Advance one tick using the wall clock (or the fixed step, if set).
    ///
    /// Returns `(run_time, delta)`.
    pub fn update(&mut self) -> (f32, f32) {
        let now = Instant::now();
        let raw = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;

        let delta = self.fixed_delta.unwrap_or(raw.min(MAX_DELTA));
        self.advance(delta);

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        (self.run_time, self.delta)
    }

    /// Advance by an explicit step. Used by `update` and by headless tests.
    pub fn advance(&mut self, delta: f32) -> (f32, f32) {
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        self.delta = delta;
        self.run_time += delta;
        self.frame_count += 1;
        (self.run_time, self.delta)
    }

    /// Accumulated simulation time in seconds.
    #[inline]
    pub fn run_time(&self) -> f32 {
        self.run_time
    }

    /// Step of the most recent tick.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Ticks taken so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second, refreshed twice a second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Set a fixed step. Pass `None` to follow the wall clock.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta.filter(|d| d.is_finite() && *d > 0.0);
    }

    #[inline]
    pub fn fixed_delta(&self) -> Option<f32> {
        self.fixed_delta
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_time_new() {
        let time = Time::new();
        assert_eq!(time.frame(), 0);
        assert_eq!(time.run_time(), 0.0);
        assert!(time.fixed_delta().is_none());
    }

    #[test]
    fn test_time_update() {
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(10));
        let (run_time, delta) = time.update();

        assert!(run_time > 0.0);
        assert!(delta > 0.0);
        assert!(delta <= MAX_DELTA);
        assert_eq!(time.frame(), 1);
    }

    #[test]
    fn test_fixed_delta() {
        let mut time = Time::new();
        time.set_fixed_delta(Some(1.0 / 60.0));

        thread::sleep(Duration::from_millis(50));
        time.update();

        let expected = 1.0 / 60.0;
        assert!((time.delta() - expected).abs() < 0.0001);
        assert!((time.run_time() - expected).abs() < 0.0001);
    }

    #[test]
    fn test_run_time_is_sum_of_deltas() {
        let mut time = Time::new();
        for _ in 0..120 {
            time.advance(0.5 / 60.0);
        }
        assert!((time.run_time() - 1.0).abs() < 1e-4);
        assert_eq!(time.frame(), 120);
    }

    #[test]
    fn test_bad_deltas_do_not_move_time() {
        let mut time = Time::new();
        time.advance(-1.0);
        time.advance(f32::NAN);
        assert_eq!(time.run_time(), 0.0);
        assert_eq!(time.frame(), 2);

        time.set_fixed_delta(Some(0.0));
        assert!(time.fixed_delta().is_none());
    }
}
