//! Integration tests for the falling-sphere state machine.
//!
//! These drive `MotionSimulator` the way the tick loop does: accumulated run
//! time plus a per-tick step.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tidewave::{MotionConfig, MotionPhase, MotionSimulator, SettleTimeout};

const DT: f32 = 1.0 / 60.0;

/// Step until `limit` ticks have run, returning (tick, contact) for every
/// contact fired.
fn run_fixed(sim: &mut MotionSimulator, limit: usize) -> Vec<(usize, tidewave::Contact)> {
    let mut contacts = Vec::new();
    for tick in 1..=limit {
        if let Some(c) = sim.step(tick as f32 * DT, DT) {
            contacts.push((tick, c));
        }
    }
    contacts
}

// ============================================================================
// Free-fall scenario
// ============================================================================

#[test]
fn test_free_fall_hits_surface_on_tick_62() {
    let mut sim = MotionSimulator::default();

    for tick in 1..62 {
        assert!(sim.step(tick as f32 * DT, DT).is_none(), "early contact on tick {tick}");
        assert_eq!(sim.phase(), MotionPhase::FreeFall);
    }
    let expected_y = 10.0 - 61.0 * 62.0 / 360.0;
    assert!((sim.position().y - expected_y).abs() < 1e-3);

    let contact = sim.step(62.0 * DT, DT).expect("contact on tick 62");
    assert_eq!(sim.phase(), MotionPhase::Settling { descending: false });
    assert_eq!(contact.position, Vec3::new(0.0, -0.8, 0.0));
    assert!((contact.time - 62.0 * DT).abs() < 1e-5);

    // v = g·dt·62 = 10.333..., halved on impact
    assert!((sim.velocity() - 5.1667).abs() < 1e-3);
    assert_eq!(sim.position().y, -0.8);
}

#[test]
fn test_contact_fires_once_over_whole_run() {
    let mut sim = MotionSimulator::default();
    let contacts = run_fixed(&mut sim, 60 * 30);
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].0, 62);
    assert_eq!(sim.phase(), MotionPhase::Resting);
}

#[test]
fn test_rest_is_pinned_to_surface() {
    let mut sim = MotionSimulator::default();
    run_fixed(&mut sim, 60 * 30);
    assert_eq!(sim.position(), Vec3::new(0.0, -0.8, 0.0));
    assert_eq!(sim.velocity(), 0.0);

    for tick in 0..120 {
        sim.step(30.0 + tick as f32 * DT, DT);
        assert_eq!(sim.phase(), MotionPhase::Resting);
        assert_eq!(sim.position().y, -0.8);
    }
}

// ============================================================================
// Randomized step sequences
// ============================================================================

#[test]
fn test_phases_are_monotonic_under_random_steps() {
    let mut rng = StdRng::seed_from_u64(0x71de);
    for _ in 0..50 {
        let mut sim = MotionSimulator::default();
        let mut now = 0.0;
        let mut rank = sim.phase().rank();

        for _ in 0..4000 {
            let dt = rng.gen_range(0.001..0.05);
            now += dt;
            sim.step(now, dt);

            let next = sim.phase().rank();
            assert!(next >= rank, "phase went backwards: {rank} -> {next}");
            rank = next;
        }
        assert_eq!(sim.phase(), MotionPhase::Resting);
    }
}

#[test]
fn test_contact_is_first_surface_crossing_under_random_steps() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..50 {
        let mut sim = MotionSimulator::default();
        let mut now = 0.0;
        let mut contacts = 0;

        for _ in 0..4000 {
            let before = sim.position().y;
            let was_falling = sim.phase() == MotionPhase::FreeFall;
            let dt = rng.gen_range(0.001..0.05);
            now += dt;

            if let Some(contact) = sim.step(now, dt) {
                contacts += 1;
                assert!(was_falling);
                assert!(before > -0.8);
                assert_eq!(contact.position.y, -0.8);
                assert_eq!(contact.time, now);
            }
        }
        assert_eq!(contacts, 1);
    }
}

#[test]
fn test_invalid_steps_interleaved_are_ignored() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut reference = MotionSimulator::default();
    let mut noisy = MotionSimulator::default();
    let mut now = 0.0;

    for _ in 0..600 {
        now += DT;
        reference.step(now, DT);

        let bad = match rng.gen_range(0..3) {
            0 => 0.0,
            1 => -DT,
            _ => f32::NAN,
        };
        assert!(noisy.step(now, bad).is_none());
        noisy.step(now, DT);
    }
    assert_eq!(reference.position(), noisy.position());
    assert_eq!(reference.phase(), noisy.phase());
}

// ============================================================================
// Settle timeout policy
// ============================================================================

#[test]
fn test_force_rest_rests_by_settle_duration() {
    let mut sim = MotionSimulator::default();
    run_fixed(&mut sim, 62);
    let settle_start = 62.0 * DT;

    let mut tick = 62;
    while sim.phase() != MotionPhase::Resting {
        tick += 1;
        sim.step(tick as f32 * DT, DT);
    }
    let rested_at = tick as f32 * DT;
    assert!(rested_at - settle_start <= 5.0 + DT * 1.5);
}

#[test]
fn test_keep_oscillating_still_comes_to_rest() {
    let config = MotionConfig {
        timeout: SettleTimeout::KeepOscillating,
        ..MotionConfig::default()
    };
    let mut sim = MotionSimulator::new(config, Vec3::new(0.0, 10.0, 0.0), 1.0);
    run_fixed(&mut sim, 60 * 60);
    assert_eq!(sim.phase(), MotionPhase::Resting);
    assert_eq!(sim.position().y, -0.8);
}
