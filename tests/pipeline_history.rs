//! Integration tests for the pass schedule and the history lifecycle,
//! run against the recording executor.

use tidewave::passes::{is_reset_frame, schedule, Content};
use tidewave::{PassExecutor, PassStep, RecordingExecutor, Target};

fn taa_of(frame: u64) -> Content {
    Content { producer: PassStep::Taa, frame }
}

// ============================================================================
// Schedule
// ============================================================================

#[test]
fn test_frame_zero_is_a_reset_frame() {
    let steps = schedule(0, 3);
    assert!(steps.contains(&PassStep::HistoryReset));
}

#[test]
fn test_reset_precedes_commit_and_present_is_last() {
    for frame in 0..12 {
        let steps = schedule(frame, 3);
        assert_eq!(steps.first(), Some(&PassStep::Trace));
        assert_eq!(steps.last(), Some(&PassStep::Present));

        let commit = steps.iter().position(|s| *s == PassStep::HistoryCommit).unwrap();
        let taa = steps.iter().position(|s| *s == PassStep::Taa).unwrap();
        assert!(taa < commit);
        if let Some(reset) = steps.iter().position(|s| *s == PassStep::HistoryReset) {
            assert!(reset < commit);
            assert!(is_reset_frame(frame, 3));
        }
    }
}

#[test]
fn test_zero_cadence_never_resets() {
    for frame in 0..10 {
        assert!(!schedule(frame, 0).contains(&PassStep::HistoryReset));
    }
}

// ============================================================================
// History invariant
// ============================================================================

#[test]
fn test_history_holds_taa_output_after_every_frame() {
    let mut exec = RecordingExecutor::new();
    for frame in 0..30 {
        exec.run(frame, 3);
        assert_eq!(exec.contents(Target::History), Some(taa_of(frame)));
        assert_eq!(exec.contents(Target::Swapchain), Some(taa_of(frame)));
    }
}

#[test]
fn test_taa_reads_previous_frame_history() {
    let mut exec = RecordingExecutor::new();
    for frame in 0..30 {
        exec.run(frame, 3);
    }

    let seen = exec.taa_history();
    assert_eq!(seen.len(), 30);
    assert_eq!(seen[0], (0, None));
    for &(frame, history) in &seen[1..] {
        assert_eq!(history, Some(taa_of(frame - 1)), "frame {frame}");
    }
}

#[test]
fn test_reset_writes_denoised_before_commit() {
    let mut exec = RecordingExecutor::new();
    exec.run(0, 3);
    exec.run(1, 3);
    exec.run(2, 3);
    exec.run(3, 3);

    let frame3: Vec<PassStep> = exec
        .log()
        .iter()
        .filter(|(f, _)| *f == 3)
        .map(|(_, s)| *s)
        .collect();
    assert_eq!(
        frame3,
        vec![
            PassStep::Trace,
            PassStep::Denoise,
            PassStep::Taa,
            PassStep::HistoryReset,
            PassStep::HistoryCommit,
            PassStep::Present,
        ]
    );

    let history_writes = exec
        .log()
        .iter()
        .filter(|(_, s)| s.writes().contains(&Target::History))
        .count();
    // Two writes on frames 0 and 3, one on frames 1 and 2
    assert_eq!(history_writes, 6);
}

#[test]
fn test_history_holds_denoised_between_reset_and_commit() {
    let mut exec = RecordingExecutor::new();
    let denoised = Content { producer: PassStep::Denoise, frame: 0 };

    for step in schedule(0, 3) {
        exec.execute(step);
        match step {
            PassStep::HistoryReset => {
                assert_eq!(exec.contents(Target::Denoised), Some(denoised));
                assert_eq!(exec.contents(Target::History), Some(denoised));
            }
            PassStep::HistoryCommit | PassStep::Present => {
                assert_eq!(exec.contents(Target::History), Some(taa_of(0)));
            }
            _ => {}
        }
    }
}

#[test]
fn test_cadence_does_not_change_final_history() {
    for cadence in [0, 1, 2, 3, 7] {
        let mut exec = RecordingExecutor::new();
        for frame in 0..10 {
            exec.run(frame, cadence);
        }
        assert_eq!(exec.contents(Target::History), Some(taa_of(9)), "cadence {cadence}");
    }
}
