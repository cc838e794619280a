//! Frame pass schedule and the history lifecycle.
//!
//! Every frame runs the same chain:
//!
//! ```text
//! Trace ──► Noisy, Normals
//! Denoise(Noisy, Normals, History) ──► Denoised
//! Taa(Denoised, History) ──► TaaOutput
//! [HistoryReset: Denoised ──► History]      every `cadence` frames
//! HistoryCommit: TaaOutput ──► History
//! Present(TaaOutput) ──► swapchain
//! ```
//!
//! A reset frame writes History twice. The commit lands last, so after any
//! frame History holds that frame's TAA output either way. The reset only
//! matters if something reads History between the two writes, and nothing
//! does.
//!
//! The schedule is plain data so it can be run by the GPU executor or by
//! [`RecordingExecutor`], which models target contents without a device.

use std::collections::HashMap;

/// History is reset from the denoised image every this many frames.
pub const DEFAULT_HISTORY_CADENCE: u32 = 3;

/// Offscreen render targets, plus the swapchain image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Noisy,
    Normals,
    History,
    Denoised,
    TaaOutput,
    Swapchain,
}

impl Target {
    /// The five offscreen targets, in allocation order.
    pub const OFFSCREEN: [Target; 5] = [
        Target::Noisy,
        Target::Normals,
        Target::History,
        Target::Denoised,
        Target::TaaOutput,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Target::Noisy => "Noisy Target",
            Target::Normals => "Normals Target",
            Target::History => "History Target",
            Target::Denoised => "Denoised Target",
            Target::TaaOutput => "TAA Output Target",
            Target::Swapchain => "Swapchain",
        }
    }
}

/// One step of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassStep {
    Trace,
    Denoise,
    Taa,
    HistoryReset,
    HistoryCommit,
    Present,
}

impl PassStep {
    /// Targets sampled (or copied from) by this step.
    pub fn reads(&self) -> &'static [Target] {
        match self {
            PassStep::Trace => &[],
            PassStep::Denoise => &[Target::Noisy, Target::Normals, Target::History],
            PassStep::Taa => &[Target::Denoised, Target::History],
            PassStep::HistoryReset => &[Target::Denoised],
            PassStep::HistoryCommit => &[Target::TaaOutput],
            PassStep::Present => &[Target::TaaOutput],
        }
    }

    /// Targets written by this step.
    pub fn writes(&self) -> &'static [Target] {
        match self {
            PassStep::Trace => &[Target::Noisy, Target::Normals],
            PassStep::Denoise => &[Target::Denoised],
            PassStep::Taa => &[Target::TaaOutput],
            PassStep::HistoryReset | PassStep::HistoryCommit => &[Target::History],
            PassStep::Present => &[Target::Swapchain],
        }
    }
}

/// Whether `frame` refreshes History from the denoised image. A cadence of
/// zero never resets.
pub fn is_reset_frame(frame: u64, cadence: u32) -> bool {
    cadence != 0 && frame % cadence as u64 == 0
}

/// Steps for `frame`, in execution order.
pub fn schedule(frame: u64, cadence: u32) -> Vec<PassStep> {
    let mut steps = Vec::with_capacity(6);
    steps.extend([PassStep::Trace, PassStep::Denoise, PassStep::Taa]);
    if is_reset_frame(frame, cadence) {
        steps.push(PassStep::HistoryReset);
    }
    steps.extend([PassStep::HistoryCommit, PassStep::Present]);
    steps
}

/// Something that can carry out pass steps.
pub trait PassExecutor {
    fn execute(&mut self, step: PassStep);
}

/// Run the whole schedule for `frame` on `executor`.
pub fn run_frame<E: PassExecutor + ?Sized>(executor: &mut E, frame: u64, cadence: u32) {
    for step in schedule(frame, cadence) {
        executor.execute(step);
    }
}

/// What a target holds: the step that produced it and on which frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Content {
    pub producer: PassStep,
    pub frame: u64,
}

/// Executor that tracks target contents instead of touching a GPU.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    frame: u64,
    contents: HashMap<Target, Content>,
    log: Vec<(u64, PassStep)>,
    /// History as seen by each TAA step, per frame.
    taa_history: Vec<(u64, Option<Content>)>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one full frame.
    pub fn run(&mut self, frame: u64, cadence: u32) {
        self.frame = frame;
        run_frame(self, frame, cadence);
    }

    pub fn contents(&self, target: Target) -> Option<Content> {
        self.contents.get(&target).copied()
    }

    /// Every executed step with its frame number.
    pub fn log(&self) -> &[(u64, PassStep)] {
        &self.log
    }

    /// History content sampled by the TAA step of each frame.
    pub fn taa_history(&self) -> &[(u64, Option<Content>)] {
        &self.taa_history
    }
}

impl PassExecutor for RecordingExecutor {
    fn execute(&mut self, step: PassStep) {
        self.log.push((self.frame, step));
        let produced = Content { producer: step, frame: self.frame };

        match step {
            PassStep::Taa => {
                let history = self.contents(Target::History);
                self.taa_history.push((self.frame, history));
                self.contents.insert(Target::TaaOutput, produced);
            }
            PassStep::HistoryReset => {
                if let Some(c) = self.contents(Target::Denoised) {
                    self.contents.insert(Target::History, c);
                }
            }
            PassStep::HistoryCommit => {
                if let Some(c) = self.contents(Target::TaaOutput) {
                    self.contents.insert(Target::History, c);
                }
            }
            PassStep::Present => {
                if let Some(c) = self.contents(Target::TaaOutput) {
                    self.contents.insert(Target::Swapchain, c);
                }
            }
            PassStep::Trace | PassStep::Denoise => {
                for &target in step.writes() {
                    self.contents.insert(target, produced);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_frames_follow_cadence() {
        let resets: Vec<u64> = (0..10).filter(|&f| is_reset_frame(f, 3)).collect();
        assert_eq!(resets, vec![0, 3, 6, 9]);
        assert!(!is_reset_frame(0, 0));
        assert!(is_reset_frame(7, 1));
    }

    #[test]
    fn schedule_order() {
        use PassStep::*;
        assert_eq!(schedule(0, 3), vec![Trace, Denoise, Taa, HistoryReset, HistoryCommit, Present]);
        assert_eq!(schedule(1, 3), vec![Trace, Denoise, Taa, HistoryCommit, Present]);
    }

    #[test]
    fn every_read_was_written_earlier_in_frame_or_before() {
        for frame in 0..6 {
            let steps = schedule(frame, 3);
            for (i, step) in steps.iter().enumerate() {
                for read in step.reads() {
                    if *read == Target::History {
                        continue;
                    }
                    assert!(
                        steps[..i].iter().any(|s| s.writes().contains(read)),
                        "{step:?} reads {read:?} before it is written"
                    );
                }
            }
        }
    }

    #[test]
    fn every_offscreen_target_is_written_each_frame() {
        let steps = schedule(1, 3);
        for target in Target::OFFSCREEN {
            assert!(steps.iter().any(|s| s.writes().contains(&target)), "{}", target.label());
        }
    }

    #[test]
    fn recording_executor_tracks_history() {
        let mut exec = RecordingExecutor::new();
        exec.run(0, 3);
        let history = exec.contents(Target::History).unwrap();
        assert_eq!(history, Content { producer: PassStep::Taa, frame: 0 });
        assert_eq!(exec.contents(Target::Swapchain), Some(history));
        // The first TAA sees no history at all
        assert_eq!(exec.taa_history()[0], (0, None));
    }
}
