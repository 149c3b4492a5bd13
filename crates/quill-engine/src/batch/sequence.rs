//! Frame-to-frame step reconciliation.
//!
//! The sequence committed by the previous flush is the baseline. Each newly
//! closed step is compared against the slot under the cursor:
//! - equal content: keep the resident step (no upload), advance
//! - otherwise: drop everything from the cursor on, append the new step, upload it
//!
//! A single divergence invalidates the rest of the frame; there is no attempt to
//! re-synchronize later in the sequence.

use crate::backend::{DrawCall, GpuBackend};

use super::step::DrawStep;
use super::FlushStats;

pub struct StepSequence<B: GpuBackend> {
    steps: Vec<DrawStep<B>>,
    cursor: usize,
    stats: FlushStats,
}

impl<B: GpuBackend> Default for StepSequence<B> {
    fn default() -> Self {
        Self {
            steps: Vec::new(),
            cursor: 0,
            stats: FlushStats::default(),
        }
    }
}

impl<B: GpuBackend> StepSequence<B> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn steps(&self) -> &[DrawStep<B>] {
        &self.steps
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Reconciliation position within the previous frame's sequence.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Counters accumulated since the last [`begin_frame`](Self::begin_frame).
    #[inline]
    pub fn stats(&self) -> FlushStats {
        self.stats
    }

    /// Reconciles a finished batch against the slot under the cursor.
    pub fn close(&mut self, mut step: DrawStep<B>, backend: &mut B) {
        if !step.is_external() {
            // Caller-owned ranges under the cursor can't match immediate data and
            // were not resubmitted here; drop them so they are not replayed.
            while self.steps.get(self.cursor).is_some_and(DrawStep::is_external) {
                self.steps.remove(self.cursor);
                self.stats.evicted += 1;
                log::trace!("evicted unmatched external step at {}", self.cursor);
            }
        }

        if let Some(resident) = self.steps.get_mut(self.cursor) {
            if resident.same_content(&step) {
                self.stats.reused += 1;
                log::trace!("step {} reused", self.cursor);

                if !resident.is_usable() {
                    // Same content as a step that never made it to the GPU; retry in place.
                    Self::upload(resident, backend, &mut self.stats);
                }

                self.cursor += 1;
                return;
            }

            let stale = self.steps.len() - self.cursor;
            self.steps.truncate(self.cursor);
            self.stats.evicted += stale;
            log::trace!("step {} diverged; released {stale} stale step(s)", self.cursor);
        }

        Self::upload(&mut step, backend, &mut self.stats);
        self.steps.push(step);
        self.cursor += 1;
    }

    /// Drops steps past the cursor: they were not resubmitted this frame.
    pub fn truncate_stale(&mut self) {
        let stale = self.steps.len().saturating_sub(self.cursor);
        if stale > 0 {
            self.steps.truncate(self.cursor);
            self.stats.evicted += stale;
            log::trace!("released {stale} step(s) not resubmitted this frame");
        }
    }

    /// Draw calls for every usable step, in sequence order.
    ///
    /// Unusable steps are counted as skipped.
    pub fn plan(&mut self) -> Vec<DrawCall<'_, B>> {
        let mut skipped = 0;
        let calls: Vec<_> = self
            .steps
            .iter()
            .filter_map(|step| {
                let call = step.draw_call();
                if call.is_none() {
                    skipped += 1;
                }
                call
            })
            .collect();
        self.stats.steps = self.steps.len();
        self.stats.skipped += skipped;
        calls
    }

    /// Makes the current sequence the baseline for the next frame.
    ///
    /// Returns the counters of the frame that just ended.
    pub fn begin_frame(&mut self) -> FlushStats {
        self.cursor = 0;
        std::mem::take(&mut self.stats)
    }

    fn upload(step: &mut DrawStep<B>, backend: &mut B, stats: &mut FlushStats) {
        if step.is_external() {
            return;
        }
        if step.upload(backend) {
            stats.uploads += 1;
        } else {
            stats.failed_uploads += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::RecordingBackend;
    use crate::batch::step::{ExternalRange, OpenStep};
    use crate::graphics::{PrimitiveType, RenderStates, StepState};

    type Seq = StepSequence<RecordingBackend>;

    fn imm(tag: f32) -> DrawStep<RecordingBackend> {
        DrawStep::immediate(OpenStep {
            state: StepState::new(PrimitiveType::Triangles, &RenderStates::DEFAULT),
            vertices: vec![tag; 24],
            indices: vec![0, 1, 2],
        })
    }

    fn ext(buffer: u32) -> DrawStep<RecordingBackend> {
        DrawStep::external(
            StepState::new(PrimitiveType::Triangles, &RenderStates::DEFAULT),
            ExternalRange { buffer, first_vertex: 0, vertex_count: 3 },
        )
    }

    fn frame(seq: &mut Seq, backend: &mut RecordingBackend, steps: Vec<DrawStep<RecordingBackend>>) -> FlushStats {
        for s in steps {
            seq.close(s, backend);
        }
        seq.truncate_stale();
        let _ = seq.plan();
        seq.begin_frame()
    }

    // ── reuse ─────────────────────────────────────────────────────────────

    #[test]
    fn identical_frames_upload_once() {
        let mut seq = Seq::new();
        let mut backend = RecordingBackend::new();

        let first = frame(&mut seq, &mut backend, vec![imm(1.0), imm(2.0), imm(3.0)]);
        assert_eq!(first.uploads, 3);

        let second = frame(&mut seq, &mut backend, vec![imm(1.0), imm(2.0), imm(3.0)]);
        assert_eq!(second.uploads, 0);
        assert_eq!(second.reused, 3);
        assert_eq!(backend.uploads.len(), 3);
        assert!(backend.released_ids().is_empty());
    }

    #[test]
    fn cursor_and_counters_follow_the_frame() {
        let mut seq = Seq::new();
        let mut backend = RecordingBackend::new();
        frame(&mut seq, &mut backend, vec![imm(1.0), imm(2.0)]);
        assert_eq!(seq.cursor(), 0);

        seq.close(imm(1.0), &mut backend);
        assert_eq!(seq.cursor(), 1);
        assert_eq!(seq.stats().reused, 1);

        seq.close(imm(7.0), &mut backend);
        assert_eq!(seq.cursor(), 2);
        assert_eq!(seq.stats().uploads, 1);
        assert_eq!(seq.stats().evicted, 1);

        seq.begin_frame();
        assert_eq!(seq.cursor(), 0);
        assert_eq!(seq.stats(), FlushStats::default());
    }

    // ── divergence ────────────────────────────────────────────────────────

    #[test]
    fn divergence_truncates_everything_after() {
        let mut seq = Seq::new();
        let mut backend = RecordingBackend::new();
        frame(&mut seq, &mut backend, vec![imm(1.0), imm(2.0), imm(3.0), imm(4.0)]);

        // Step 1 changes; steps 2 and 3 would match but are released anyway.
        let stats = frame(&mut seq, &mut backend, vec![imm(1.0), imm(9.0), imm(3.0), imm(4.0)]);

        assert_eq!(stats.reused, 1);
        assert_eq!(stats.uploads, 3);
        assert_eq!(stats.evicted, 3);
        let mut released = backend.released_ids();
        released.sort();
        assert_eq!(released, vec![2, 3, 4]);
        assert_eq!(seq.len(), 4);
    }

    #[test]
    fn shorter_frame_releases_stale_tail() {
        let mut seq = Seq::new();
        let mut backend = RecordingBackend::new();
        frame(&mut seq, &mut backend, vec![imm(1.0), imm(2.0), imm(3.0)]);

        let stats = frame(&mut seq, &mut backend, vec![imm(1.0)]);
        assert_eq!(stats.reused, 1);
        assert_eq!(stats.evicted, 2);
        assert_eq!(seq.len(), 1);
    }

    // ── external steps ────────────────────────────────────────────────────

    #[test]
    fn resubmitted_external_step_is_reused() {
        let mut seq = Seq::new();
        let mut backend = RecordingBackend::new();
        frame(&mut seq, &mut backend, vec![imm(1.0), ext(5), imm(2.0)]);

        let stats = frame(&mut seq, &mut backend, vec![imm(1.0), ext(5), imm(2.0)]);
        assert_eq!(stats.reused, 3);
        assert_eq!(stats.uploads, 0);
        assert_eq!(stats.evicted, 0);
    }

    #[test]
    fn unmatched_external_step_is_skipped_over() {
        let mut seq = Seq::new();
        let mut backend = RecordingBackend::new();
        frame(&mut seq, &mut backend, vec![imm(1.0), ext(5), imm(2.0)]);

        let stats = frame(&mut seq, &mut backend, vec![imm(1.0), imm(2.0)]);
        assert_eq!(stats.reused, 2);
        assert_eq!(stats.uploads, 0);
        assert_eq!(stats.evicted, 1);
        assert_eq!(seq.len(), 2);
        assert!(seq.steps().iter().all(|s| !s.is_external()));
    }

    // ── failures ──────────────────────────────────────────────────────────

    #[test]
    fn failed_step_is_skipped_then_retried_on_match() {
        let mut seq = Seq::new();
        let mut backend = RecordingBackend::new();
        backend.fail_uploads = 1;

        seq.close(imm(1.0), &mut backend);
        seq.close(imm(2.0), &mut backend);
        let calls = seq.plan().len();
        let stats = seq.begin_frame();
        assert_eq!(calls, 1);
        assert_eq!(stats.failed_uploads, 1);
        assert_eq!(stats.skipped, 1);

        let stats = frame(&mut seq, &mut backend, vec![imm(1.0), imm(2.0)]);
        assert_eq!(stats.reused, 2);
        assert_eq!(stats.uploads, 1);
        assert!(seq.steps().iter().all(DrawStep::is_usable));
    }

    #[test]
    fn dropping_sequence_releases_all() {
        let mut backend = RecordingBackend::new();
        {
            let mut seq = Seq::new();
            frame(&mut seq, &mut backend, vec![imm(1.0), imm(2.0)]);
        }
        assert_eq!(backend.released_ids().len(), 2);
    }
}
