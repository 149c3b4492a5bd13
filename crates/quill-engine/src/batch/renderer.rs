use std::sync::Arc;

use crate::backend::{ExternalBuffer, FramePlan, GpuBackend};
use crate::context::{active_context_id, ActiveTargetRegistry, TargetId};
use crate::graphics::{expand_into, Color, PrimitiveType, RenderStates, ShaderId, StepState, Vertex};

use super::step::{DrawStep, ExternalRange, OpenStep};
use super::{FlushStats, StepSequence};

/// Immediate-mode render target.
///
/// Accepts draw calls, batches adjacent state-identical ones, and replays the
/// resulting plan once per frame through its backend. Paint order is the
/// submission order; batching never reorders across different states.
///
/// Every operation must run on the thread whose current graphics context the
/// target renders into.
pub struct Renderer<B: GpuBackend> {
    id: TargetId,
    registry: Arc<ActiveTargetRegistry>,
    backend: B,

    open: OpenStep,
    sequence: StepSequence<B>,

    clear: Option<Color>,
    default_shader: Option<ShaderId>,
    last_stats: FlushStats,
}

impl<B: GpuBackend> Renderer<B> {
    pub fn new(backend: B, registry: Arc<ActiveTargetRegistry>) -> Self {
        Self {
            id: TargetId::next(),
            registry,
            backend,
            open: OpenStep::default(),
            sequence: StepSequence::new(),
            clear: None,
            default_shader: None,
            last_stats: FlushStats::default(),
        }
    }

    #[inline]
    pub fn id(&self) -> TargetId {
        self.id
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Committed steps (previous frame's plan, partially reconciled mid-frame).
    #[inline]
    pub fn steps(&self) -> &[DrawStep<B>] {
        self.sequence.steps()
    }

    /// Counters of the most recent flush.
    #[inline]
    pub fn last_stats(&self) -> FlushStats {
        self.last_stats
    }

    /// Claims (or releases) the calling thread's current context for this target.
    pub fn set_active(&mut self, active: bool) {
        let context = active_context_id();
        if active {
            self.registry.acquire(context, self.id);
        } else {
            self.registry.release_if(context, self.id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.registry.is_active(active_context_id(), self.id)
    }

    fn ensure_active(&mut self) {
        if !self.is_active() {
            self.set_active(true);
        }
    }

    /// Requests the next flush to start from `color` instead of the existing contents.
    pub fn clear(&mut self, color: Color) {
        self.clear = Some(color);
    }

    /// Shader used by steps whose state names none; `None` restores the backend's built-in one.
    pub fn set_default_shader(&mut self, shader: Option<ShaderId>) {
        self.default_shader = shader;
    }

    /// Draws CPU-owned vertices.
    ///
    /// Submissions below the minimum vertex count for `kind` are ignored.
    pub fn submit(&mut self, vertices: &[Vertex], kind: PrimitiveType, states: &RenderStates) {
        if vertices.len() < kind.min_vertex_count() {
            return;
        }
        self.ensure_active();

        let state = StepState::new(kind.elemental(), states);
        if self.open.state != state {
            self.close_open_step();
            self.open.state = state;
        }

        expand_into(
            vertices,
            kind,
            &states.transform,
            &mut self.open.vertices,
            &mut self.open.indices,
        );
    }

    /// Draws `vertex_count` vertices of a caller-owned buffer starting at `first_vertex`.
    ///
    /// Always forms its own step. Rejected (no-op) when the range exceeds the
    /// buffer, the range is empty, or the buffer has no GPU storage.
    pub fn submit_buffer<E>(
        &mut self,
        buffer: &E,
        first_vertex: usize,
        vertex_count: usize,
        states: &RenderStates,
    ) where
        E: ExternalBuffer<B::Buffer> + ?Sized,
    {
        let available = buffer.vertex_count();
        let in_range = first_vertex
            .checked_add(vertex_count)
            .is_some_and(|end| end <= available);
        if !in_range {
            log::debug!(
                "rejected buffer draw: range {first_vertex}+{vertex_count} exceeds {available} vertices"
            );
            return;
        }
        if vertex_count == 0 {
            return;
        }
        let Some(handle) = buffer.native_handle() else {
            log::debug!("rejected buffer draw: buffer has no GPU storage");
            return;
        };
        self.ensure_active();
        self.close_open_step();

        let state = StepState::new(buffer.primitive_type(), states);
        let step = DrawStep::external(
            state,
            ExternalRange {
                buffer: handle,
                first_vertex,
                vertex_count,
            },
        );
        self.sequence.close(step, &mut self.backend);

        self.open = OpenStep::default();
    }

    /// Draws the whole of a caller-owned buffer.
    pub fn submit_vertex_buffer<E>(&mut self, buffer: &E, states: &RenderStates)
    where
        E: ExternalBuffer<B::Buffer> + ?Sized,
    {
        self.submit_buffer(buffer, 0, buffer.vertex_count(), states);
    }

    /// Executes this frame's plan into `target` and starts a new frame.
    ///
    /// Steps from the previous frame that were not resubmitted are released.
    pub fn flush(&mut self, target: &mut B::Target<'_>) -> FlushStats {
        self.close_open_step();
        self.sequence.truncate_stale();

        self.ensure_active();

        let calls = self.sequence.plan();
        let planned = calls.len();
        let plan = FramePlan {
            clear: self.clear.take(),
            default_shader: self.default_shader,
            calls,
        };
        let draws = self.backend.execute(target, &plan);
        drop(plan);

        let mut stats = self.sequence.begin_frame();
        stats.draws = draws;
        stats.skipped += planned.saturating_sub(draws);
        self.last_stats = stats;

        log::debug!(
            "flush: {} steps, {} draws, {} uploads, {} reused, {} evicted, {} skipped",
            self.last_stats.steps,
            self.last_stats.draws,
            self.last_stats.uploads,
            self.last_stats.reused,
            self.last_stats.evicted,
            self.last_stats.skipped
        );
        self.last_stats
    }

    fn close_open_step(&mut self) {
        if self.open.is_empty() {
            return;
        }
        let finished = self.open.take();
        self.sequence.close(DrawStep::immediate(finished), &mut self.backend);
    }
}

impl<B: GpuBackend> Drop for Renderer<B> {
    fn drop(&mut self) {
        self.registry.release_if(active_context_id(), self.id);
    }
}
