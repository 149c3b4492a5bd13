use std::fmt;

use crate::backend::{DrawCall, GpuBackend};
use crate::graphics::{StepState, FLOATS_PER_VERTEX};

use super::fingerprint::{same_scalars, Fingerprint};

/// In-progress accumulation of state-identical immediate draws.
#[derive(Debug, Default)]
pub(crate) struct OpenStep {
    pub state: StepState,
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl OpenStep {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    /// Moves the accumulated data out, leaving an empty step with the same state.
    pub fn take(&mut self) -> OpenStep {
        OpenStep {
            state: self.state,
            vertices: std::mem::take(&mut self.vertices),
            indices: std::mem::take(&mut self.indices),
        }
    }
}

/// A caller-owned buffer range drawn as its own step.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalRange<H> {
    pub buffer: H,
    pub first_vertex: usize,
    pub vertex_count: usize,
}

pub(crate) enum StepContent<B: GpuBackend> {
    Immediate {
        vertices: Vec<f32>,
        indices: Vec<u32>,
        fingerprint: Fingerprint,
        /// `None` until uploaded, and after a failed upload.
        geometry: Option<B::Geometry>,
    },
    External(ExternalRange<B::Buffer>),
}

/// One GPU-executable batch.
///
/// Owns the GPU objects backing its immediate data; they are released when the
/// step is dropped (evicted, replaced, or its sequence is destroyed). Steps are
/// move-only.
pub struct DrawStep<B: GpuBackend> {
    state: StepState,
    content: StepContent<B>,
}

impl<B: GpuBackend> DrawStep<B> {
    pub(crate) fn immediate(open: OpenStep) -> Self {
        let fingerprint = Fingerprint::of(&open.vertices, &open.indices);
        Self {
            state: open.state,
            content: StepContent::Immediate {
                vertices: open.vertices,
                indices: open.indices,
                fingerprint,
                geometry: None,
            },
        }
    }

    pub(crate) fn external(state: StepState, range: ExternalRange<B::Buffer>) -> Self {
        Self {
            state,
            content: StepContent::External(range),
        }
    }

    #[inline]
    pub fn state(&self) -> &StepState {
        &self.state
    }

    #[inline]
    pub fn is_external(&self) -> bool {
        matches!(self.content, StepContent::External(_))
    }

    /// `false` for immediate steps whose GPU objects could not be created.
    pub fn is_usable(&self) -> bool {
        match &self.content {
            StepContent::Immediate { geometry, .. } => geometry.is_some(),
            StepContent::External(_) => true,
        }
    }

    pub fn vertex_count(&self) -> usize {
        match &self.content {
            StepContent::Immediate { vertices, .. } => vertices.len() / FLOATS_PER_VERTEX,
            StepContent::External(range) => range.vertex_count,
        }
    }

    pub fn index_count(&self) -> usize {
        match &self.content {
            StepContent::Immediate { indices, .. } => indices.len(),
            StepContent::External(_) => 0,
        }
    }

    /// Packed scalars of an immediate step; empty for external steps.
    pub fn vertices(&self) -> &[f32] {
        match &self.content {
            StepContent::Immediate { vertices, .. } => vertices,
            StepContent::External(_) => &[],
        }
    }

    pub fn indices(&self) -> &[u32] {
        match &self.content {
            StepContent::Immediate { indices, .. } => indices,
            StepContent::External(_) => &[],
        }
    }

    pub fn external_range(&self) -> Option<&ExternalRange<B::Buffer>> {
        match &self.content {
            StepContent::External(range) => Some(range),
            StepContent::Immediate { .. } => None,
        }
    }

    /// Exact content equality: state, then fingerprint, then full data.
    pub(crate) fn same_content(&self, other: &DrawStep<B>) -> bool {
        if self.state != other.state {
            return false;
        }
        match (&self.content, &other.content) {
            (
                StepContent::Immediate { vertices: va, indices: ia, fingerprint: fa, .. },
                StepContent::Immediate { vertices: vb, indices: ib, fingerprint: fb, .. },
            ) => fa == fb && ia == ib && same_scalars(va, vb),
            (StepContent::External(a), StepContent::External(b)) => a == b,
            _ => false,
        }
    }

    /// (Re)creates the GPU objects for this step from its CPU data.
    ///
    /// Existing objects are released first; there is no partial update. Returns
    /// `false` (step left unusable) when the backend cannot allocate. External
    /// steps own nothing and always succeed.
    pub(crate) fn upload(&mut self, backend: &mut B) -> bool {
        let StepContent::Immediate { vertices, indices, geometry, .. } = &mut self.content else {
            return true;
        };

        // Release before allocating so a failed upload never keeps stale contents drawable.
        drop(geometry.take());

        *geometry = backend.create_geometry(vertices, indices);
        if geometry.is_none() {
            log::warn!(
                "failed to create GPU buffers for step ({} vertices, {} indices); step will be skipped",
                vertices.len() / FLOATS_PER_VERTEX,
                indices.len()
            );
            return false;
        }
        true
    }

    /// The draw call replaying this step, or `None` if it is unusable.
    pub(crate) fn draw_call(&self) -> Option<DrawCall<'_, B>> {
        match &self.content {
            StepContent::Immediate { indices, geometry, .. } => {
                let geometry = geometry.as_ref()?;
                Some(DrawCall::Indexed {
                    state: &self.state,
                    geometry,
                    index_count: u32::try_from(indices.len()).ok()?,
                })
            }
            StepContent::External(range) => Some(DrawCall::External {
                state: &self.state,
                buffer: &range.buffer,
                first_vertex: u32::try_from(range.first_vertex).ok()?,
                vertex_count: u32::try_from(range.vertex_count).ok()?,
            }),
        }
    }
}

impl<B: GpuBackend> fmt::Debug for DrawStep<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawStep")
            .field("state", &self.state)
            .field("external", &self.external_range())
            .field("vertex_count", &self.vertex_count())
            .field("index_count", &self.index_count())
            .field("usable", &self.is_usable())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::RecordingBackend;
    use crate::graphics::PrimitiveType;

    fn open(scalars: &[f32], indices: &[u32]) -> OpenStep {
        OpenStep {
            state: StepState::default(),
            vertices: scalars.to_vec(),
            indices: indices.to_vec(),
        }
    }

    #[test]
    fn upload_replaces_previous_objects() {
        let mut backend = RecordingBackend::new();
        let mut step = DrawStep::<RecordingBackend>::immediate(open(&[0.0; 8], &[0]));

        assert!(step.upload(&mut backend));
        assert!(step.upload(&mut backend));

        assert_eq!(backend.uploads.len(), 2);
        assert_eq!(backend.released_ids(), vec![1]);
        drop(step);
        assert_eq!(backend.released_ids(), vec![1, 2]);
    }

    #[test]
    fn failed_upload_leaves_step_unusable() {
        let mut backend = RecordingBackend::new();
        backend.fail_uploads = 1;
        let mut step = DrawStep::<RecordingBackend>::immediate(open(&[0.0; 8], &[0]));

        assert!(!step.upload(&mut backend));
        assert!(!step.is_usable());
        assert!(step.draw_call().is_none());
    }

    #[test]
    fn external_steps_compare_by_range() {
        let state = StepState::new(PrimitiveType::TriangleStrip, &Default::default());
        let range = |first| ExternalRange { buffer: 7u32, first_vertex: first, vertex_count: 4 };
        let a = DrawStep::<RecordingBackend>::external(state, range(0));
        let b = DrawStep::<RecordingBackend>::external(state, range(0));
        let c = DrawStep::<RecordingBackend>::external(state, range(1));
        assert!(a.same_content(&b));
        assert!(!a.same_content(&c));
        assert!(a.is_usable());
    }

    #[test]
    fn immediate_never_matches_external() {
        let state = StepState::default();
        let a = DrawStep::<RecordingBackend>::immediate(open(&[0.0; 8], &[0]));
        let b = DrawStep::<RecordingBackend>::external(
            state,
            ExternalRange { buffer: 1, first_vertex: 0, vertex_count: 1 },
        );
        assert!(!a.same_content(&b));
    }
}
