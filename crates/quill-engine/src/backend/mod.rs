//! Backend seam between the batching engine and a concrete GPU API.
//!
//! The engine decides *what* to draw and *when* to (re)upload; a backend only
//! knows how to turn packed scalars into GPU objects and how to encode an
//! already-ordered list of draw calls.
//!
//! Ownership rules:
//! - `Geometry` is owned by the step it backs. Dropping it releases the GPU objects.
//! - `Buffer` is a cheap, comparable handle to caller-owned vertex storage.

use std::fmt;

use crate::graphics::{Color, PrimitiveType, ShaderId, StepState};

#[cfg(test)]
pub(crate) mod recording;
pub mod wgpu_impl;

/// A GPU API the engine can batch for.
pub trait GpuBackend {
    /// GPU objects backing one immediate step (vertex + index storage).
    type Geometry;

    /// Native handle of an externally owned vertex buffer.
    type Buffer: Clone + PartialEq + fmt::Debug;

    /// Per-frame destination the plan is executed into.
    type Target<'t>;

    /// Creates GPU storage for interleaved `vertices` and `indices`.
    ///
    /// Returns `None` when the allocation fails; the caller keeps the step but
    /// marks it unusable.
    fn create_geometry(&mut self, vertices: &[f32], indices: &[u32]) -> Option<Self::Geometry>;

    /// Encodes `plan` into `target`, in order. Returns the number of draw calls issued.
    fn execute(&mut self, target: &mut Self::Target<'_>, plan: &FramePlan<'_, Self>) -> usize;
}

/// Caller-owned vertex storage that can be drawn without copying.
pub trait ExternalBuffer<H> {
    fn primitive_type(&self) -> PrimitiveType;
    fn vertex_count(&self) -> usize;
    /// `None` when the buffer has no GPU storage yet.
    fn native_handle(&self) -> Option<H>;
}

/// One entry of an ordered frame plan.
pub enum DrawCall<'a, B: GpuBackend + ?Sized> {
    /// Engine-owned geometry, drawn as an indexed elemental list.
    Indexed {
        state: &'a StepState,
        geometry: &'a B::Geometry,
        index_count: u32,
    },
    /// A caller-owned buffer range, drawn non-indexed with its own topology.
    External {
        state: &'a StepState,
        buffer: &'a B::Buffer,
        first_vertex: u32,
        vertex_count: u32,
    },
}

impl<B: GpuBackend + ?Sized> DrawCall<'_, B> {
    pub fn state(&self) -> &StepState {
        match self {
            DrawCall::Indexed { state, .. } | DrawCall::External { state, .. } => state,
        }
    }
}

/// Everything a backend needs to render one frame.
pub struct FramePlan<'a, B: GpuBackend + ?Sized> {
    /// Clear color for the pass; `None` loads the existing contents.
    pub clear: Option<Color>,
    /// Shader used for steps whose snapshot has none.
    pub default_shader: Option<ShaderId>,
    /// Draw calls in paint order.
    pub calls: Vec<DrawCall<'a, B>>,
}
