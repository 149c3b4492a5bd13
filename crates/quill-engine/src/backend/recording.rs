//! GPU-free backend used by the engine's tests.
//!
//! Records every upload, release and executed draw so batching decisions can be
//! asserted without a device.

use std::cell::RefCell;
use std::rc::Rc;

use crate::graphics::{Color, PrimitiveType, ShaderId, StepState};

use super::{DrawCall, ExternalBuffer, FramePlan, GpuBackend};

/// Geometry handle that reports its own release.
#[derive(Debug)]
pub(crate) struct RecordedGeometry {
    pub id: u32,
    released: Rc<RefCell<Vec<u32>>>,
}

impl Drop for RecordedGeometry {
    fn drop(&mut self) {
        self.released.borrow_mut().push(self.id);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RecordedCall {
    Indexed {
        state: StepState,
        geometry: u32,
        index_count: u32,
    },
    External {
        state: StepState,
        buffer: u32,
        first_vertex: u32,
        vertex_count: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedUpload {
    pub id: u32,
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    next_id: u32,
    /// Number of upcoming `create_geometry` calls that return `None`.
    pub fail_uploads: usize,
    pub uploads: Vec<RecordedUpload>,
    pub released: Rc<RefCell<Vec<u32>>>,
    pub frames: Vec<Vec<RecordedCall>>,
    pub clears: Vec<Option<Color>>,
    pub default_shaders: Vec<Option<ShaderId>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn released_ids(&self) -> Vec<u32> {
        self.released.borrow().clone()
    }

    pub fn last_frame(&self) -> &[RecordedCall] {
        self.frames.last().map(Vec::as_slice).unwrap_or(&[])
    }
}

impl GpuBackend for RecordingBackend {
    type Geometry = RecordedGeometry;
    type Buffer = u32;
    type Target<'t> = ();

    fn create_geometry(&mut self, vertices: &[f32], indices: &[u32]) -> Option<RecordedGeometry> {
        if self.fail_uploads > 0 {
            self.fail_uploads -= 1;
            return None;
        }
        self.next_id += 1;
        let id = self.next_id;
        self.uploads.push(RecordedUpload {
            id,
            vertices: vertices.to_vec(),
            indices: indices.to_vec(),
        });
        Some(RecordedGeometry {
            id,
            released: Rc::clone(&self.released),
        })
    }

    fn execute(&mut self, _target: &mut (), plan: &FramePlan<'_, Self>) -> usize {
        let calls: Vec<RecordedCall> = plan
            .calls
            .iter()
            .map(|call| match call {
                DrawCall::Indexed { state, geometry, index_count } => RecordedCall::Indexed {
                    state: **state,
                    geometry: geometry.id,
                    index_count: *index_count,
                },
                DrawCall::External { state, buffer, first_vertex, vertex_count } => {
                    RecordedCall::External {
                        state: **state,
                        buffer: **buffer,
                        first_vertex: *first_vertex,
                        vertex_count: *vertex_count,
                    }
                }
            })
            .collect();
        let issued = calls.len();
        self.frames.push(calls);
        self.clears.push(plan.clear);
        self.default_shaders.push(plan.default_shader);
        issued
    }
}

/// Caller-owned buffer stand-in.
#[derive(Debug, Clone)]
pub(crate) struct FakeBuffer {
    pub handle: Option<u32>,
    pub primitive: PrimitiveType,
    pub vertex_count: usize,
}

impl ExternalBuffer<u32> for FakeBuffer {
    fn primitive_type(&self) -> PrimitiveType {
        self.primitive
    }

    fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    fn native_handle(&self) -> Option<u32> {
        self.handle
    }
}
