use std::fmt;
use std::sync::Arc;

use crate::backend::ExternalBuffer;
use crate::graphics::{GpuVertex, PrimitiveType, Vertex};

use super::ResourceError;

const VERTEX_SIZE: u64 = std::mem::size_of::<GpuVertex>() as u64;

/// Shared, comparable reference to GPU vertex storage.
///
/// Two handles are equal only if they point at the same `wgpu::Buffer`.
#[derive(Clone)]
pub struct BufferHandle(Arc<wgpu::Buffer>);

impl BufferHandle {
    #[inline]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.0
    }
}

impl PartialEq for BufferHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for BufferHandle {}

impl fmt::Debug for BufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BufferHandle")
            .field(&Arc::as_ptr(&self.0))
            .field(&self.0.size())
            .finish()
    }
}

/// Caller-owned vertex storage on the GPU.
///
/// Drawn through `Renderer::submit_buffer`, always as its own step, with the
/// buffer's own primitive type (strips and fans are not expanded).
///
/// A buffer replaced by `create`/`update` keeps drawing correctly for steps
/// recorded before the change: they hold their own reference to the old storage.
pub struct VertexBuffer {
    primitive: PrimitiveType,
    storage: Option<BufferHandle>,
    vertex_count: usize,
}

impl VertexBuffer {
    pub fn new(primitive: PrimitiveType) -> Self {
        Self {
            primitive,
            storage: None,
            vertex_count: 0,
        }
    }

    #[inline]
    pub fn primitive_type(&self) -> PrimitiveType {
        self.primitive
    }

    pub fn set_primitive_type(&mut self, primitive: PrimitiveType) {
        self.primitive = primitive;
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    #[inline]
    pub fn is_created(&self) -> bool {
        self.storage.is_some()
    }

    pub fn native_handle(&self) -> Option<BufferHandle> {
        self.storage.clone()
    }

    /// Allocates (uninitialized) storage for `vertex_count` vertices, replacing any previous storage.
    pub fn create(&mut self, device: &wgpu::Device, vertex_count: usize) -> Result<(), ResourceError> {
        if vertex_count == 0 {
            return Err(ResourceError::ZeroSize);
        }
        let bytes = byte_len(vertex_count);
        let limit = device.limits().max_buffer_size;
        if bytes > limit {
            return Err(ResourceError::ExceedsLimit { requested: bytes, limit });
        }

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("quill vertex buffer"),
            size: bytes,
            usage: wgpu::BufferUsages::VERTEX
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        self.storage = Some(BufferHandle(Arc::new(buffer)));
        self.vertex_count = vertex_count;
        Ok(())
    }

    /// Writes `vertices` starting at vertex `offset`.
    ///
    /// With `offset == 0`, a larger upload reallocates the storage to exactly
    /// `vertices.len()`. With a non-zero offset the write must fit in the
    /// current storage.
    pub fn update(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        vertices: &[Vertex],
        offset: usize,
    ) -> Result<(), ResourceError> {
        if self.storage.is_none() {
            return Err(ResourceError::NotCreated);
        }
        if vertices.is_empty() {
            return Ok(());
        }

        let count = vertices.len();
        if offset != 0 && offset.checked_add(count).is_none_or(|end| end > self.vertex_count) {
            return Err(ResourceError::OutOfRange {
                offset,
                count,
                size: self.vertex_count,
            });
        }

        if count > self.vertex_count {
            self.create(device, count)?;
        }

        let Some(storage) = self.storage.as_ref() else {
            return Err(ResourceError::NotCreated);
        };
        let data: Vec<GpuVertex> = vertices.iter().map(GpuVertex::from).collect();
        queue.write_buffer(storage.buffer(), byte_len(offset), bytemuck::cast_slice(&data));
        Ok(())
    }

    /// Replaces this buffer's contents with a GPU-side copy of `other`'s.
    ///
    /// Storage is reallocated when the sizes differ; the primitive type is not copied.
    pub fn update_from(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        other: &VertexBuffer,
    ) -> Result<(), ResourceError> {
        let (Some(_), Some(source)) = (self.storage.as_ref(), other.storage.as_ref()) else {
            return Err(ResourceError::NotCreated);
        };
        let source = source.clone();

        if self.vertex_count != other.vertex_count {
            self.create(device, other.vertex_count)?;
        }
        let Some(destination) = self.storage.as_ref() else {
            return Err(ResourceError::NotCreated);
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("quill vertex buffer copy"),
        });
        encoder.copy_buffer_to_buffer(
            source.buffer(),
            0,
            destination.buffer(),
            0,
            byte_len(other.vertex_count),
        );
        queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    /// Exchanges storage, size and primitive type with `other`.
    pub fn swap(&mut self, other: &mut VertexBuffer) {
        std::mem::swap(self, other);
    }
}

impl fmt::Debug for VertexBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VertexBuffer")
            .field("primitive", &self.primitive)
            .field("vertex_count", &self.vertex_count)
            .field("created", &self.is_created())
            .finish()
    }
}

impl ExternalBuffer<BufferHandle> for VertexBuffer {
    fn primitive_type(&self) -> PrimitiveType {
        self.primitive
    }

    fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    fn native_handle(&self) -> Option<BufferHandle> {
        self.storage.clone()
    }
}

#[inline]
fn byte_len(vertices: usize) -> u64 {
    (vertices as u64).saturating_mul(VERTEX_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_not_drawable() {
        let vb = VertexBuffer::new(PrimitiveType::TriangleStrip);
        assert!(!vb.is_created());
        assert_eq!(ExternalBuffer::vertex_count(&vb), 0);
        assert!(ExternalBuffer::native_handle(&vb).is_none());
        assert_eq!(ExternalBuffer::primitive_type(&vb), PrimitiveType::TriangleStrip);
    }

    #[test]
    fn swap_exchanges_primitive() {
        let mut a = VertexBuffer::new(PrimitiveType::Lines);
        let mut b = VertexBuffer::new(PrimitiveType::Points);
        a.swap(&mut b);
        assert_eq!(a.primitive_type(), PrimitiveType::Points);
        assert_eq!(b.primitive_type(), PrimitiveType::Lines);
    }

    #[test]
    fn byte_len_matches_vertex_stride() {
        assert_eq!(byte_len(3), 96);
        assert_eq!(byte_len(usize::MAX), u64::MAX);
    }
}
