use bytemuck::{Pod, Zeroable};

use crate::coords::{Transform, Vec2};

use super::Color;

/// Number of `f32` scalars one encoded vertex occupies: `xy rgba uv`.
pub const FLOATS_PER_VERTEX: usize = 2 + 4 + 2;

/// One rendering point as submitted by callers.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Vertex {
    /// Position in logical pixels.
    pub position: Vec2,
    pub color: Color,
    /// Texture coordinates, normalized to `0..=1`.
    pub tex_coords: Vec2,
}

impl Vertex {
    #[inline]
    pub const fn new(position: Vec2, color: Color, tex_coords: Vec2) -> Self {
        Self { position, color, tex_coords }
    }

    /// A white, untextured vertex.
    #[inline]
    pub const fn at(position: Vec2) -> Self {
        Self::new(position, Color::WHITE, Vec2::zero())
    }

    #[inline]
    pub const fn colored(position: Vec2, color: Color) -> Self {
        Self::new(position, color, Vec2::zero())
    }
}

/// Appends the interleaved scalars of `vertex` to `out`.
///
/// Order is fixed: position (transformed), color (normalized), texture coordinates.
#[inline]
pub fn encode_vertex(vertex: &Vertex, transform: &Transform, out: &mut Vec<f32>) {
    let p = transform.transform_point(vertex.position);
    let [r, g, b, a] = vertex.color.to_normalized();
    out.extend_from_slice(&[p.x, p.y, r, g, b, a, vertex.tex_coords.x, vertex.tex_coords.y]);
}

/// GPU-side vertex, byte-compatible with [`FLOATS_PER_VERTEX`] packed scalars.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
    pub tex_coords: [f32; 2],
}

impl GpuVertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x4, // color
        2 => Float32x2  // tex_coords
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

impl From<&Vertex> for GpuVertex {
    fn from(v: &Vertex) -> Self {
        Self {
            position: [v.position.x, v.position.y],
            color: v.color.to_normalized(),
            tex_coords: [v.tex_coords.x, v.tex_coords.y],
        }
    }
}
