//! Render pipeline cache keys and the state → wgpu conversions behind them.

use bytemuck::{Pod, Zeroable};

use crate::graphics::{BlendEquation, BlendFactor, BlendMode, GpuVertex, PrimitiveType, ShaderId};

/// Everything that selects a distinct `wgpu::RenderPipeline`.
///
/// Texture is not part of the key: it is bound per draw through group 1.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(super) struct PipelineKey {
    pub topology: wgpu::PrimitiveTopology,
    pub blend: BlendMode,
    pub shader: ShaderId,
}

// ── viewport uniform ──────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct ViewportUniform {
    pub size: [f32; 2],
    pub _pad: [f32; 2], // 16-byte alignment
}

pub(super) const VIEWPORT_UNIFORM_SIZE: wgpu::BufferSize =
    match wgpu::BufferSize::new(std::mem::size_of::<ViewportUniform>() as u64) {
        Some(size) => size,
        None => panic!("viewport uniform is never zero-sized"),
    };

// ── topology ──────────────────────────────────────────────────────────────

/// wgpu topology for `primitive`; `None` for triangle fans, which wgpu cannot draw.
pub(super) fn topology(primitive: PrimitiveType) -> Option<wgpu::PrimitiveTopology> {
    match primitive {
        PrimitiveType::Points => Some(wgpu::PrimitiveTopology::PointList),
        PrimitiveType::Lines => Some(wgpu::PrimitiveTopology::LineList),
        PrimitiveType::LineStrip => Some(wgpu::PrimitiveTopology::LineStrip),
        PrimitiveType::Triangles => Some(wgpu::PrimitiveTopology::TriangleList),
        PrimitiveType::TriangleStrip => Some(wgpu::PrimitiveTopology::TriangleStrip),
        PrimitiveType::TriangleFan => None,
    }
}

// ── blend ─────────────────────────────────────────────────────────────────

fn factor(f: BlendFactor) -> wgpu::BlendFactor {
    match f {
        BlendFactor::Zero => wgpu::BlendFactor::Zero,
        BlendFactor::One => wgpu::BlendFactor::One,
        BlendFactor::SrcColor => wgpu::BlendFactor::Src,
        BlendFactor::OneMinusSrcColor => wgpu::BlendFactor::OneMinusSrc,
        BlendFactor::DstColor => wgpu::BlendFactor::Dst,
        BlendFactor::OneMinusDstColor => wgpu::BlendFactor::OneMinusDst,
        BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
        BlendFactor::DstAlpha => wgpu::BlendFactor::DstAlpha,
        BlendFactor::OneMinusDstAlpha => wgpu::BlendFactor::OneMinusDstAlpha,
    }
}

fn component(src: BlendFactor, dst: BlendFactor, equation: BlendEquation) -> wgpu::BlendComponent {
    let operation = match equation {
        BlendEquation::Add => wgpu::BlendOperation::Add,
        BlendEquation::Subtract => wgpu::BlendOperation::Subtract,
        BlendEquation::ReverseSubtract => wgpu::BlendOperation::ReverseSubtract,
        BlendEquation::Min => wgpu::BlendOperation::Min,
        BlendEquation::Max => wgpu::BlendOperation::Max,
    };

    // wgpu rejects Min/Max with factors other than One; the factors are ignored anyway.
    let (src_factor, dst_factor) = match operation {
        wgpu::BlendOperation::Min | wgpu::BlendOperation::Max => {
            (wgpu::BlendFactor::One, wgpu::BlendFactor::One)
        }
        _ => (factor(src), factor(dst)),
    };

    wgpu::BlendComponent { src_factor, dst_factor, operation }
}

pub(super) fn blend_state(mode: BlendMode) -> wgpu::BlendState {
    wgpu::BlendState {
        color: component(mode.color_src_factor, mode.color_dst_factor, mode.color_equation),
        alpha: component(mode.alpha_src_factor, mode.alpha_dst_factor, mode.alpha_equation),
    }
}

// ── construction ──────────────────────────────────────────────────────────

pub(super) fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    module: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    key: &PipelineKey,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("quill step pipeline"),
        layout: Some(layout),

        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[GpuVertex::layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(blend_state(key.blend)),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: key.topology,
            // Strips are only drawn non-indexed (external buffers).
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}
