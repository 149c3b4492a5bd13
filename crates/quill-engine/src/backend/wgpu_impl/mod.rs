//! wgpu implementation of [`GpuBackend`].
//!
//! Bindings shared by every pipeline:
//! - group 0: viewport uniform (logical px → NDC), written once per flush
//! - group 1: texture + sampler of the step (a 1×1 white texture when none)
//!
//! Render pipelines are created lazily per (topology, blend mode, shader) and
//! always before the render pass borrows them.

mod error;
mod pipeline;
mod vertex_buffer;

pub use error::ResourceError;
pub use vertex_buffer::{BufferHandle, VertexBuffer};

use std::collections::HashMap;

use wgpu::util::DeviceExt;

use crate::coords::Viewport;
use crate::graphics::{Color, ShaderId, TextureId};

use super::{DrawCall, FramePlan, GpuBackend};
use pipeline::{PipelineKey, ViewportUniform, VIEWPORT_UNIFORM_SIZE};

/// Backend configuration.
#[derive(Debug, Clone)]
pub struct WgpuBackendConfig {
    /// Color format of every target this backend renders into.
    pub format: wgpu::TextureFormat,
    /// Clear color used when a flush did not request one; `None` loads existing contents.
    pub clear_color: Option<Color>,
    pub label: Option<String>,
}

impl Default for WgpuBackendConfig {
    fn default() -> Self {
        Self {
            format: wgpu::TextureFormat::Bgra8UnormSrgb,
            clear_color: None,
            label: None,
        }
    }
}

/// Per-flush destination: an encoder recording into `color_view`.
pub struct FrameTarget<'t> {
    pub encoder: &'t mut wgpu::CommandEncoder,
    pub color_view: &'t wgpu::TextureView,
    /// Logical size the vertex positions are expressed in.
    pub viewport: Viewport,
}

impl<'t> FrameTarget<'t> {
    #[inline]
    pub fn new(
        encoder: &'t mut wgpu::CommandEncoder,
        color_view: &'t wgpu::TextureView,
        viewport: Viewport,
    ) -> Self {
        Self { encoder, color_view, viewport }
    }
}

/// Vertex + index buffers backing one immediate step. Dropping releases them.
#[derive(Debug)]
pub struct WgpuGeometry {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
}

struct TextureSlot {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    size: (u32, u32),
}

pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: WgpuBackendConfig,

    texture_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    sampler: wgpu::Sampler,

    viewport_ubo: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,

    builtin_shader: ShaderId,
    white_texture: TextureId,

    shaders: HashMap<ShaderId, wgpu::ShaderModule>,
    textures: HashMap<TextureId, TextureSlot>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    warned_topology: bool,
    warned_missing: bool,
}

impl WgpuBackend {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, config: WgpuBackendConfig) -> Self {
        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("quill frame bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: Some(VIEWPORT_UNIFORM_SIZE),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("quill texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("quill pipeline layout"),
            bind_group_layouts: &[&frame_layout, &texture_layout],
            immediate_size: 0,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("quill sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let viewport_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("quill viewport ubo"),
            size: VIEWPORT_UNIFORM_SIZE.get(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("quill frame bind group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_ubo.as_entire_binding(),
            }],
        });

        let builtin_shader = ShaderId::next();
        let mut shaders = HashMap::new();
        shaders.insert(
            builtin_shader,
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("quill default shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/default.wgsl").into()),
            }),
        );

        let mut backend = Self {
            device: device.clone(),
            queue: queue.clone(),
            config,
            texture_layout,
            pipeline_layout,
            sampler,
            viewport_ubo,
            frame_bind_group,
            builtin_shader,
            white_texture: TextureId::next(),
            shaders,
            textures: HashMap::new(),
            pipelines: HashMap::new(),
            warned_topology: false,
            warned_missing: false,
        };

        let white = backend.upload_texture(1, 1, &[255; 4]);
        backend.textures.insert(backend.white_texture, white);

        log::debug!(
            "wgpu backend ready ({:?}, label {:?})",
            backend.config.format,
            backend.config.label
        );
        backend
    }

    #[inline]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    #[inline]
    pub fn config(&self) -> &WgpuBackendConfig {
        &self.config
    }

    /// The shader used when neither the step nor the renderer names one.
    #[inline]
    pub fn builtin_shader(&self) -> ShaderId {
        self.builtin_shader
    }

    // ── resources ─────────────────────────────────────────────────────────

    /// Registers an RGBA8 texture. `pixels` is tightly packed, row-major, top row first.
    pub fn create_texture_rgba8(
        &mut self,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<TextureId, ResourceError> {
        if width == 0 || height == 0 {
            return Err(ResourceError::ZeroSize);
        }
        let limit = self.device.limits().max_texture_dimension_2d;
        if width > limit || height > limit {
            return Err(ResourceError::ExceedsLimit {
                requested: u64::from(width.max(height)),
                limit: u64::from(limit),
            });
        }
        let expected = (width as usize) * (height as usize) * 4;
        if pixels.len() != expected {
            return Err(ResourceError::DataLength {
                expected,
                actual: pixels.len(),
            });
        }

        let id = TextureId::next();
        let slot = self.upload_texture(width, height, pixels);
        self.textures.insert(id, slot);
        Ok(id)
    }

    /// Releases a texture. Steps still naming it are skipped until they change.
    pub fn destroy_texture(&mut self, id: TextureId) -> bool {
        id != self.white_texture && self.textures.remove(&id).is_some()
    }

    pub fn texture_size(&self, id: TextureId) -> Option<(u32, u32)> {
        self.textures.get(&id).map(|slot| slot.size)
    }

    /// Registers a WGSL shader. It must expose the interface of the built-in shader.
    ///
    /// WGSL validation errors are reported by wgpu's device error handler.
    pub fn create_shader_wgsl(&mut self, source: &str) -> Result<ShaderId, ResourceError> {
        if source.trim().is_empty() {
            return Err(ResourceError::EmptySource);
        }
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("quill user shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        let id = ShaderId::next();
        self.shaders.insert(id, module);
        Ok(id)
    }

    fn upload_texture(&self, width: u32, height: u32, pixels: &[u8]) -> TextureSlot {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("quill texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("quill texture bind group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        TextureSlot {
            _texture: texture,
            bind_group,
            size: (width, height),
        }
    }

    // ── execution helpers ─────────────────────────────────────────────────

    /// Resolves (and if needed builds) the pipeline for `call`.
    ///
    /// `None` means the call cannot be drawn by this backend.
    fn prepare(&mut self, call: &DrawCall<'_, Self>, default_shader: ShaderId) -> Option<PipelineKey> {
        let state = call.state();

        let Some(topology) = pipeline::topology(state.primitive) else {
            if !self.warned_topology {
                log::warn!("{:?} is not supported by the wgpu backend; such steps are skipped", state.primitive);
                self.warned_topology = true;
            }
            return None;
        };

        let shader = state.shader.unwrap_or(default_shader);
        let texture_known = state.texture.is_none_or(|t| self.textures.contains_key(&t));
        let Some(module) = self.shaders.get(&shader).filter(|_| texture_known) else {
            if !self.warned_missing {
                log::warn!("step references an unknown texture or shader; skipped");
                self.warned_missing = true;
            }
            return None;
        };

        let key = PipelineKey {
            topology,
            blend: state.blend_mode,
            shader,
        };
        if !self.pipelines.contains_key(&key) {
            log::trace!("creating pipeline {key:?}");
            let created = pipeline::create_pipeline(
                &self.device,
                &self.pipeline_layout,
                module,
                self.config.format,
                &key,
            );
            self.pipelines.insert(key, created);
        }
        Some(key)
    }

    fn write_viewport_uniform(&self, viewport: Viewport) {
        let u = ViewportUniform {
            size: viewport.clamped(),
            _pad: [0.0; 2],
        };
        self.queue.write_buffer(&self.viewport_ubo, 0, bytemuck::bytes_of(&u));
    }
}

impl GpuBackend for WgpuBackend {
    type Geometry = WgpuGeometry;
    type Buffer = BufferHandle;
    type Target<'t> = FrameTarget<'t>;

    fn create_geometry(&mut self, vertices: &[f32], indices: &[u32]) -> Option<WgpuGeometry> {
        if vertices.is_empty() || indices.is_empty() {
            return None;
        }
        let limit = self.device.limits().max_buffer_size;
        let vertex_bytes = std::mem::size_of_val(vertices) as u64;
        let index_bytes = std::mem::size_of_val(indices) as u64;
        if vertex_bytes > limit || index_bytes > limit {
            return None;
        }

        let vertices = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quill step vbo"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quill step ibo"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Some(WgpuGeometry { vertices, indices })
    }

    fn execute(&mut self, target: &mut FrameTarget<'_>, plan: &FramePlan<'_, Self>) -> usize {
        let clear = plan.clear.or(self.config.clear_color);
        if plan.calls.is_empty() && clear.is_none() {
            return 0;
        }

        let default_shader = plan
            .default_shader
            .filter(|s| self.shaders.contains_key(s))
            .unwrap_or(self.builtin_shader);

        // Mutating methods must happen before borrowing pipelines immutably.
        let keys: Vec<Option<PipelineKey>> =
            plan.calls.iter().map(|call| self.prepare(call, default_shader)).collect();
        self.write_viewport_uniform(target.viewport);

        let load = match clear {
            Some(color) => {
                let [r, g, b, a] = color.to_normalized();
                wgpu::LoadOp::Clear(wgpu::Color {
                    r: f64::from(r),
                    g: f64::from(g),
                    b: f64::from(b),
                    a: f64::from(a),
                })
            }
            None => wgpu::LoadOp::Load,
        };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("quill flush pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        rpass.set_bind_group(0, &self.frame_bind_group, &[]);

        let mut issued = 0;
        for (call, key) in plan.calls.iter().zip(&keys) {
            let Some(pipeline) = key.as_ref().and_then(|k| self.pipelines.get(k)) else {
                continue;
            };
            let texture = call.state().texture.unwrap_or(self.white_texture);
            let Some(slot) = self.textures.get(&texture) else { continue };

            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(1, &slot.bind_group, &[]);

            match call {
                DrawCall::Indexed { geometry, index_count, .. } => {
                    rpass.set_vertex_buffer(0, geometry.vertices.slice(..));
                    rpass.set_index_buffer(geometry.indices.slice(..), wgpu::IndexFormat::Uint32);
                    rpass.draw_indexed(0..*index_count, 0, 0..1);
                }
                DrawCall::External { buffer, first_vertex, vertex_count, .. } => {
                    let end = first_vertex.saturating_add(*vertex_count);
                    rpass.set_vertex_buffer(0, buffer.buffer().slice(..));
                    rpass.draw(*first_vertex..end, 0..1);
                }
            }
            issued += 1;
        }
        issued
    }
}
