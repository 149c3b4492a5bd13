use crate::backend::wgpu_impl::FrameTarget;
use crate::coords::Viewport;

/// One acquired surface texture plus the encoder recording into it.
///
/// Hold it only for the duration of a frame: the surface cannot hand out the
/// next texture while this one is alive.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

impl GpuFrame {
    /// Flush destination covering the whole surface texture.
    pub fn target(&mut self, viewport: Viewport) -> FrameTarget<'_> {
        FrameTarget::new(&mut self.encoder, &self.view, viewport)
    }
}
