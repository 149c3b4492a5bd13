use anyhow::Result;
use winit::event::WindowEvent;

use crate::backend::wgpu_impl::WgpuBackend;
use crate::batch::Renderer;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application driven by [`Runtime`](crate::window::Runtime).
pub trait App {
    /// Called once after the window's renderer exists; create textures, shaders
    /// and vertex buffers here. An error aborts the runtime.
    fn on_start(&mut self, renderer: &mut Renderer<WgpuBackend>) -> Result<()> {
        let _ = renderer;
        Ok(())
    }

    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per redraw.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
