use std::time::Duration;

use winit::window::Window;

use crate::backend::wgpu_impl::WgpuBackend;
use crate::batch::{FlushStats, Renderer};
use crate::coords::Viewport;
use crate::device::{Gpu, SurfaceErrorAction};

use super::app::AppControl;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, Default)]
pub struct FrameTime {
    /// Seconds since the previous frame, clamped to a sane range.
    pub dt: f32,
    /// Time since the runtime started.
    pub elapsed: Duration,
    pub frame_index: u64,
}

pub struct WindowCtx<'a> {
    pub window: &'a Window,
}

impl WindowCtx<'_> {
    /// Window size in logical pixels: the coordinate space vertices are submitted in.
    pub fn viewport(&self) -> Viewport {
        let logical: winit::dpi::LogicalSize<f64> =
            self.window.inner_size().to_logical(self.window.scale_factor());
        Viewport::new(logical.width as f32, logical.height as f32)
    }
}

/// Per-frame context passed to [`App::on_frame`](super::App::on_frame).
///
/// `'a` is the callback, `'w` the window borrow carried by `Gpu<'w>`.
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub renderer: &'a mut Renderer<WgpuBackend>,
    pub time: FrameTime,
}

impl FrameCtx<'_, '_> {
    /// Acquires the next surface texture, lets `draw` submit into the renderer,
    /// flushes the batched plan into the texture and presents it.
    ///
    /// When no texture can be acquired `draw` is not called, so the renderer's
    /// cached plan stays as it was.
    pub fn render<F>(&mut self, draw: F) -> (AppControl, Option<FlushStats>)
    where
        F: FnOnce(&mut Renderer<WgpuBackend>, Viewport),
    {
        let viewport = self.window.viewport();

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                log::debug!("surface unavailable: {err}");
                let control = match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => AppControl::Exit,
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        AppControl::Continue
                    }
                };
                return (control, None);
            }
        };

        draw(self.renderer, viewport);

        // The target borrows the frame's encoder; dropped before submit() takes the frame.
        let stats = {
            let mut target = frame.target(viewport);
            self.renderer.flush(&mut target)
        };

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);

        (AppControl::Continue, Some(stats))
    }
}
