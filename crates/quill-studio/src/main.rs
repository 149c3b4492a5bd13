use anyhow::{Context, Result};
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{Key, NamedKey};

use quill_engine::backend::wgpu_impl::{VertexBuffer, WgpuBackend};
use quill_engine::batch::Renderer;
use quill_engine::coords::{Transform, Vec2, Viewport};
use quill_engine::core::{App, AppControl, FrameCtx};
use quill_engine::device::GpuInit;
use quill_engine::graphics::{BlendMode, Color, PrimitiveType, RenderStates, TextureId, Vertex};
use quill_engine::logging::{init_logging, LoggingConfig};
use quill_engine::window::{Runtime, RuntimeConfig};

const CHECKER_SIZES: [u32; 2] = [8, 16];
const STATS_EVERY: u64 = 120;

/// Three layers per frame:
/// - a static checkerboard background (identical every frame: cache hits)
/// - a rotating fan (new vertices every frame: uploads)
/// - a ring stored in a GPU vertex buffer, plus a GPU copy of it (each its own step)
///
/// Space swaps the checker texture for one of a different resolution; `P`
/// toggles the copy between lines and points.
#[derive(Default)]
struct Studio {
    checker: Option<TextureId>,
    checker_size: usize,
    swap_checker: bool,
    ring: Option<VertexBuffer>,
    outline: Option<VertexBuffer>,
}

impl Studio {
    fn replace_checker(&mut self, backend: &mut WgpuBackend) -> Result<()> {
        if let Some(old) = self.checker.take() {
            backend.destroy_texture(old);
        }
        self.checker_size = (self.checker_size + 1) % CHECKER_SIZES.len();
        let size = CHECKER_SIZES[self.checker_size];
        let texture = backend
            .create_texture_rgba8(size, size, &checker_pixels(size))
            .context("failed to create checker texture")?;
        if let Some((w, h)) = backend.texture_size(texture) {
            log::info!("checker texture is now {w}x{h}");
        }
        self.checker = Some(texture);
        Ok(())
    }
}

impl App for Studio {
    fn on_start(&mut self, renderer: &mut Renderer<WgpuBackend>) -> Result<()> {
        let backend = renderer.backend_mut();

        let size = CHECKER_SIZES[0];
        let checker = backend
            .create_texture_rgba8(size, size, &checker_pixels(size))
            .context("failed to create checker texture")?;
        self.checker = Some(checker);

        let ring = ring_vertices(Vec2::new(160.0, 160.0), 60.0, 90.0, 48);
        let mut buffer = VertexBuffer::new(PrimitiveType::TriangleStrip);
        buffer
            .create(backend.device(), ring.len())
            .context("failed to allocate ring buffer")?;
        buffer
            .update(backend.device(), backend.queue(), &ring, 0)
            .context("failed to upload ring vertices")?;

        // Same vertices, replayed as a zigzag of lines.
        let mut outline = VertexBuffer::new(PrimitiveType::LineStrip);
        outline
            .create(backend.device(), 1)
            .context("failed to allocate outline buffer")?;
        outline
            .update_from(backend.device(), backend.queue(), &buffer)
            .context("failed to copy ring vertices")?;
        self.ring = Some(buffer);
        self.outline = Some(outline);

        Ok(())
    }

    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let WindowEvent::KeyboardInput { event, .. } = event else {
            return AppControl::Continue;
        };
        if event.state != ElementState::Pressed || event.repeat {
            return AppControl::Continue;
        }

        match &event.logical_key {
            Key::Named(NamedKey::Space) => self.swap_checker = true,
            Key::Character(c) if c.eq_ignore_ascii_case("p") => {
                if let Some(outline) = self.outline.as_mut() {
                    let next = match outline.primitive_type() {
                        PrimitiveType::Points => PrimitiveType::LineStrip,
                        _ => PrimitiveType::Points,
                    };
                    outline.set_primitive_type(next);
                }
            }
            _ => {}
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if std::mem::take(&mut self.swap_checker) {
            if let Err(err) = self.replace_checker(ctx.renderer.backend_mut()) {
                log::error!("{err:#}");
                return AppControl::Exit;
            }
        }

        let time = ctx.time;
        let angle = time.elapsed.as_secs_f32() * 45.0;
        let (checker, ring, outline) = (self.checker, self.ring.as_ref(), self.outline.as_ref());

        let (control, stats) = ctx.render(|r, viewport| {
            r.clear(Color::rgb(24, 24, 32));
            draw_background(r, viewport, checker);
            draw_spinner(r, viewport, angle);
            if let Some(ring) = ring {
                r.submit_vertex_buffer(ring, &RenderStates::DEFAULT.with_blend_mode(BlendMode::ADD));
            }
            if let Some(outline) = outline {
                r.submit_vertex_buffer(outline, &RenderStates::DEFAULT);
            }
        });

        if let Some(stats) = stats.filter(|_| time.frame_index % STATS_EVERY == 0) {
            log::info!(
                "frame {}: {} steps, {} draws, {} uploads, {} reused, {} evicted",
                time.frame_index,
                stats.steps,
                stats.draws,
                stats.uploads,
                stats.reused,
                stats.evicted
            );
        }
        control
    }
}

fn draw_background(r: &mut Renderer<WgpuBackend>, viewport: Viewport, checker: Option<TextureId>) {
    let (w, h) = (viewport.width, viewport.height);
    let tiles = (w / 64.0).max(1.0);
    let quad = [
        Vertex::new(Vec2::new(0.0, 0.0), Color::WHITE, Vec2::new(0.0, 0.0)),
        Vertex::new(Vec2::new(w, 0.0), Color::WHITE, Vec2::new(1.0, 0.0)),
        Vertex::new(Vec2::new(w, h), Color::WHITE, Vec2::new(1.0, 1.0)),
        Vertex::new(Vec2::new(0.0, h), Color::WHITE, Vec2::new(0.0, 1.0)),
    ];
    let mut states = RenderStates::DEFAULT;
    if let Some(texture) = checker {
        states = states.with_texture(texture);
    }
    r.submit(&quad, PrimitiveType::TriangleFan, &states);

    // Grid lines share one untextured step.
    let color = Color::rgba(255, 255, 255, 40);
    let step = w / tiles;
    let mut x = 0.0;
    while x <= w {
        let line = [Vertex::colored(Vec2::new(x, 0.0), color), Vertex::colored(Vec2::new(x, h), color)];
        r.submit(&line, PrimitiveType::Lines, &RenderStates::DEFAULT);
        x += step;
    }
}

fn draw_spinner(r: &mut Renderer<WgpuBackend>, viewport: Viewport, angle: f32) {
    let center = Vec2::new(viewport.width * 0.5, viewport.height * 0.5);
    let mut fan = vec![Vertex::colored(Vec2::zero(), Color::WHITE)];
    for i in 0..=6 {
        let a = (i as f32) * std::f32::consts::TAU / 6.0;
        let color = if i % 2 == 0 { Color::MAGENTA } else { Color::CYAN };
        fan.push(Vertex::colored(Vec2::new(a.cos() * 80.0, a.sin() * 80.0), color));
    }

    let mut transform = Transform::translation(center.x, center.y);
    transform.rotate(angle);
    r.submit(&fan, PrimitiveType::TriangleFan, &RenderStates::DEFAULT.with_transform(transform));
}

fn ring_vertices(center: Vec2, inner: f32, outer: f32, segments: u32) -> Vec<Vertex> {
    (0..=segments)
        .flat_map(|i| {
            let a = (i as f32) * std::f32::consts::TAU / (segments as f32);
            let dir = Vec2::new(a.cos(), a.sin());
            [
                Vertex::colored(center + dir * inner, Color::rgba(255, 160, 0, 160)),
                Vertex::colored(center + dir * outer, Color::rgba(255, 60, 0, 0)),
            ]
        })
        .collect()
}

fn checker_pixels(size: u32) -> Vec<u8> {
    (0..size * size)
        .flat_map(|i| {
            let (x, y) = (i % size, i / size);
            if (x + y) % 2 == 0 { [70, 70, 90, 255] } else { [50, 50, 64, 255] }
        })
        .collect()
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "quill studio".to_string(),
        ..RuntimeConfig::default()
    };

    Runtime::run(config, GpuInit::default(), Studio::default())
}
