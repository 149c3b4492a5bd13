use std::sync::atomic::{AtomicU64, Ordering};

use crate::coords::Transform;

use super::{BlendMode, PrimitiveType};

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

fn next_resource_id() -> u64 {
    NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Identity of a texture owned by a backend.
///
/// Ids are unique for the lifetime of the process, so a stale id can never
/// alias a newer texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TextureId(u64);

impl TextureId {
    pub fn next() -> Self {
        Self(next_resource_id())
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Identity of a shader program owned by a backend.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ShaderId(u64);

impl ShaderId {
    pub fn next() -> Self {
        Self(next_resource_id())
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Caller-facing per-draw states.
///
/// `None` texture/shader selects the backend defaults.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct RenderStates {
    pub blend_mode: BlendMode,
    pub transform: Transform,
    pub texture: Option<TextureId>,
    pub shader: Option<ShaderId>,
}

impl RenderStates {
    pub const DEFAULT: RenderStates = RenderStates {
        blend_mode: BlendMode::ALPHA,
        transform: Transform::IDENTITY,
        texture: None,
        shader: None,
    };

    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_texture(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_shader(mut self, shader: ShaderId) -> Self {
        self.shader = Some(shader);
        self
    }
}

/// The GPU state a batch needs to execute.
///
/// Two snapshots are interchangeable iff all four fields match. The transform
/// is absent: it is baked into vertex positions on the CPU.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct StepState {
    pub primitive: PrimitiveType,
    pub blend_mode: BlendMode,
    pub texture: Option<TextureId>,
    pub shader: Option<ShaderId>,
}

impl StepState {
    pub fn new(primitive: PrimitiveType, states: &RenderStates) -> Self {
        Self {
            primitive,
            blend_mode: states.blend_mode,
            texture: states.texture,
            shader: states.shader,
        }
    }
}

impl Default for StepState {
    fn default() -> Self {
        Self::new(PrimitiveType::Points, &RenderStates::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = TextureId::next();
        let b = TextureId::next();
        let s = ShaderId::next();
        assert_ne!(a, b);
        assert_ne!(a.raw(), s.raw());
        assert_ne!(b.raw(), s.raw());
    }

    #[test]
    fn snapshot_ignores_transform() {
        let a = RenderStates::DEFAULT;
        let b = RenderStates::DEFAULT.with_transform(Transform::translation(3.0, 4.0));
        assert_eq!(
            StepState::new(PrimitiveType::Triangles, &a),
            StepState::new(PrimitiveType::Triangles, &b)
        );
    }

    #[test]
    fn snapshot_compares_every_field() {
        let base = StepState::new(PrimitiveType::Triangles, &RenderStates::DEFAULT);
        let tex = RenderStates::DEFAULT.with_texture(TextureId::next());
        let shader = RenderStates::DEFAULT.with_shader(ShaderId::next());
        let blend = RenderStates::DEFAULT.with_blend_mode(BlendMode::ADD);

        assert_ne!(base, StepState::new(PrimitiveType::Lines, &RenderStates::DEFAULT));
        assert_ne!(base, StepState::new(PrimitiveType::Triangles, &tex));
        assert_ne!(base, StepState::new(PrimitiveType::Triangles, &shader));
        assert_ne!(base, StepState::new(PrimitiveType::Triangles, &blend));
    }
}
