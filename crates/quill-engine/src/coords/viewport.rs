/// Viewport size in logical pixels.
///
/// Uploaded once per flush; the vertex shader divides positions by it to reach NDC.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Returns a size that is always safe to divide by.
    #[inline]
    pub fn clamped(self) -> [f32; 2] {
        if self.is_valid() {
            [self.width, self.height]
        } else {
            [1.0, 1.0]
        }
    }
}
