use super::Vec2;

/// 2D affine transform (3x3 matrix with an implicit `[0 0 1]` last row).
///
/// Layout is row-major:
///
/// ```text
/// | a  b  tx |
/// | c  d  ty |
/// | 0  0  1  |
/// ```
///
/// Applied to vertex positions on the CPU while encoding, so it never takes
/// part in batch state comparison.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    m: [f32; 6],
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        m: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    };

    #[inline]
    pub const fn new(a: f32, b: f32, tx: f32, c: f32, d: f32, ty: f32) -> Self {
        Self { m: [a, b, tx, c, d, ty] }
    }

    #[inline]
    pub const fn translation(x: f32, y: f32) -> Self {
        Self::new(1.0, 0.0, x, 0.0, 1.0, y)
    }

    #[inline]
    pub const fn scaling(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, 0.0, sy, 0.0)
    }

    /// Rotation by `degrees`, clockwise on screen (+Y down).
    pub fn rotation(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(cos, -sin, 0.0, sin, cos, 0.0)
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Returns `self * other`: `other` is applied first, then `self`.
    pub fn combine(&self, other: &Transform) -> Transform {
        let [a1, b1, x1, c1, d1, y1] = self.m;
        let [a2, b2, x2, c2, d2, y2] = other.m;
        Transform::new(
            a1 * a2 + b1 * c2,
            a1 * b2 + b1 * d2,
            a1 * x2 + b1 * y2 + x1,
            c1 * a2 + d1 * c2,
            c1 * b2 + d1 * d2,
            c1 * x2 + d1 * y2 + y1,
        )
    }

    /// Appends a translation applied before the current transform.
    pub fn translate(&mut self, offset: Vec2) -> &mut Self {
        *self = self.combine(&Transform::translation(offset.x, offset.y));
        self
    }

    /// Appends a scale applied before the current transform.
    pub fn scale(&mut self, factors: Vec2) -> &mut Self {
        *self = self.combine(&Transform::scaling(factors.x, factors.y));
        self
    }

    /// Appends a rotation applied before the current transform.
    pub fn rotate(&mut self, degrees: f32) -> &mut Self {
        *self = self.combine(&Transform::rotation(degrees));
        self
    }

    #[inline]
    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        let [a, b, tx, c, d, ty] = self.m;
        Vec2::new(a * p.x + b * p.y + tx, c * p.x + d * p.y + ty)
    }
}
