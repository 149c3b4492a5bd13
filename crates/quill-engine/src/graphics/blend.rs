/// Weighting applied to a source or destination term of the blend equation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
}

/// How weighted source and destination terms are combined.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendEquation {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

/// Separate color/alpha blending configuration.
///
/// Structural equality: two modes batch together only if every field matches.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BlendMode {
    pub color_src_factor: BlendFactor,
    pub color_dst_factor: BlendFactor,
    pub color_equation: BlendEquation,
    pub alpha_src_factor: BlendFactor,
    pub alpha_dst_factor: BlendFactor,
    pub alpha_equation: BlendEquation,
}

impl Default for BlendMode {
    fn default() -> Self {
        Self::ALPHA
    }
}

impl BlendMode {
    /// Straight-alpha compositing: `dst = src * a + dst * (1 - a)`.
    pub const ALPHA: BlendMode = BlendMode::separate(
        BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha,
        BlendEquation::Add,
        BlendFactor::One,
        BlendFactor::OneMinusSrcAlpha,
        BlendEquation::Add,
    );

    pub const ADD: BlendMode = BlendMode::separate(
        BlendFactor::SrcAlpha,
        BlendFactor::One,
        BlendEquation::Add,
        BlendFactor::One,
        BlendFactor::One,
        BlendEquation::Add,
    );

    pub const MULTIPLY: BlendMode =
        BlendMode::uniform(BlendFactor::DstColor, BlendFactor::Zero, BlendEquation::Add);

    pub const MIN: BlendMode = BlendMode::uniform(BlendFactor::One, BlendFactor::One, BlendEquation::Min);

    pub const MAX: BlendMode = BlendMode::uniform(BlendFactor::One, BlendFactor::One, BlendEquation::Max);

    /// Overwrite the destination.
    pub const NONE: BlendMode = BlendMode::uniform(BlendFactor::One, BlendFactor::Zero, BlendEquation::Add);

    /// Same factors and equation for color and alpha.
    pub const fn uniform(src: BlendFactor, dst: BlendFactor, equation: BlendEquation) -> Self {
        Self::separate(src, dst, equation, src, dst, equation)
    }

    pub const fn separate(
        color_src_factor: BlendFactor,
        color_dst_factor: BlendFactor,
        color_equation: BlendEquation,
        alpha_src_factor: BlendFactor,
        alpha_dst_factor: BlendFactor,
        alpha_equation: BlendEquation,
    ) -> Self {
        Self {
            color_src_factor,
            color_dst_factor,
            color_equation,
            alpha_src_factor,
            alpha_dst_factor,
            alpha_equation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_alpha() {
        assert_eq!(BlendMode::default(), BlendMode::ALPHA);
    }

    #[test]
    fn presets_are_distinct() {
        let presets = [
            BlendMode::ALPHA,
            BlendMode::ADD,
            BlendMode::MULTIPLY,
            BlendMode::MIN,
            BlendMode::MAX,
            BlendMode::NONE,
        ];
        for (i, a) in presets.iter().enumerate() {
            for b in &presets[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
