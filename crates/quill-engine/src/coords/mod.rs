//! Coordinate and geometry types consumed by the vertex codec.
//!
//! Canonical CPU space:
//! - Logical pixels
//! - Origin top-left
//! - +X right, +Y down
//!
//! The backend converts to NDC in its vertex shader using a viewport uniform.

mod transform;
mod vec2;
mod viewport;

pub use transform::Transform;
pub use vec2::Vec2;
pub use viewport::Viewport;
