//! Renderer-agnostic drawing vocabulary.
//!
//! Responsibilities:
//! - vertex layout and the codec that flattens vertices into GPU scalars
//! - primitive kinds and their expansion into indexed elemental lists
//! - render state: blend modes, texture/shader identities, the batch snapshot

mod blend;
mod color;
mod expand;
mod primitive;
mod state;
mod vertex;

pub use blend::{BlendEquation, BlendFactor, BlendMode};
pub use color::Color;
pub use expand::{expand_into, expanded_index_count};
pub use primitive::PrimitiveType;
pub use state::{RenderStates, ShaderId, StepState, TextureId};
pub use vertex::{encode_vertex, GpuVertex, Vertex, FLOATS_PER_VERTEX};
