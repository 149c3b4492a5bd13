//! winit event loop driving one window and its renderer.

mod clock;
mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
