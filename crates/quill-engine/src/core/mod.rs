//! Contract between the window runtime and applications drawing through the engine.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, FrameTime, WindowCtx};
