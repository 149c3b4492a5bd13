//! Quill engine crate.
//!
//! Immediate-mode 2D drawing on top of wgpu: callers submit vertices every
//! frame, the engine batches consecutive state-identical draws and re-uploads
//! only the batches that changed since the previous frame.

pub mod backend;
pub mod batch;
pub mod context;
pub mod coords;
pub mod graphics;

pub mod core;
pub mod device;
pub mod window;

pub mod logging;
