//! Immediate-mode batching engine.
//!
//! Flow per frame:
//! 1) `Renderer::submit*` expands draws and groups consecutive state-identical ones
//!    into an open step
//! 2) on a state change the open step is closed and reconciled against the
//!    previous frame (`StepSequence::close`), uploading only on divergence
//! 3) `Renderer::flush` replays the committed sequence in order and resets the cursor

mod fingerprint;
mod renderer;
mod sequence;
mod stats;
mod step;

pub use fingerprint::Fingerprint;
pub use renderer::Renderer;
pub use sequence::StepSequence;
pub use stats::FlushStats;
pub use step::{DrawStep, ExternalRange};
