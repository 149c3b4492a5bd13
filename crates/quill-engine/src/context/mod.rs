//! Graphics-context identity and active render-target bookkeeping.
//!
//! A thread has at most one current graphics context. Each context may have one
//! render target considered "active" on it; the [`ActiveTargetRegistry`] tracks
//! that mapping and is the only state shared between threads.

mod registry;

pub use registry::{ActiveTargetRegistry, TargetId};

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of a graphics context. `ContextId::NONE` means no context is current.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl ContextId {
    pub const NONE: ContextId = ContextId(0);

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT_CONTEXT: Cell<ContextId> = const { Cell::new(ContextId::NONE) };
}

/// Returns the graphics context current on the calling thread.
pub fn active_context_id() -> ContextId {
    CURRENT_CONTEXT.with(Cell::get)
}

/// A graphics context handle that can be made current on a thread.
///
/// The wgpu runtime creates one per window and makes it current before driving
/// a frame.
#[derive(Debug)]
pub struct GraphicsContext {
    id: ContextId,
}

impl GraphicsContext {
    pub fn new() -> Self {
        Self {
            id: ContextId(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed)),
        }
    }

    #[inline]
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Makes this context current on the calling thread.
    pub fn make_current(&self) {
        CURRENT_CONTEXT.with(|c| c.set(self.id));
    }

    pub fn is_current(&self) -> bool {
        active_context_id() == self.id
    }

    /// Leaves the calling thread without a current context, if this one was current.
    pub fn release_current(&self) {
        CURRENT_CONTEXT.with(|c| {
            if c.get() == self.id {
                c.set(ContextId::NONE);
            }
        });
    }
}

impl Default for GraphicsContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for GraphicsContext {
    fn drop(&mut self) {
        self.release_current();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_context_by_default() {
        std::thread::spawn(|| assert_eq!(active_context_id(), ContextId::NONE))
            .join()
            .unwrap();
    }

    #[test]
    fn make_current_is_per_thread() {
        let ctx = GraphicsContext::new();
        ctx.make_current();
        assert!(ctx.is_current());

        std::thread::spawn(|| assert_eq!(active_context_id(), ContextId::NONE))
            .join()
            .unwrap();

        ctx.release_current();
        assert_eq!(active_context_id(), ContextId::NONE);
    }

    #[test]
    fn dropping_current_context_clears_it() {
        let ctx = GraphicsContext::new();
        ctx.make_current();
        drop(ctx);
        assert_eq!(active_context_id(), ContextId::NONE);
    }
}
