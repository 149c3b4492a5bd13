use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::ContextId;

/// Identity of a render target. Ids start at 1; none is ever reused.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TargetId(u64);

static NEXT_TARGET_ID: AtomicU64 = AtomicU64::new(1);

impl TargetId {
    pub fn next() -> Self {
        Self(NEXT_TARGET_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Maps each graphics context to the render target currently active on it.
///
/// Shared between threads (typically behind an `Arc`); every access goes
/// through one mutex.
#[derive(Debug, Default)]
pub struct ActiveTargetRegistry {
    map: Mutex<HashMap<ContextId, TargetId>>,
}

impl ActiveTargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ContextId, TargetId>> {
        // The map holds plain ids; a panic elsewhere cannot leave it inconsistent.
        self.map.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims `context` for `target`, replacing any previous claim.
    pub fn acquire(&self, context: ContextId, target: TargetId) {
        let previous = self.lock().insert(context, target);
        if let Some(prev) = previous.filter(|p| *p != target) {
            log::trace!(
                "context {} switched from target {} to {}",
                context.raw(),
                prev.raw(),
                target.raw()
            );
        }
    }

    /// Clears whatever target is active on `context`.
    pub fn release(&self, context: ContextId) -> Option<TargetId> {
        self.lock().remove(&context)
    }

    /// Clears the claim only if `target` still holds it.
    pub fn release_if(&self, context: ContextId, target: TargetId) -> bool {
        let mut map = self.lock();
        if map.get(&context) == Some(&target) {
            map.remove(&context);
            true
        } else {
            false
        }
    }

    pub fn active_target(&self, context: ContextId) -> Option<TargetId> {
        self.lock().get(&context).copied()
    }

    pub fn is_active(&self, context: ContextId, target: TargetId) -> bool {
        self.active_target(context) == Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::GraphicsContext;
    use std::sync::Arc;

    #[test]
    fn target_ids_start_above_zero_and_increase() {
        let a = TargetId::next();
        let b = TargetId::next();
        assert!(a.raw() >= 1);
        assert!(b > a);
    }

    #[test]
    fn acquire_replaces_previous_target() {
        let reg = ActiveTargetRegistry::new();
        let ctx = GraphicsContext::new().id();
        let (a, b) = (TargetId::next(), TargetId::next());

        reg.acquire(ctx, a);
        assert!(reg.is_active(ctx, a));
        reg.acquire(ctx, b);
        assert!(!reg.is_active(ctx, a));
        assert!(reg.is_active(ctx, b));
    }

    #[test]
    fn release_if_ignores_other_targets() {
        let reg = ActiveTargetRegistry::new();
        let ctx = GraphicsContext::new().id();
        let (a, b) = (TargetId::next(), TargetId::next());

        reg.acquire(ctx, b);
        assert!(!reg.release_if(ctx, a));
        assert_eq!(reg.active_target(ctx), Some(b));
        assert!(reg.release_if(ctx, b));
        assert_eq!(reg.active_target(ctx), None);
    }

    #[test]
    fn release_clears_any_holder() {
        let reg = ActiveTargetRegistry::new();
        let (ctx, other) = (GraphicsContext::new().id(), GraphicsContext::new().id());
        let (a, b) = (TargetId::next(), TargetId::next());

        reg.acquire(ctx, a);
        reg.acquire(other, b);
        assert_eq!(reg.release(ctx), Some(a));
        assert_eq!(reg.release(ctx), None);
        assert_eq!(reg.active_target(other), Some(b));
    }

    #[test]
    fn contexts_are_independent_across_threads() {
        let reg = Arc::new(ActiveTargetRegistry::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let reg = Arc::clone(&reg);
                std::thread::spawn(move || {
                    let ctx = GraphicsContext::new();
                    ctx.make_current();
                    let target = TargetId::next();
                    for _ in 0..100 {
                        reg.acquire(ctx.id(), target);
                        assert!(reg.is_active(ctx.id(), target));
                    }
                    (ctx.id(), target)
                })
            })
            .collect();

        for h in handles {
            let (ctx, target) = h.join().unwrap();
            assert_eq!(reg.active_target(ctx), Some(target));
        }
    }
}
