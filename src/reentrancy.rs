//! Debug-only reentrancy guard.
//!
//! Records which thread currently holds a collection's lock. A caller
//! predicate that calls back into the same collection from that thread would
//! otherwise deadlock on the non-reentrant lock; in debug builds it panics
//! instead. In release builds this compiles to a zero-cost no-op.
//!
//! Usage is two-phase: `check()` before blocking on the lock, `enter()` once
//! the lock is held. The guard must be dropped before the lock is released.

#[cfg(debug_assertions)]
use core::sync::atomic::{AtomicU64, Ordering};
#[cfg(not(debug_assertions))]
use core::marker::PhantomData;

#[cfg(debug_assertions)]
fn current_thread_token() -> u64 {
    // 0 is reserved for "no holder".
    static NEXT: AtomicU64 = AtomicU64::new(1);
    thread_local! {
        static TOKEN: u64 = NEXT.fetch_add(1, Ordering::Relaxed);
    }
    TOKEN.with(|t| *t)
}

/// Per-instance reentrancy tracker.
#[derive(Debug)]
pub(crate) struct DebugReentrancy {
    #[cfg(debug_assertions)]
    holder: AtomicU64,
}

impl DebugReentrancy {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            holder: AtomicU64::new(0),
        }
    }

    /// Panics (debug builds) if the calling thread is already inside.
    #[inline]
    pub(crate) fn check(&self) {
        #[cfg(debug_assertions)]
        {
            assert!(
                self.holder.load(Ordering::Acquire) != current_thread_token(),
                "reentrancy detected: nested entry into setup collection"
            );
        }
    }

    /// Record the calling thread as holder. Call only while holding the lock.
    #[inline]
    pub(crate) fn enter(&self) -> ReentrancyGuard<'_> {
        #[cfg(debug_assertions)]
        {
            self.holder.store(current_thread_token(), Ordering::Release);
            return ReentrancyGuard { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            return ReentrancyGuard { _z: PhantomData };
        }
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard returned by `DebugReentrancy::enter`.
pub(crate) struct ReentrancyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl<'a> Drop for ReentrancyGuard<'a> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            self.owner.holder.store(0, Ordering::Release);
        }
    }
}
