//! SetupCollection: the ordered, lock-guarded registry of setups.
//!
//! Order is append order and later setups take priority. Every operation
//! that scans or mutates the list runs entirely under one mutex; only the
//! mirrored length and the event flag are read without it.

use crate::invocation::Invocation;
use crate::reentrancy::{DebugReentrancy, ReentrancyGuard};
use crate::setup::Setup;
use crate::shape::InvocationShape;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use hashbrown::HashSet;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct SetupCollection {
    setups: Mutex<Vec<Arc<Setup>>>,
    // Mirrors `setups.len()`; only written under the lock.
    len: AtomicUsize,
    has_event_setup: AtomicBool,
    reentrancy: DebugReentrancy,
}

// Field order matters: the reentrancy guard is dropped before the lock.
struct Locked<'a> {
    _reentrancy: ReentrancyGuard<'a>,
    setups: MutexGuard<'a, Vec<Arc<Setup>>>,
}

impl Deref for Locked<'_> {
    type Target = Vec<Arc<Setup>>;
    fn deref(&self) -> &Self::Target {
        &self.setups
    }
}

impl DerefMut for Locked<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.setups
    }
}

/// Owned, newest-first snapshot of setups.
///
/// Materialized under the lock; iterating it never touches the collection.
#[derive(Debug)]
pub struct Snapshot {
    it: std::vec::IntoIter<Arc<Setup>>,
}

impl Iterator for Snapshot {
    type Item = Arc<Setup>;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next()
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl ExactSizeIterator for Snapshot {}

impl SetupCollection {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Locked<'_> {
        self.reentrancy.check();
        let setups = self.setups.lock();
        Locked {
            _reentrancy: self.reentrancy.enter(),
            setups,
        }
    }

    /// Lock-free; may be momentarily stale under concurrent mutation.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once any setup targeting an event accessor has been added.
    /// Only `clear` resets it.
    pub fn has_event_setup(&self) -> bool {
        self.has_event_setup.load(Ordering::Acquire)
    }

    /// Append `setup` with the highest priority and recompute which setups
    /// are overridden. Returns the shared handle now owned by the collection.
    ///
    /// Adding a handle that is already in the collection is a no-op; its
    /// position and state are left as they are.
    pub fn add(&self, setup: impl Into<Arc<Setup>>) -> Arc<Setup> {
        let setup = setup.into();
        let mut setups = self.lock();

        if setups.iter().any(|s| Arc::ptr_eq(s, &setup)) {
            tracing::trace!(shape = %setup.shape(), "setup already added");
            return setup;
        }

        if setup.member().is_event_accessor() {
            self.has_event_setup.store(true, Ordering::Release);
        }
        tracing::trace!(shape = %setup.shape(), conditional = setup.is_conditional(), "adding setup");
        setups.push(Arc::clone(&setup));
        self.len.store(setups.len(), Ordering::Release);

        mark_overridden_setups(&setups);
        setup
    }

    /// Remove every setup that targets a property getter or setter.
    ///
    /// Overrides are not recomputed: a property accessor setup can only have
    /// overridden another setup for the same accessor, and those are removed
    /// in the same pass.
    pub fn remove_all_property_accessor_setups(&self) {
        if self.is_empty() {
            return;
        }

        let mut setups = self.lock();
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut *setups)
            .into_iter()
            .partition(|s| s.member().is_property_accessor());
        *setups = kept;
        self.len.store(setups.len(), Ordering::Release);
        tracing::debug!(
            removed = removed.len(),
            remaining = setups.len(),
            "removed property accessor setups"
        );

        // Removed setups may own user closures; drop them unlocked.
        drop(setups);
        drop(removed);
    }

    /// Remove all setups and reset `has_event_setup`.
    pub fn clear(&self) {
        let mut setups = self.lock();
        let removed = std::mem::take(&mut *setups);
        self.len.store(0, Ordering::Release);
        self.has_event_setup.store(false, Ordering::Release);
        tracing::debug!(removed = removed.len(), "cleared setups");

        drop(setups);
        drop(removed);
    }

    /// True if any setup satisfies `predicate`, overridden and conditional
    /// setups included. `predicate` runs under the lock.
    pub fn any<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&Setup) -> bool,
    {
        let setups = self.lock();
        setups.iter().any(|s| predicate(s))
    }

    /// Resolve the setup that governs `invocation`, if any.
    ///
    /// Scans newest to oldest, skipping overridden setups. The first matching
    /// setup becomes the candidate. A later-scanned setup whose member is
    /// exactly the invoked member (not just compatible with it) and that also
    /// matches takes precedence; the scan stops at the first such setup.
    pub fn find_match_for(&self, invocation: &Invocation) -> Option<Arc<Setup>> {
        if self.is_empty() {
            return None;
        }

        let setups = self.lock();
        let target = invocation.member();
        let mut candidate: Option<&Arc<Setup>> = None;

        for setup in setups.iter().rev() {
            if setup.is_overridden() {
                continue;
            }

            if candidate.is_none() {
                if setup.matches(invocation) {
                    candidate = Some(setup);
                    if setup.member() == target {
                        break;
                    }
                }
            } else if setup.member() == target && setup.matches(invocation) {
                candidate = Some(setup);
                break;
            }
        }

        tracing::trace!(
            member = %target,
            matched = ?candidate.map(|s| s.shape().to_string()),
            "resolved invocation"
        );
        candidate.cloned()
    }

    /// Active, non-conditional setups that return a nested mock, newest first.
    pub fn inner_mock_setups(&self) -> Vec<Arc<Setup>> {
        self.to_vec_live(|s| s.inner_mock().is_some())
    }

    /// Reset invocation state on every setup, overridden and conditional
    /// ones included.
    pub fn uninvoke_all(&self) {
        let setups = self.lock();
        for setup in setups.iter() {
            setup.uninvoke();
        }
    }

    /// Newest-first copy of the active, non-conditional setups satisfying
    /// `predicate`. `predicate` runs under the lock.
    pub fn to_vec_live<F>(&self, mut predicate: F) -> Vec<Arc<Setup>>
    where
        F: FnMut(&Setup) -> bool,
    {
        if self.is_empty() {
            return Vec::new();
        }

        let setups = self.lock();
        setups
            .iter()
            .rev()
            .filter(|s| !s.is_overridden() && !s.is_conditional() && predicate(s))
            .cloned()
            .collect()
    }

    /// Newest-first copy of every setup, overridden and conditional included.
    pub fn to_vec(&self) -> Vec<Arc<Setup>> {
        let setups = self.lock();
        setups.iter().rev().cloned().collect()
    }

    /// Snapshot of the active setups, newest first.
    pub fn iter(&self) -> Snapshot {
        Snapshot {
            it: self.to_vec_live(|_| true).into_iter(),
        }
    }

    #[cfg(feature = "bench_internal")]
    pub fn shadowing_pass_for_bench(&self) {
        let setups = self.lock();
        mark_overridden_setups(&setups);
    }
}

impl<'a> IntoIterator for &'a SetupCollection {
    type Item = Arc<Setup>;
    type IntoIter = Snapshot;
    fn into_iter(self) -> Snapshot {
        self.iter()
    }
}

// Newest to oldest: the first setup seen for a shape stays active, every older
// one with that shape is overridden. Setups that do not take part in
// shadowing are skipped, as are setups that are already overridden.
fn mark_overridden_setups(setups: &[Arc<Setup>]) {
    let mut seen: HashSet<&InvocationShape> = HashSet::with_capacity(setups.len());
    for setup in setups.iter().rev() {
        if setup.is_overridden() || !setup.participates_in_shadowing() {
            continue;
        }
        if !seen.insert(setup.shape()) && setup.mark_overridden() {
            tracing::trace!(shape = %setup.shape(), "setup overridden");
        }
    }
}
