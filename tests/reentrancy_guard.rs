// Reentrancy from caller predicates.
//
// Predicates run under the collection lock. Calling back into a locking
// operation of the same collection from that predicate is a contract
// violation; debug builds turn the would-be deadlock into a panic. Setups
// removed by the collection are dropped after it unlocks, so their captured
// state may read the collection from `Drop`.
use setup_registry::{Member, Setup, SetupCollection};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn populated() -> SetupCollection {
    let c = SetupCollection::new();
    c.add(Setup::builder(Member::method("app::Service", "run", [""; 0])).build());
    c
}

// Captured by a setup's condition. Dropping it reads the collection back
// through a locking operation and records the length it saw.
struct ReadsOnDrop {
    collection: Arc<SetupCollection>,
    seen: Arc<AtomicUsize>,
}

impl ReadsOnDrop {
    fn armed(&self) -> bool {
        true
    }
}

impl Drop for ReadsOnDrop {
    fn drop(&mut self) {
        self.seen.store(self.collection.to_vec().len(), Ordering::SeqCst);
    }
}

fn reads_on_drop(c: &Arc<SetupCollection>, member: Member) -> (Setup, Arc<AtomicUsize>) {
    let seen = Arc::new(AtomicUsize::new(usize::MAX));
    let guard = ReadsOnDrop {
        collection: Arc::clone(c),
        seen: Arc::clone(&seen),
    };
    let setup = Setup::builder(member).when(move || guard.armed()).build();
    (setup, seen)
}

// Test: lock-free reads are allowed from inside a predicate.
#[test]
fn lock_free_reads_inside_predicate_are_ok() {
    let c = populated();
    assert!(c.any(|_| c.len() == 1 && !c.has_event_setup()));
}

// Test: another collection may be used from inside a predicate.
#[test]
fn other_collection_inside_predicate_is_ok() {
    let a = populated();
    let b = populated();
    assert!(a.any(|_| b.to_vec().len() == 1));
}

#[cfg(debug_assertions)]
#[test]
fn reentrant_scan_panics_in_debug() {
    let c = populated();
    let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        c.any(|_| c.to_vec().is_empty())
    }));
    assert!(res.is_err(), "expected reentrancy to panic in debug builds");

    // The guard and the lock were released during unwinding.
    assert_eq!(c.to_vec().len(), 1);
    c.add(Setup::builder(Member::method("app::Service", "stop", [""; 0])).build());
    assert_eq!(c.iter().count(), 2);
}

#[cfg(debug_assertions)]
#[test]
fn reentrant_add_from_live_predicate_panics_in_debug() {
    let c = populated();
    let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        c.to_vec_live(|_| {
            c.add(Setup::builder(Member::method("app::Service", "run", [""; 0])).build());
            true
        })
    }));
    assert!(res.is_err());
    assert_eq!(c.len(), 1);
}

// Test: clear drops setups whose captured state re-enters the collection.
// Assumes: the collection holds the only handle to the setup.
// Verifies: the drop runs after the lock is released and sees the cleared list.
#[test]
fn clear_drops_removed_setups_outside_the_lock() {
    let c = Arc::new(SetupCollection::new());
    let (setup, seen) = reads_on_drop(&c, Member::method("app::Service", "run", [""; 0]));
    c.add(setup);
    c.add(Setup::builder(Member::method("app::Service", "stop", [""; 0])).build());

    c.clear();
    assert_eq!(seen.load(Ordering::SeqCst), 0);
    assert!(c.is_empty());
}

// Test: bulk property accessor removal drops removed setups unlocked.
// Verifies: the drop observes only the setups that were kept.
#[test]
fn property_removal_drops_removed_setups_outside_the_lock() {
    let c = Arc::new(SetupCollection::new());
    let (setup, seen) = reads_on_drop(&c, Member::property_getter("app::Service", "name"));
    c.add(setup);
    c.add(Setup::builder(Member::method("app::Service", "stop", [""; 0])).build());

    c.remove_all_property_accessor_setups();
    assert_eq!(seen.load(Ordering::SeqCst), 1);
    assert_eq!(c.len(), 1);
}
