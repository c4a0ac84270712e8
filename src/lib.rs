//! setup-registry: a thread-safe registry of mock setups that decides which
//! setup, if any, governs an incoming call.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the rule store of a mocking library correct under concurrent
//!   configuration and interception, with each layer small enough to reason
//!   about independently.
//! - Layers:
//!   - Member / Invocation: stable, structural descriptors of the mocked
//!     member and of one observed call. No runtime handles.
//!   - ArgumentMatcher / InvocationMatcher: the predicate seam. Matchers
//!     carry stable keys that feed `InvocationShape`.
//!   - Setup: one rule. Identity is fixed at build time; shadowing state and
//!     invocation count are atomics.
//!   - SetupCollection: ordered list of setups behind one mutex, plus a
//!     lock-free length mirror and the `has_event_setup` summary flag.
//!
//! Priority and shadowing
//! - Append order is priority order: the newest setup wins.
//! - After every `add`, a single newest-to-oldest pass marks every older
//!   setup whose shape was already seen as `Overridden`. Conditional setups
//!   are skipped in both directions. The pass never reactivates a setup.
//! - Removing setups does not recompute shadowing. A setup overridden by a
//!   removed setup stays overridden. `remove_all_property_accessor_setups`
//!   is safe because accessor setups only shadow each other.
//!
//! Match resolution
//! - Newest-to-oldest over non-overridden setups. The first matching setup is
//!   the candidate. A setup on the exact invoked member that also matches
//!   wins outright and ends the scan; member equality is checked before the
//!   predicate so non-exact setups past the candidate cost nothing.
//!
//! Concurrency
//! - All scans and mutations hold the collection's `parking_lot::Mutex` for
//!   their whole body. `len`, `is_empty` and `has_event_setup` are atomic
//!   reads used as fast paths.
//! - Snapshots (`iter`, `to_vec_live`, `inner_mock_setups`) are copied under
//!   the lock and consumed without it.
//! - Caller predicates run under the lock and must not re-enter the same
//!   collection. Debug builds detect same-thread re-entry and panic instead
//!   of deadlocking.
//! - A panicking predicate propagates to the caller. The mutex does not
//!   poison, so the collection remains usable.
//!
//! Notes and non-goals
//! - No proxy generation, interception or verification reporting.
//! - Argument matchers here are minimal building blocks; richer matcher
//!   languages plug in through `InvocationMatcher` plus an explicit shape.

mod error;
mod invocation;
mod matcher;
mod member;
mod reentrancy;
mod setup;
mod setup_collection;
mod shape;

// Public surface
pub use error::{Result, SetupError};
pub use invocation::{arg, Argument, Invocation};
pub use matcher::{ArgumentMatcher, InvocationMatcher};
pub use member::{Member, MemberKind};
pub use setup::{InnerMock, Outcome, Setup, SetupBuilder, SetupState};
pub use setup_collection::{SetupCollection, Snapshot};
pub use shape::InvocationShape;
