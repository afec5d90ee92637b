//! Ownership disciplines: who may mutate a node in place.
//!
//! Every node carries an [`OwnerId`] tag. A transient handle holds a unique
//! owner id for the lifetime of its session and mutates a node in place only
//! when the node carries that id *and* the node is not reachable from any
//! other reference. Any other node is copied first and the copy is tagged
//! with the session's id. Persistent handles run each update as a
//! short-lived session, so an update copies exactly the root-to-leaf path it
//! touches and shares everything else with the original.
//!
//! Ending a session (converting a transient back to a persistent handle, or
//! taking a snapshot) retires its owner id. Ids are never reused, so nodes
//! still tagged with a retired id are frozen: no session can mutate them
//! again without copying.
//!
//! The mutation discipline is chosen at the type level through
//! [`OwnershipPolicy`]: [`Shared`] for persistent handles, [`Owned`] for
//! transient ones.

use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`,
/// which is thread-safe but has slightly higher overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

// =============================================================================
// Identities
// =============================================================================

static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

/// Tag identifying the transient session allowed to mutate a node in place.
#[doc(hidden)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(u64);

impl OwnerId {
    /// Tag of nodes that no session owns.
    #[cfg(test)]
    pub(crate) const FROZEN: Self = Self(0);

    /// Allocates an id that has never been handed out before.
    pub(crate) fn fresh() -> Self {
        Self(NEXT_OWNER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Identity of one observable state of a tree handle.
///
/// Cursors remember the version they were taken from; a handle accepts a
/// cursor only while its own version still matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version(u64);

impl Version {
    pub(crate) fn fresh() -> Self {
        Self(NEXT_VERSION.fetch_add(1, Ordering::Relaxed))
    }
}

// =============================================================================
// Ownership Policies
// =============================================================================

mod private {
    pub trait Sealed {}
}

/// Mutation discipline of a tree handle.
///
/// This trait is sealed; the two disciplines are [`Shared`] (persistent)
/// and [`Owned`] (transient).
pub trait OwnershipPolicy: private::Sealed {
    /// `true` for transient handles.
    const IS_TRANSIENT: bool;

    /// Starts the discipline for a newly created handle.
    #[doc(hidden)]
    fn open() -> Self;

    /// Owner id to use for the next mutation.
    #[doc(hidden)]
    fn session_owner(&self) -> OwnerId;

    /// Ends the discipline when a handle changes hands.
    #[doc(hidden)]
    fn close(self)
    where
        Self: Sized,
    {
    }
}

/// Persistent discipline: every update returns a new handle and leaves the
/// receiver unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Shared;

impl private::Sealed for Shared {}

impl OwnershipPolicy for Shared {
    const IS_TRANSIENT: bool = false;

    fn open() -> Self {
        Self
    }

    fn session_owner(&self) -> OwnerId {
        OwnerId::fresh()
    }
}

/// Transient discipline: updates mutate the handle in place, copying only
/// nodes it does not exclusively own.
///
/// The marker keeps transient handles `!Send` and `!Sync`.
#[derive(Debug)]
pub struct Owned {
    owner: OwnerId,
    _marker: PhantomData<Rc<()>>,
}

impl Owned {
    /// Retires the current owner id; nodes tagged with it become frozen.
    pub(crate) fn rotate(&mut self) {
        let retired = std::mem::replace(&mut self.owner, OwnerId::fresh());
        tracing::trace!(retired = retired.0, owner = self.owner.0, "transient session rotated");
    }
}

impl private::Sealed for Owned {}

impl OwnershipPolicy for Owned {
    const IS_TRANSIENT: bool = true;

    fn open() -> Self {
        let owner = OwnerId::fresh();
        tracing::trace!(owner = owner.0, "transient session opened");
        Self {
            owner,
            _marker: PhantomData,
        }
    }

    fn session_owner(&self) -> OwnerId {
        self.owner
    }

    fn close(self) {
        tracing::trace!(owner = self.owner.0, "transient session closed");
    }
}

/// Marker trait implemented by the handle types whose updates happen in
/// place.
pub trait IsTransientTree {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_owner_ids_are_unique() {
        let first = OwnerId::fresh();
        let second = OwnerId::fresh();
        assert_ne!(first, second);
        assert_ne!(first, OwnerId::FROZEN);
    }

    #[rstest]
    fn test_versions_are_unique() {
        assert_ne!(Version::fresh(), Version::fresh());
    }

    #[rstest]
    fn test_shared_uses_new_session_per_update() {
        let shared = Shared;
        assert_ne!(shared.session_owner(), shared.session_owner());
    }

    #[rstest]
    fn test_owned_keeps_owner_until_rotated() {
        let mut owned = Owned::open();
        let before = owned.session_owner();
        assert_eq!(before, owned.session_owner());
        owned.rotate();
        assert_ne!(before, owned.session_owner());
    }

    #[rstest]
    fn test_reference_counter_strong_count() {
        let reference_counter: ReferenceCounter<i32> = ReferenceCounter::new(42);
        assert_eq!(ReferenceCounter::strong_count(&reference_counter), 1);
        let reference_counter_clone = reference_counter.clone();
        assert_eq!(ReferenceCounter::strong_count(&reference_counter), 2);
        drop(reference_counter_clone);
        assert_eq!(ReferenceCounter::strong_count(&reference_counter), 1);
    }

    static_assertions::assert_not_impl_any!(Owned: Send, Sync);
}
