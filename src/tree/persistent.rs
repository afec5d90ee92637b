//! Persistent handles: cheap to clone, never changed by updates.

use crate::ownership::{Owned, Shared};
use crate::policy::RoutingPolicy;

use super::BppTree;

impl<T, P, const LEAF: usize, const INTERNAL: usize> Clone for BppTree<T, P, Shared, LEAF, INTERNAL>
where
    P: RoutingPolicy<T>,
{
    /// Returns a handle sharing every node with this one.
    ///
    /// # Complexity
    ///
    /// O(1)
    fn clone(&self) -> Self {
        self.share()
    }
}

impl<T, P, const LEAF: usize, const INTERNAL: usize> BppTree<T, P, Shared, LEAF, INTERNAL>
where
    P: RoutingPolicy<T>,
{
    /// Converts this handle into a transient one for a batch of updates.
    ///
    /// The transient session copies each node the first time it updates it
    /// and updates its own copies in place afterwards. Other handles sharing
    /// nodes with this one are never affected.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bpptree::IndexedTree;
    ///
    /// let tree: IndexedTree<i32> = (0..3).collect();
    /// let mut transient = tree.clone().transient();
    /// transient.emplace_back(3);
    /// transient.emplace_back(4);
    ///
    /// assert_eq!(transient.persistent().len(), 5);
    /// assert_eq!(tree.len(), 3);
    /// ```
    #[must_use]
    pub fn transient(self) -> BppTree<T, P, Owned, LEAF, INTERNAL> {
        self.into_discipline()
    }
}

#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(crate::IndexedTree<i32>: Send, Sync);

#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(crate::OrderedMap<String, i32>: Send, Sync);

#[cfg(test)]
mod tests {
    use crate::ownership::ReferenceCounter;
    use crate::{Indexed, Persistent};
    use rstest::rstest;

    type Small = Persistent<usize, Indexed, 4, 4>;

    #[rstest]
    fn test_clone_shares_root() {
        let tree: Small = (0..40).collect();
        let copy = tree.clone();
        assert!(ReferenceCounter::ptr_eq(&tree.root, &copy.root));
        assert_eq!(tree.version(), copy.version());
    }

    #[rstest]
    fn test_transient_roundtrip_preserves_contents() {
        let tree: Small = (0..40).collect();
        let transient = tree.clone().transient();
        assert!(transient.is_transient());
        let back = transient.persistent();
        assert_eq!(back, tree);
        assert!(!back.is_transient());
    }

    #[rstest]
    fn test_transient_updates_leave_source_untouched() {
        let tree: Small = (0..40).collect();
        let mut transient = tree.clone().transient();
        for _ in 0..20 {
            transient.erase_index(0);
        }
        transient.emplace_back(1000);
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), (0..40).collect::<Vec<_>>());
        assert!(tree.validate().is_ok());
        assert!(transient.validate().is_ok());
    }
}
