//! Transient handles: exclusive builders that update in place.

use crate::ownership::{IsTransientTree, Owned, Shared};
use crate::policy::RoutingPolicy;

use super::BppTree;

impl<T, P, const LEAF: usize, const INTERNAL: usize> BppTree<T, P, Owned, LEAF, INTERNAL>
where
    P: RoutingPolicy<T>,
{
    /// Freezes this handle into a persistent one.
    ///
    /// Every node the session owned becomes shared and immutable. Cursors
    /// taken from the transient handle remain valid for the result.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn persistent(self) -> BppTree<T, P, Shared, LEAF, INTERNAL> {
        self.into_discipline()
    }

    /// Returns a persistent handle of the current contents and keeps this
    /// handle usable.
    ///
    /// Nodes owned so far are frozen: later updates through this handle copy
    /// them first, so the snapshot never changes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bpptree::TransientIndexedTree;
    ///
    /// let mut transient: TransientIndexedTree<i32> = (0..3).collect();
    /// let snapshot = transient.snapshot();
    /// transient.emplace_back(3);
    ///
    /// assert_eq!(snapshot.len(), 3);
    /// assert_eq!(transient.len(), 4);
    /// ```
    pub fn snapshot(&mut self) -> BppTree<T, P, Shared, LEAF, INTERNAL> {
        let frozen = self.share();
        self.ownership.rotate();
        frozen
    }
}

impl<T, P, const LEAF: usize, const INTERNAL: usize> BppTree<T, P, Owned, LEAF, INTERNAL>
where
    T: Clone,
    P: RoutingPolicy<T>,
{
    /// Removes every element.
    pub fn clear(&mut self) {
        self.reset();
    }
}

impl<T, P, const LEAF: usize, const INTERNAL: usize> IsTransientTree for BppTree<T, P, Owned, LEAF, INTERNAL> where
    P: RoutingPolicy<T>
{
}

static_assertions::assert_not_impl_any!(crate::TransientIndexedTree<i32>: Send, Sync);

#[cfg(test)]
mod tests {
    use crate::node::Node;
    use crate::ownership::ReferenceCounter;
    use crate::{Indexed, Transient};
    use rstest::rstest;

    type SmallTransient = Transient<usize, Indexed, 4, 4>;

    #[rstest]
    fn test_owned_nodes_are_reused() {
        let mut tree = SmallTransient::new();
        tree.extend(0..40);
        let root = ReferenceCounter::as_ptr(&tree.root);
        tree.assign_index(39, 0);
        assert_eq!(ReferenceCounter::as_ptr(&tree.root), root);
    }

    #[rstest]
    fn test_snapshot_freezes_owned_nodes() {
        let mut tree = SmallTransient::new();
        tree.extend(0..40);
        let snapshot = tree.snapshot();
        let frozen_root = ReferenceCounter::as_ptr(&snapshot.root);
        tree.assign_index(0, 100);
        assert_ne!(ReferenceCounter::as_ptr(&tree.root), frozen_root);
        assert_eq!(snapshot.get(0), Some(&0));
        assert_eq!(tree.get(0), Some(&100));
    }

    #[rstest]
    fn test_snapshot_dropped_nodes_still_copied() {
        let mut tree = SmallTransient::new();
        tree.extend(0..3);
        drop(tree.snapshot());
        let before = ReferenceCounter::as_ptr(&tree.root);
        tree.emplace_back(3);
        assert_ne!(ReferenceCounter::as_ptr(&tree.root), before);
        match &*tree.root {
            Node::Leaf(leaf) => assert_eq!(leaf.values.len(), 4),
            Node::Internal(_) => panic!("expected a leaf root"),
        }
    }

    #[rstest]
    fn test_clear_empties_tree() {
        let mut tree = SmallTransient::new();
        tree.extend(0..40);
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.depth(), 1);
        assert!(tree.validate().is_ok());
    }
}
