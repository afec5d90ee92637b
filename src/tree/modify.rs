//! The mutation engine shared by both disciplines.
//!
//! Every update descends from the root with a [`Finder`], obtaining each
//! node on the way through [`make_mut`]. Under a persistent handle the
//! session owner is new for every update, so each node on the path is copied
//! once; under a transient handle nodes the session already owns are reused.
//! Splits propagate upward as new right siblings; underfull children are
//! rebalanced by their parent on the way back up.
//!
//! What happens at the leaf is decided there, by looking at the value in the
//! routed slot, so keyed updates need a single descent.

use crate::error::{Result, TreeError};
use crate::node::{ChildEntry, InternalNode, Node, NodeRef, make_mut};
use crate::ownership::{OwnerId, OwnershipPolicy, ReferenceCounter, Version};
use crate::policy::{Finder, RoutingPolicy};

use super::BppTree;

/// What an update does once its descent reaches a leaf slot.
pub(super) enum LeafEdit<T> {
    /// Leaves the tree unchanged.
    Keep,
    /// Inserts before the value at the slot.
    Insert(T),
    /// Replaces the value at the slot.
    Assign(T),
    /// Removes the value at the slot.
    Erase,
}

/// Outcome of an update.
pub(super) enum Edited<T> {
    Kept,
    Inserted,
    Replaced(T),
    Erased(T),
}

/// Result of editing one subtree: the outcome and the new right sibling
/// when the subtree split.
type Descent<T, P, const LEAF: usize, const INTERNAL: usize> =
    Result<(Edited<T>, Option<NodeRef<T, P, LEAF, INTERNAL>>)>;

impl<T, P, O, const LEAF: usize, const INTERNAL: usize> BppTree<T, P, O, LEAF, INTERNAL>
where
    T: Clone,
    P: RoutingPolicy<T>,
    O: OwnershipPolicy,
{
    /// Descends where `finder` routes and applies the edit `decide` picks
    /// for the value in the reached slot (`None` past the last value).
    ///
    /// An error from `decide` leaves the tree unchanged. So does an
    /// insertion that would split a root already at the depth limit, which
    /// fails with [`TreeError::DepthLimitExceeded`].
    pub(super) fn edit_with<F, D>(&mut self, finder: F, decide: D) -> Result<Edited<T>>
    where
        F: Finder<T, P> + Clone,
        D: FnOnce(&P, Option<&T>) -> Result<LeafEdit<T>>,
    {
        let limit = self.config.depth_limit();
        if self.height >= limit && self.path_is_full(finder.clone()) {
            let (leaf, slot) = self.descend(finder.clone());
            let edit = decide(&self.policy, leaf.values.get(slot))?;
            if matches!(edit, LeafEdit::Insert(_)) {
                tracing::debug!(limit, length = self.length, "insertion refused at depth limit");
                return Err(TreeError::DepthLimitExceeded { limit });
            }
            return self.apply(finder, |_, _| Ok(edit));
        }
        self.apply(finder, decide)
    }

    fn apply<F, D>(&mut self, mut finder: F, decide: D) -> Result<Edited<T>>
    where
        F: Finder<T, P>,
        D: FnOnce(&P, Option<&T>) -> Result<LeafEdit<T>>,
    {
        let owner = self.ownership.session_owner();
        let (edited, split) = edit_node(&mut self.root, owner, &self.policy, &mut finder, decide, true)?;
        if let Some(sibling) = split {
            let left = ReferenceCounter::clone(&self.root);
            self.root = InternalNode::with_children(owner, left, sibling, &self.policy).into_ref();
            self.height += 1;
            tracing::debug!(height = self.height, "root split");
        }
        match edited {
            Edited::Kept => return Ok(edited),
            Edited::Inserted => self.length += 1,
            Edited::Erased(_) => {
                self.length -= 1;
                self.collapse_root();
            }
            Edited::Replaced(_) => {}
        }
        self.touch();
        Ok(edited)
    }

    /// Inserts `value` where `finder` routes.
    ///
    /// Fails without touching the tree when the insertion would split a root
    /// that already sits at the depth limit.
    pub(super) fn insert_with<F>(&mut self, finder: F, value: T) -> Result<()>
    where
        F: Finder<T, P> + Clone,
    {
        self.edit_with(finder, |_, _| Ok(LeafEdit::Insert(value)))
            .map(|_| ())
    }

    /// Removes the element `finder` routes to, which must exist.
    pub(super) fn erase_with<F: Finder<T, P> + Clone>(&mut self, finder: F) -> T {
        match self.edit_with(finder, |_, _| Ok(LeafEdit::Erase)) {
            Ok(Edited::Erased(removed)) => removed,
            _ => unreachable!("erasing an existing element cannot fail"),
        }
    }

    /// Replaces the element `finder` routes to, which must exist, returning
    /// the old one.
    pub(super) fn assign_with<F: Finder<T, P> + Clone>(&mut self, finder: F, value: T) -> T {
        match self.edit_with(finder, |_, _| Ok(LeafEdit::Assign(value))) {
            Ok(Edited::Replaced(previous)) => previous,
            _ => unreachable!("assigning an existing element cannot fail"),
        }
    }

    /// Applies `update` to the element `finder` routes to, which must exist.
    pub(super) fn modify_with<F, R>(&mut self, mut finder: F, update: impl FnOnce(&mut T) -> R) -> R
    where
        F: Finder<T, P>,
    {
        let owner = self.ownership.session_owner();
        let result = modify_node(&mut self.root, owner, &self.policy, &mut finder, update);
        self.touch();
        result
    }

    /// Drops every element.
    pub(super) fn reset(&mut self) {
        self.root = ReferenceCounter::new(Node::empty(self.ownership.session_owner()));
        self.length = 0;
        self.height = 1;
        self.touch();
    }

    /// Whether every node on the path `finder` takes is full.
    fn path_is_full<F: Finder<T, P>>(&self, mut finder: F) -> bool {
        let mut node: &Node<T, P, LEAF, INTERNAL> = &self.root;
        loop {
            if !node.is_full() {
                return false;
            }
            match node {
                Node::Leaf(_) => return true,
                Node::Internal(internal) => {
                    let slot = finder.route_internal(&self.policy, &internal.entries);
                    node = &internal.entries[slot].node;
                }
            }
        }
    }

    fn collapse_root(&mut self) {
        loop {
            let only_child = match &*self.root {
                Node::Internal(internal) if internal.entries.len() == 1 => {
                    ReferenceCounter::clone(&internal.entries[0].node)
                }
                _ => return,
            };
            self.root = only_child;
            self.height -= 1;
            tracing::debug!(height = self.height, "root collapsed");
        }
    }

    fn touch(&mut self) {
        self.version = Version::fresh();
    }
}

fn edit_node<T, P, F, D, const LEAF: usize, const INTERNAL: usize>(
    node: &mut NodeRef<T, P, LEAF, INTERNAL>,
    owner: OwnerId,
    policy: &P,
    finder: &mut F,
    decide: D,
    right_most: bool,
) -> Descent<T, P, LEAF, INTERNAL>
where
    T: Clone,
    P: RoutingPolicy<T>,
    F: Finder<T, P>,
    D: FnOnce(&P, Option<&T>) -> Result<LeafEdit<T>>,
{
    match make_mut(node, owner) {
        Node::Leaf(leaf) => {
            let slot = finder.route_leaf(policy, &leaf.values);
            let edited = match decide(policy, leaf.values.get(slot))? {
                LeafEdit::Keep => Edited::Kept,
                LeafEdit::Insert(value) => {
                    let split = leaf
                        .insert(slot, value, right_most)
                        .map(|sibling| ReferenceCounter::new(Node::Leaf(sibling)));
                    return Ok((Edited::Inserted, split));
                }
                LeafEdit::Assign(value) => Edited::Replaced(leaf.assign(slot, value)),
                LeafEdit::Erase => Edited::Erased(leaf.erase(slot)),
            };
            Ok((edited, None))
        }
        Node::Internal(internal) => {
            let slot = finder.route_internal(policy, &internal.entries);
            let right_most = right_most && slot + 1 == internal.entries.len();
            let (edited, split) =
                edit_node(&mut internal.entries[slot].node, owner, policy, finder, decide, right_most)?;
            if matches!(edited, Edited::Kept) {
                return Ok((edited, None));
            }
            internal.entries[slot].refresh(policy);
            if let Some(sibling) = split {
                let entry = ChildEntry::new(sibling, policy);
                let split = internal.insert(slot + 1, entry, right_most).map(InternalNode::into_ref);
                return Ok((edited, split));
            }
            if internal.entries[slot].node.is_underfull() {
                internal.rebalance(slot, policy, owner);
            }
            Ok((edited, None))
        }
    }
}

fn modify_node<T, P, F, R, const LEAF: usize, const INTERNAL: usize>(
    node: &mut NodeRef<T, P, LEAF, INTERNAL>,
    owner: OwnerId,
    policy: &P,
    finder: &mut F,
    update: impl FnOnce(&mut T) -> R,
) -> R
where
    T: Clone,
    P: RoutingPolicy<T>,
    F: Finder<T, P>,
{
    match make_mut(node, owner) {
        Node::Leaf(leaf) => {
            let slot = finder.route_leaf(policy, &leaf.values);
            update(&mut leaf.values[slot])
        }
        Node::Internal(internal) => {
            let slot = finder.route_internal(policy, &internal.entries);
            let result = modify_node(&mut internal.entries[slot].node, owner, policy, finder, update);
            internal.entries[slot].refresh(policy);
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Edited, LeafEdit};
    use crate::config::TreeConfig;
    use crate::error::TreeError;
    use crate::node::Node;
    use crate::ownership::ReferenceCounter;
    use crate::policy::Position;
    use crate::{Indexed, Persistent, Transient};
    use rstest::rstest;

    type Small = Persistent<usize, Indexed, 4, 4>;

    #[rstest]
    fn test_root_split_grows_height() {
        let tree: Small = (0..4).collect();
        assert_eq!(tree.depth(), 1);
        let grown = tree.emplace_back(4);
        assert_eq!(grown.depth(), 2);
        assert!(grown.validate().is_ok());
    }

    #[rstest]
    fn test_root_collapse_shrinks_height() {
        let mut tree: Small = (0..5).collect();
        assert_eq!(tree.depth(), 2);
        while tree.len() > 2 {
            tree = tree.erase_index(0);
            assert!(tree.validate().is_ok());
        }
        assert_eq!(tree.depth(), 1);
    }

    #[rstest]
    fn test_persistent_update_shares_untouched_children() {
        let tree: Small = (0..64).collect();
        let updated = tree.assign_index(0, 100);
        let (old, new) = match (&*tree.root, &*updated.root) {
            (Node::Internal(old), Node::Internal(new)) => (old, new),
            _ => panic!("expected internal roots"),
        };
        let shared = old
            .entries
            .iter()
            .zip(new.entries.iter())
            .filter(|(old, new)| ReferenceCounter::ptr_eq(&old.node, &new.node))
            .count();
        assert_eq!(shared, old.entries.len() - 1);
        assert_eq!(tree.at_index(0), Some(&0));
        assert_eq!(updated.at_index(0), Some(&100));
    }

    #[rstest]
    fn test_depth_limit_refuses_root_split() {
        let config = TreeConfig::new().with_depth_limit(1);
        let mut tree: Transient<usize, Indexed, 4, 4> = Transient::with_config(config);
        for value in 0..4 {
            tree.emplace_back(value);
        }
        assert_eq!(
            tree.try_emplace_back(4),
            Err(TreeError::DepthLimitExceeded { limit: 1 })
        );
        assert_eq!(tree.len(), 4);
        assert!(tree.validate().is_ok());
    }

    #[rstest]
    fn test_depth_limit_allows_insert_below_full_path() {
        let config = TreeConfig::new().with_depth_limit(2);
        let mut tree: Transient<usize, Indexed, 4, 4> = Transient::with_config(config);
        let mut next = 0;
        while tree.try_emplace_back(next).is_ok() {
            next += 1;
        }
        assert_eq!(tree.len(), 13);
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.try_insert_index(0, 99), Ok(()));
        assert_eq!(tree.len(), 14);
        assert!(tree.validate().is_ok());
    }

    #[rstest]
    fn test_kept_edit_leaves_version_and_length() {
        let mut tree: Transient<usize, Indexed, 4, 4> = (0..20).collect();
        let version = tree.version();
        let edited = tree.edit_with(Position::lookup(7), |_, current| {
            assert_eq!(current, Some(&7));
            Ok(LeafEdit::Keep)
        });
        assert!(matches!(edited, Ok(Edited::Kept)));
        assert_eq!(tree.version(), version);
        assert_eq!(tree.len(), 20);
    }

    #[rstest]
    fn test_refused_edit_leaves_tree_unchanged() {
        let mut tree: Transient<usize, Indexed, 4, 4> = (0..20).collect();
        let version = tree.version();
        let edited = tree.edit_with(Position::lookup(3), |_, _| Err(TreeError::KeyNotFound));
        assert!(matches!(edited, Err(TreeError::KeyNotFound)));
        assert_eq!(tree.version(), version);
        assert!(tree.iter().copied().eq(0..20));
        assert!(tree.validate().is_ok());
    }

    #[rstest]
    fn test_edit_past_last_value_sees_nothing() {
        let mut tree: Transient<usize, Indexed, 4, 4> = (0..9).collect();
        let edited = tree.edit_with(Position::insertion(9), |_, current| {
            assert_eq!(current, None);
            Ok(LeafEdit::Insert(9))
        });
        assert!(matches!(edited, Ok(Edited::Inserted)));
        assert!(tree.iter().copied().eq(0..10));
    }

    #[rstest]
    fn test_assign_replaces_in_slot_of_owned_path() {
        let mut tree: Transient<usize, Indexed, 4, 4> = (0..40).collect();
        assert_eq!(tree.assign_with(Position::lookup(17), 170), 17);
        let root = ReferenceCounter::as_ptr(&tree.root);
        assert_eq!(tree.assign_with(Position::lookup(18), 180), 18);
        assert_eq!(ReferenceCounter::as_ptr(&tree.root), root);
        assert_eq!(tree.len(), 40);
        assert_eq!(tree.at_index(17), Some(&170));
        assert_eq!(tree.at_index(18), Some(&180));
        assert!(tree.validate().is_ok());
    }

    #[rstest]
    fn test_depth_limit_allows_edits_that_do_not_insert() {
        let config = TreeConfig::new().with_depth_limit(1);
        let mut tree: Transient<usize, Indexed, 4, 4> = Transient::with_config(config);
        tree.extend(0..4);
        assert_eq!(tree.assign_with(Position::lookup(2), 20), 2);
        assert_eq!(tree.erase_with(Position::lookup(0)), 0);
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![1, 20, 3]);
        tree.emplace_back(4);
        assert_eq!(
            tree.insert_with(Position::insertion(0), 0),
            Err(TreeError::DepthLimitExceeded { limit: 1 })
        );
        assert!(tree.validate().is_ok());
    }
}
