use crate::array::UninitializedArray;
use crate::config::min_occupancy;
use crate::ownership::{OwnerId, ReferenceCounter};
use crate::policy::RoutingPolicy;

use super::{ChildEntry, Node, NodeRef, make_mut, split_insert};

/// Node holding up to `INTERNAL` children in order.
pub(crate) struct InternalNode<T, P: RoutingPolicy<T>, const LEAF: usize, const INTERNAL: usize> {
    pub(crate) owner: OwnerId,
    pub(crate) entries: UninitializedArray<ChildEntry<T, P, LEAF, INTERNAL>, INTERNAL>,
}

impl<T, P: RoutingPolicy<T>, const LEAF: usize, const INTERNAL: usize> Clone
    for InternalNode<T, P, LEAF, INTERNAL>
{
    fn clone(&self) -> Self {
        Self {
            owner: self.owner,
            entries: self.entries.clone(),
        }
    }
}

impl<T, P: RoutingPolicy<T>, const LEAF: usize, const INTERNAL: usize>
    InternalNode<T, P, LEAF, INTERNAL>
{
    pub(crate) const MIN_OCCUPANCY: usize = min_occupancy(INTERNAL);

    /// New root above the two halves of a split root.
    pub(crate) fn with_children(
        owner: OwnerId,
        left: NodeRef<T, P, LEAF, INTERNAL>,
        right: NodeRef<T, P, LEAF, INTERNAL>,
        policy: &P,
    ) -> Self {
        let mut entries = UninitializedArray::new();
        entries.push(ChildEntry::new(left, policy));
        entries.push(ChildEntry::new(right, policy));
        Self { owner, entries }
    }

    /// Number of values below this node.
    pub(crate) fn count(&self) -> usize {
        self.entries.iter().map(|entry| entry.count).sum()
    }

    pub(crate) fn summary(&self, policy: &P) -> P::Summary {
        let mut entries = self.entries.iter();
        let first = match entries.next() {
            Some(entry) => entry.summary.clone(),
            None => unreachable!("internal nodes have at least one child"),
        };
        entries.fold(first, |summary, entry| policy.combine(summary, &entry.summary))
    }

    /// Inserts `entry` at `slot`, splitting when full.
    pub(crate) fn insert(
        &mut self,
        slot: usize,
        entry: ChildEntry<T, P, LEAF, INTERNAL>,
        right_most: bool,
    ) -> Option<Self> {
        split_insert(&mut self.entries, slot, entry, right_most).map(|entries| Self {
            owner: self.owner,
            entries,
        })
    }

    /// Moves the last child of `left` to the front of this node.
    pub(crate) fn borrow_from_left(&mut self, left: &mut Self) {
        if let Some(entry) = left.entries.pop() {
            self.entries.emplace(0, entry);
        }
    }

    /// Moves the first child of `right` to the back of this node.
    pub(crate) fn borrow_from_right(&mut self, right: &mut Self) {
        let entry = right.entries.erase(0);
        self.entries.push(entry);
    }

    /// Moves every child of `right` to the back of this node.
    pub(crate) fn merge(&mut self, mut right: Self) {
        self.entries.append(&mut right.entries);
    }
}

impl<T: Clone, P: RoutingPolicy<T>, const LEAF: usize, const INTERNAL: usize>
    InternalNode<T, P, LEAF, INTERNAL>
{
    /// Restores the minimum occupancy of the child at `slot`.
    ///
    /// The left sibling is used when there is one, the right sibling
    /// otherwise. A sibling above its minimum lends one item across the
    /// boundary; a sibling at its minimum is merged with the child and the
    /// right one of the pair is removed from this node.
    pub(crate) fn rebalance(&mut self, slot: usize, policy: &P, owner: OwnerId) {
        if self.entries.len() < 2 {
            return;
        }
        let (left_slot, right_slot) = if slot == 0 { (0, 1) } else { (slot - 1, slot) };
        let underfull_is_left = slot == 0;
        let sibling = &self.entries[if underfull_is_left { right_slot } else { left_slot }].node;
        if sibling.occupancy() <= sibling.min_occupancy() {
            self.merge_children(left_slot, owner);
        } else {
            self.lend(left_slot, underfull_is_left, owner);
            self.entries[right_slot].refresh(policy);
        }
        self.entries[left_slot].refresh(policy);
    }

    /// Moves one item across the boundary between the children at
    /// `left_slot` and `left_slot + 1`, towards the left one when `to_left`.
    fn lend(&mut self, left_slot: usize, to_left: bool, owner: OwnerId) {
        let (head, tail) = self.entries.split_at_mut(left_slot + 1);
        let left = make_mut(&mut head[left_slot].node, owner);
        let right = make_mut(&mut tail[0].node, owner);
        match (left, right) {
            (Node::Leaf(left), Node::Leaf(right)) if to_left => left.borrow_from_right(right),
            (Node::Leaf(left), Node::Leaf(right)) => right.borrow_from_left(left),
            (Node::Internal(left), Node::Internal(right)) if to_left => left.borrow_from_right(right),
            (Node::Internal(left), Node::Internal(right)) => right.borrow_from_left(left),
            _ => unreachable!("siblings share a height"),
        }
    }

    /// Folds the child at `left_slot + 1` into the child at `left_slot`.
    ///
    /// Only the surviving node is obtained through [`make_mut`]. The removed
    /// one gives up its slots when this node held its last reference and
    /// has them cloned otherwise.
    fn merge_children(&mut self, left_slot: usize, owner: OwnerId) {
        let removed = self.entries.erase(left_slot + 1);
        let moved = removed.count;
        let right = ReferenceCounter::unwrap_or_clone(removed.node);
        match (make_mut(&mut self.entries[left_slot].node, owner), right) {
            (Node::Leaf(left), Node::Leaf(right)) => left.merge(right),
            (Node::Internal(left), Node::Internal(right)) => left.merge(right),
            _ => unreachable!("siblings share a height"),
        }
        tracing::trace!(slot = left_slot, merged = moved, "merged sibling nodes");
    }

    /// Wraps this node for installation as a new sibling.
    pub(crate) fn into_ref(self) -> NodeRef<T, P, LEAF, INTERNAL> {
        ReferenceCounter::new(Node::Internal(self))
    }
}
